//! Block/character collision
//!
//! Only the character's top row is tested: blocks arrive from above, so the
//! head is always the first cell a falling block can reach.

use super::block::{Block, BlockSet};
use super::character::Character;

/// First block overlapping the character, if the character can be hit at all.
///
/// Short-circuits on the first match so simultaneous overlaps count once.
pub fn check_collision<'a>(blocks: &'a BlockSet, character: &Character) -> Option<&'a Block> {
    if character.dead || character.invulnerable {
        return None;
    }
    blocks
        .iter()
        .filter(|b| !b.destroyed)
        .find(|b| b.row == character.row && b.covers(character.col))
}
