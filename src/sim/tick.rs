//! Fixed timestep simulation tick
//!
//! Processing order:
//!   1. Drain buffered spawns, confirmations and moves
//!   2. Advance blocks (mutates the column map)
//!   3. Character gravity against the post-advance map
//!   4. Collision check
//!   5. Grace timer

use std::time::Duration;

use super::block::BlockSet;
use super::character::Character;
use super::collision::check_collision;
use super::column_map::ColumnHeightMap;
use super::state::{SimEvent, Simulation};

/// What a resolution pass did besides moving things
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Blocks crushed and removed this tick
    pub destroyed: Vec<String>,
    /// Block that hit the character, if any
    pub hit: Option<String>,
}

/// Result of [`resolve_tick`]
#[derive(Debug, Clone)]
pub struct Resolution {
    pub blocks: BlockSet,
    pub map: ColumnHeightMap,
    pub character: Character,
    pub outcome: TickOutcome,
}

/// Pure form of one physics step: inputs are left untouched.
pub fn resolve_tick(
    blocks: &BlockSet,
    map: &ColumnHeightMap,
    character: &Character,
) -> Resolution {
    let mut blocks = blocks.clone();
    let mut map = map.clone();
    let mut character = character.clone();
    let outcome = resolve_in_place(&mut blocks, &mut map, &mut character);
    Resolution {
        blocks,
        map,
        character,
        outcome,
    }
}

fn resolve_in_place(
    blocks: &mut BlockSet,
    map: &mut ColumnHeightMap,
    character: &mut Character,
) -> TickOutcome {
    let destroyed = blocks.advance(map);
    character.apply_gravity(map);

    let hit = check_collision(blocks, character).map(|b| b.id.clone());
    if hit.is_some() {
        character.dead = true;
    }

    TickOutcome { destroyed, hit }
}

/// Advance the session by one tick of length `dt`
pub fn tick(sim: &mut Simulation, dt: Duration) {
    // Finalized events are removed even while the board is frozen
    for id in std::mem::take(&mut sim.pending.confirms) {
        match sim.blocks.confirm(&id, &mut sim.map) {
            Ok(block) => sim.events.push(SimEvent::BlockResolved { id: block.id }),
            Err(notice) => ignore(sim, notice),
        }
    }

    // Board stays frozen until retry
    if sim.character.dead {
        if !sim.pending.spawns.is_empty() || !sim.pending.moves.is_empty() {
            log::debug!(
                "Dropping {} spawns and {} moves while dead",
                sim.pending.spawns.len(),
                sim.pending.moves.len()
            );
        }
        sim.pending.spawns.clear();
        sim.pending.moves.clear();
        return;
    }

    sim.time_ticks += 1;

    let cols = sim.cols();
    for request in std::mem::take(&mut sim.pending.spawns) {
        if let Err(notice) = sim.spawner.admit(request, &mut sim.blocks, cols) {
            ignore(sim, notice);
        }
    }

    for mv in std::mem::take(&mut sim.pending.moves) {
        if let Err(notice) = sim.character.apply(mv, &sim.map, sim.jump_rows) {
            ignore(sim, notice);
        }
    }

    let outcome = resolve_in_place(&mut sim.blocks, &mut sim.map, &mut sim.character);

    for id in outcome.destroyed {
        sim.events.push(SimEvent::BlockDestroyed { id });
    }

    if let Some(by) = outcome.hit {
        sim.lives = sim.lives.saturating_sub(1);
        log::info!(
            "Hit by {} at tick {} ({} lives left)",
            by,
            sim.time_ticks,
            sim.lives
        );
        sim.events.push(SimEvent::Died {
            by,
            lives_left: sim.lives,
        });
    } else if sim.character.tick_grace(dt) {
        sim.events.push(SimEvent::GraceEnded);
    }
}

fn ignore(sim: &mut Simulation, notice: crate::error::Notice) {
    log::debug!("{}", notice);
    sim.events.push(SimEvent::Ignored(notice));
}
