//! Falling blocks and their stacking resolution
//!
//! Blocks never look at each other while advancing. Every decision goes
//! through the [`ColumnHeightMap`], which is updated in place as blocks settle,
//! so a block processed later in the same tick sees the earlier ones' effects.

use std::ops::Range;

use serde::Serialize;

use super::column_map::ColumnHeightMap;
use crate::error::Notice;

/// Block category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BlockKind {
    /// Stacks on whatever is below it
    #[default]
    Normal,
    /// High-value block that ejects the stacks it falls into
    Push,
}

/// A block entity, identified by the external event id that spawned it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub id: String,
    /// Leading (lowest) row the block occupies
    pub row: i32,
    /// Leftmost column
    pub col: usize,
    pub width: usize,
    pub height: i32,
    pub kind: BlockKind,
    /// Stopped advancing downward
    pub settled: bool,
    /// Marked for removal at the end of the tick
    pub destroyed: bool,
}

impl Block {
    /// A fresh unit-height block at the top of the board
    pub fn new(id: impl Into<String>, col: usize, width: usize, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            row: 0,
            col,
            width: width.max(1),
            height: 1,
            kind,
            settled: false,
            destroyed: false,
        }
    }

    /// Columns occupied by this block
    #[inline]
    pub fn columns(&self) -> Range<usize> {
        self.col..self.col + self.width
    }

    #[inline]
    pub fn covers(&self, col: usize) -> bool {
        self.columns().contains(&col)
    }

    /// Row a block resting on this one would stop against
    #[inline]
    pub fn surface(&self) -> i32 {
        self.row + 1 - self.height
    }

    /// Advance one tick against the map
    fn advance(&mut self, map: &mut ColumnHeightMap) {
        match self.kind {
            BlockKind::Normal => self.advance_normal(map),
            BlockKind::Push => self.advance_push(map),
        }
    }

    fn advance_normal(&mut self, map: &mut ColumnHeightMap) {
        let resting = self.columns().any(|c| self.row >= map.top_of(c));
        if resting {
            self.settled = true;
            if self.width > 1 {
                self.crush_if_straddling(map);
            }
            return;
        }

        let contact = self.columns().any(|c| self.row + 1 == map.top_of(c));
        if contact {
            // Every open column under the block now tops out at its upper edge
            let surface = (self.row + 1 - self.height).max(0);
            for c in self.columns() {
                if !map.is_ejected(c) {
                    map.push(c, surface);
                }
            }
            self.settled = true;
            return;
        }

        self.row += 1;
        self.settled = false;
    }

    /// A wide block half over an ejected lane is crushed. The surviving lanes
    /// drop by one row.
    fn crush_if_straddling(&mut self, map: &mut ColumnHeightMap) {
        let ejected = self.columns().filter(|&c| map.is_ejected(c)).count();
        if ejected == 0 || ejected == self.width {
            return;
        }
        for c in self.columns() {
            if !map.is_ejected(c) {
                map.push(c, map.top_of(c) + 1);
            }
        }
        self.destroyed = true;
    }

    fn advance_push(&mut self, map: &mut ColumnHeightMap) {
        let rows = map.rows();
        if self.row > rows {
            // Already left the board
            self.settled = true;
            return;
        }

        if self.row == rows {
            for c in self.columns() {
                map.push(c, rows);
            }
        } else {
            let sentinel = map.ejection_sentinel();
            for c in self.columns() {
                if self.row >= map.top_of(c) {
                    map.push(c, sentinel);
                }
            }
        }
        self.row += 1;
    }
}

/// Live blocks in spawn order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockSet {
    blocks: Vec<Block>,
}

impl BlockSet {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Add a block unless one with the same id is already live
    pub fn insert(&mut self, block: Block) -> Result<(), Notice> {
        if self.contains(&block.id) {
            return Err(Notice::IgnoredDuplicateSpawn { id: block.id });
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Insert without the duplicate check, for setting up specific boards
    pub fn push_unchecked(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Advance every live block one tick, then drop the ones destroyed.
    ///
    /// Returns the ids removed this tick.
    pub fn advance(&mut self, map: &mut ColumnHeightMap) -> Vec<String> {
        for block in self.blocks.iter_mut().filter(|b| !b.destroyed) {
            block.advance(map);
        }

        let mut removed = Vec::new();
        self.blocks.retain(|b| {
            if b.destroyed {
                removed.push(b.id.clone());
            }
            !b.destroyed
        });
        removed
    }

    /// Remove a block whose event was finalized and give its height back to
    /// the lanes it occupied.
    pub fn confirm(&mut self, id: &str, map: &mut ColumnHeightMap) -> Result<Block, Notice> {
        let Some(index) = self.blocks.iter().position(|b| b.id == id) else {
            return Err(Notice::IgnoredUnknownConfirmation { id: id.to_string() });
        };
        let block = self.blocks.remove(index);

        for c in block.columns() {
            if block.kind == BlockKind::Push {
                // A push block only ever opened lanes; close the ones it still
                // holds unless another push block on the board holds them too
                if !map.is_ejected(c) || self.push_holds(c, map.rows()) {
                    continue;
                }
                map.restore(c, self.resting_cap(c, map.rows()));
                continue;
            }
            // Lanes held open by a push block stay open until it exits
            if map.is_ejected(c) {
                continue;
            }
            let naive = (map.top_of(c) + block.height).min(map.rows());
            map.restore(c, self.resting_cap(c, naive));
        }

        Ok(block)
    }

    /// `limit`, lowered to the surface of any resting block in `col` above it
    fn resting_cap(&self, col: usize, limit: i32) -> i32 {
        self.blocks
            .iter()
            .filter(|b| {
                b.kind == BlockKind::Normal
                    && b.settled
                    && !b.destroyed
                    && b.covers(col)
                    && b.row < limit
            })
            .map(Block::surface)
            .fold(limit, i32::min)
    }

    /// Whether a push block still on the board covers `col`
    fn push_holds(&self, col: usize, rows: i32) -> bool {
        self.blocks
            .iter()
            .any(|b| b.kind == BlockKind::Push && b.row <= rows && b.covers(col))
    }
}
