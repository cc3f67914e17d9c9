//! Spawn gate: turns external event notifications into blocks

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockKind, BlockSet};
use crate::consts::WIDE_BLOCK_WIDTH;
use crate::error::Notice;

/// Hints attached to an external event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnHint {
    /// Event size (gas for a transaction); large events become wide blocks
    pub size_hint: u64,
    /// High-value event, spawns a push block
    pub push: bool,
    /// Preferred lane; ignored when it would not fit
    pub lane: Option<usize>,
}

/// A buffered spawn request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub id: String,
    pub hint: SpawnHint,
}

/// Chooses lanes and widths for incoming events
#[derive(Debug, Clone)]
pub struct SpawnGate {
    rng: Pcg32,
    wide_size_threshold: u64,
}

impl SpawnGate {
    pub fn new(seed: u64, wide_size_threshold: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            wide_size_threshold,
        }
    }

    /// Block width for an event of the given size on a board `cols` wide
    pub fn width_for(&self, size_hint: u64, cols: usize) -> usize {
        let width = if size_hint > self.wide_size_threshold {
            WIDE_BLOCK_WIDTH
        } else {
            1
        };
        width.min(cols).max(1)
    }

    /// Leftmost column for a block of `width`, uniform over lanes it fits in
    pub fn lane_for(&mut self, hint: Option<usize>, width: usize, cols: usize) -> usize {
        let last = cols.saturating_sub(width);
        match hint {
            Some(lane) if lane <= last => lane,
            _ => self.rng.random_range(0..=last),
        }
    }

    /// Admit a request into the block set at row 0
    pub fn admit(
        &mut self,
        request: SpawnRequest,
        blocks: &mut BlockSet,
        cols: usize,
    ) -> Result<(), Notice> {
        if blocks.contains(&request.id) {
            return Err(Notice::IgnoredDuplicateSpawn { id: request.id });
        }

        let width = self.width_for(request.hint.size_hint, cols);
        let col = self.lane_for(request.hint.lane, width, cols);
        let kind = if request.hint.push {
            BlockKind::Push
        } else {
            BlockKind::Normal
        };
        log::trace!(
            "spawn {} at col {} width {} ({:?})",
            request.id,
            col,
            width,
            kind
        );
        blocks.insert(Block::new(request.id, col, width, kind))
    }
}
