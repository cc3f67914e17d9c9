//! Simulation state
//!
//! Everything one session mutates lives in [`Simulation`]. External requests
//! are buffered here and only take effect when the next tick drains them.

use std::time::Duration;

use serde::Serialize;

use super::block::{Block, BlockSet};
use super::character::{Character, Move};
use super::column_map::ColumnHeightMap;
use super::spawn::{SpawnGate, SpawnHint, SpawnRequest};
use crate::error::{Notice, SimError};
use crate::settings::SessionConfig;

/// Something the host should know about after a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SimEvent {
    /// The character was hit and lost a life
    Died { by: String, lives_left: u32 },
    /// A block was removed because its event was finalized
    BlockResolved { id: String },
    /// A wide block was crushed over an ejected lane
    BlockDestroyed { id: String },
    /// Post-retry invulnerability is over
    GraceEnded,
    /// A request was absorbed as a no-op
    Ignored(Notice),
}

/// Requests waiting for the next tick boundary
#[derive(Debug, Clone, Default)]
pub(crate) struct PendingRequests {
    pub spawns: Vec<SpawnRequest>,
    pub confirms: Vec<String>,
    pub moves: Vec<Move>,
}

/// Read-only view handed to presentation each tick
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub lives: u32,
    pub tops: Vec<i32>,
    pub blocks: Vec<Block>,
    pub character: Character,
}

/// One game session's simulation
#[derive(Debug, Clone)]
pub struct Simulation {
    pub map: ColumnHeightMap,
    pub blocks: BlockSet,
    pub character: Character,
    /// Lives left
    pub lives: u32,
    /// Ticks simulated since session start
    pub time_ticks: u64,
    pub(crate) spawner: SpawnGate,
    pub(crate) pending: PendingRequests,
    pub(crate) events: Vec<SimEvent>,
    pub(crate) jump_rows: i32,
    grace: Duration,
}

impl Simulation {
    /// Start a session. Invalid parameters are rejected here and nowhere else.
    pub fn new(config: &SessionConfig) -> Result<Self, SimError> {
        config.validate()?;

        let rows = config.rows as i32;
        let cols = config.cols as usize;
        let seed = config.seed.unwrap_or_else(rand::random);
        let grace = config.grace();
        log::info!(
            "Session {}x{} started (seed {}, {} lives)",
            cols,
            rows,
            seed,
            config.lives
        );

        Ok(Self {
            map: ColumnHeightMap::new(cols, rows),
            blocks: BlockSet::new(),
            character: Character::spawn(rows, config.character_height as i32, grace),
            lives: config.lives,
            time_ticks: 0,
            spawner: SpawnGate::new(seed, config.wide_size_threshold),
            pending: PendingRequests::default(),
            events: Vec::new(),
            jump_rows: config.jump_rows as i32,
            grace,
        })
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.map.rows()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.map.cols()
    }

    /// Queue a block for an external event
    pub fn notify_event(&mut self, id: impl Into<String>, hint: SpawnHint) {
        self.pending.spawns.push(SpawnRequest {
            id: id.into(),
            hint,
        });
    }

    /// Queue removal of a block whose event was finalized
    pub fn confirm(&mut self, id: impl Into<String>) {
        self.pending.confirms.push(id.into());
    }

    pub fn request_move(&mut self, mv: Move) {
        self.pending.moves.push(mv);
    }

    pub fn move_left(&mut self) {
        self.request_move(Move::Left);
    }

    pub fn move_right(&mut self) {
        self.request_move(Move::Right);
    }

    pub fn jump(&mut self) {
        self.request_move(Move::Jump);
    }

    /// No lives left, retry is refused
    pub fn is_game_over(&self) -> bool {
        self.character.dead && self.lives == 0
    }

    /// Revive after a death: clear the board and respawn with a fresh grace
    /// window. Returns false if the character is alive or no lives are left.
    pub fn retry(&mut self) -> bool {
        if !self.character.dead {
            return false;
        }
        if self.lives == 0 {
            log::warn!("Retry refused: no lives left");
            return false;
        }

        let rows = self.rows();
        let cols = self.cols();
        self.map.reset(cols, rows);
        self.blocks.clear();
        self.pending.spawns.clear();
        self.pending.moves.clear();
        self.character.respawn(rows, self.grace);
        log::info!("Retry with {} lives left", self.lives);
        true
    }

    /// Advance one tick
    pub fn step(&mut self, dt: Duration) {
        super::tick::tick(self, dt);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.time_ticks,
            lives: self.lives,
            tops: self.map.as_slice().to_vec(),
            blocks: self.blocks.iter().cloned().collect(),
            character: self.character.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_layout() {
        let config = SessionConfig {
            rows: 8,
            cols: 5,
            ..Default::default()
        };
        let sim = Simulation::new(&config).unwrap();
        assert_eq!(sim.map.as_slice(), &[8; 5]);
        assert!(sim.blocks.is_empty());
        assert_eq!(sim.character.row, 6);
        assert!(sim.character.invulnerable);
        assert_eq!(sim.lives, 3);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SessionConfig {
            cols: 0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(&config),
            Err(SimError::InvalidSessionConfig { field: "cols", .. })
        ));
    }

    #[test]
    fn test_requests_wait_for_tick() {
        let mut sim = Simulation::new(&SessionConfig::default()).unwrap();
        sim.notify_event("a", SpawnHint::default());
        sim.move_right();
        assert!(sim.blocks.is_empty());
        assert_eq!(sim.character.col, 0);
        assert_eq!(sim.pending.spawns.len(), 1);
        assert_eq!(sim.pending.moves.len(), 1);
    }

    #[test]
    fn test_retry_requires_death() {
        let mut sim = Simulation::new(&SessionConfig::default()).unwrap();
        assert!(!sim.retry());
    }

    #[test]
    fn test_snapshot_serializes() {
        let sim = Simulation::new(&SessionConfig::default()).unwrap();
        let json = serde_json::to_string(&sim.snapshot()).unwrap();
        assert!(json.contains("\"character\""));
        assert!(!json.contains("grace_remaining"));
    }
}
