//! txfall - dodge the falling pending transactions
//!
//! Core modules:
//! - `sim`: Per-tick simulation (column map, blocks, character, scheduler)
//! - `settings`: Session configuration loaded from JSON
//! - `session`: Host-side collaborators (scoreboard, boost)
//! - `error`: Crate error and notice types

pub mod error;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{Notice, SimError};
pub use session::{Scoreboard, Session};
pub use settings::SessionConfig;

/// Game timing and tuning constants
pub mod consts {
    use std::time::Duration;

    /// Tick period at gravity 1 (a block falls one row per tick)
    pub const BASE_TICK: Duration = Duration::from_millis(500);
    /// Maximum simulation steps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Host frames longer than this are clamped (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: Duration = Duration::from_millis(1000);

    /// Invulnerability window after spawn/retry
    pub const GRACE_DURATION: Duration = Duration::from_millis(3000);
    /// Rows gained by a single jump
    pub const JUMP_ROWS: i32 = 1;
    /// Lives at session start
    pub const DEFAULT_LIVES: u32 = 3;

    /// Events with a size hint above this spawn as double-width blocks
    pub const WIDE_SIZE_THRESHOLD: u64 = 300_000;
    /// Block width for events above the size threshold
    pub const WIDE_BLOCK_WIDTH: usize = 2;

    /// Gravity multiplier while boosting
    pub const BOOST_GRAVITY: u32 = 2;
    /// How long a boost lasts
    pub const BOOST_DURATION: Duration = Duration::from_secs(20);
}
