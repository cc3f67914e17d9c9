//! Falling-block simulation
//!
//! All gameplay rules live here. This module must stay free of timers and
//! platform code:
//! - One writer: `Simulation::step` is the only thing that mutates the board
//! - External requests are buffered and drained at the next tick
//! - Stable iteration order (spawn order) and a seeded spawn RNG

pub mod block;
pub mod character;
pub mod collision;
pub mod column_map;
pub mod scheduler;
pub mod spawn;
pub mod state;
pub mod tick;

pub use block::{Block, BlockKind, BlockSet};
pub use character::{Character, Move};
pub use collision::check_collision;
pub use column_map::ColumnHeightMap;
pub use scheduler::{Scheduler, SessionObserver};
pub use spawn::{SpawnGate, SpawnHint, SpawnRequest};
pub use state::{SimEvent, Simulation, Snapshot};
pub use tick::{Resolution, TickOutcome, resolve_tick, tick};
