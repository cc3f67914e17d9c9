//! Host-side session glue
//!
//! Keeps the survival clock and score, and runs the timed gravity boost. None
//! of this touches simulation state except through the scheduler's API.

use std::time::Duration;

use serde::Serialize;

use crate::consts::{BOOST_DURATION, BOOST_GRAVITY};
use crate::error::SimError;
use crate::settings::SessionConfig;
use crate::sim::{Move, Scheduler, SessionObserver, Simulation, Snapshot, SpawnHint};

/// Survival time and score
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scoreboard {
    /// Whole seconds survived while the timer was running
    pub seconds: u64,
    pub score: u64,
    pub deaths: u32,
    pub lives_left: Option<u32>,
    pub blocks_resolved: u64,
    #[serde(skip)]
    partial: Duration,
}

impl Scoreboard {
    /// Accrue running time; every full second is worth `gravity²` points
    pub fn accrue(&mut self, dt: Duration, gravity: u32) {
        self.partial += dt;
        while self.partial >= Duration::from_secs(1) {
            self.partial -= Duration::from_secs(1);
            self.seconds += 1;
            self.score += u64::from(gravity) * u64::from(gravity);
        }
    }
}

impl SessionObserver for Scoreboard {
    fn on_death(&mut self, lives_left: u32) {
        self.deaths += 1;
        self.lives_left = Some(lives_left);
    }

    fn on_block_resolved(&mut self, _id: &str) {
        self.blocks_resolved += 1;
    }
}

/// A running game: scheduler, scoreboard and boost timer
#[derive(Debug)]
pub struct Session {
    scheduler: Scheduler,
    scoreboard: Scoreboard,
    base_gravity: u32,
    boost_remaining: Option<Duration>,
}

impl Session {
    /// Validate the config and start the tick timer
    pub fn start(config: &SessionConfig) -> Result<Self, SimError> {
        let sim = Simulation::new(config)?;
        let mut scheduler = Scheduler::new(sim, config.gravity);
        scheduler.start();
        Ok(Self {
            scheduler,
            scoreboard: Scoreboard::default(),
            base_gravity: config.gravity.max(1),
            boost_remaining: None,
        })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn snapshot(&self) -> Snapshot {
        self.scheduler.snapshot()
    }

    pub fn is_boosting(&self) -> bool {
        self.boost_remaining.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.scheduler.sim().character.dead
    }

    pub fn is_game_over(&self) -> bool {
        self.scheduler.sim().is_game_over()
    }

    /// Advance host time by `dt`. Returns the number of ticks simulated.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.scheduler.is_running() {
            self.scoreboard.accrue(dt, self.scheduler.gravity());
        }
        let steps = self.scheduler.tick(dt, &mut self.scoreboard);

        if let Some(remaining) = self.boost_remaining {
            let remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                self.end_boost();
            } else {
                self.boost_remaining = Some(remaining);
            }
        }
        steps
    }

    pub fn notify_event(&mut self, id: impl Into<String>, hint: SpawnHint) -> bool {
        self.scheduler.notify_event(id, hint)
    }

    pub fn confirm(&mut self, id: impl Into<String>) {
        self.scheduler.confirm(id);
    }

    pub fn move_left(&mut self) {
        self.scheduler.request_move(Move::Left);
    }

    pub fn move_right(&mut self) {
        self.scheduler.request_move(Move::Right);
    }

    pub fn jump(&mut self) {
        self.scheduler.request_move(Move::Jump);
    }

    /// Revive after a death, if lives remain
    pub fn retry(&mut self) -> bool {
        self.scheduler.retry()
    }

    /// Double gravity for a while. Refused while dead or already boosting.
    pub fn boost(&mut self) -> bool {
        if self.is_boosting() || self.is_dead() {
            return false;
        }
        self.scheduler.set_gravity(BOOST_GRAVITY);
        self.boost_remaining = Some(BOOST_DURATION);
        log::info!("Boost started for {:?}", BOOST_DURATION);
        true
    }

    fn end_boost(&mut self) {
        self.boost_remaining = None;
        self.scheduler.set_gravity(self.base_gravity);
        log::info!("Boost ended");
    }
}
