//! Tick scheduler
//!
//! Owns the simulation and is the only thing that steps it, so a session can
//! never have two ticks in flight. Hosts call [`Scheduler::tick`] with the
//! elapsed frame time; whole tick periods are simulated, the remainder carries
//! over to the next frame.

use std::time::Duration;

use super::character::Move;
use super::spawn::SpawnHint;
use super::state::{SimEvent, Simulation, Snapshot};
use crate::consts::{BASE_TICK, MAX_FRAME_DT, MAX_SUBSTEPS};

/// Host-side receiver for life and score relevant events
pub trait SessionObserver {
    /// The character lost a life. Called once per collision.
    fn on_death(&mut self, _lives_left: u32) {}
    /// A block was removed because its event was finalized
    fn on_block_resolved(&mut self, _id: &str) {}
    /// Post-retry invulnerability ended
    fn on_grace_ended(&mut self) {}
}

impl SessionObserver for () {}

/// Drives a [`Simulation`] at a fixed period
#[derive(Debug)]
pub struct Scheduler {
    sim: Simulation,
    gravity: u32,
    accumulator: Duration,
    running: bool,
    feed_attached: bool,
}

impl Scheduler {
    /// Wrap a simulation. The timer is not running until [`Self::start`].
    pub fn new(sim: Simulation, gravity: u32) -> Self {
        Self {
            sim,
            gravity: gravity.max(1),
            accumulator: Duration::ZERO,
            running: false,
            feed_attached: false,
        }
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_feed_attached(&self) -> bool {
        self.feed_attached
    }

    pub fn gravity(&self) -> u32 {
        self.gravity
    }

    /// Current tick period
    pub fn period(&self) -> Duration {
        BASE_TICK / self.gravity
    }

    /// Install the tick timer and attach the spawn feed. Replaces any timer
    /// already installed.
    pub fn start(&mut self) {
        if self.running {
            self.stop();
        }
        self.accumulator = Duration::ZERO;
        self.running = true;
        self.feed_attached = true;
        log::debug!("Tick timer started at {:?}", self.period());
    }

    /// Cancel the tick timer and detach the spawn feed
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Tick timer stopped");
        }
        self.running = false;
        self.feed_attached = false;
        self.accumulator = Duration::ZERO;
    }

    /// Change the gravity multiplier. A running timer is reinstalled with the
    /// new period.
    pub fn set_gravity(&mut self, gravity: u32) {
        let gravity = gravity.max(1);
        if gravity == self.gravity {
            return;
        }
        let was_running = self.running;
        self.stop();
        self.gravity = gravity;
        if was_running {
            self.start();
        }
        log::info!("Gravity set to {}", gravity);
    }

    /// Forward an external event to the spawn gate while the feed is attached
    pub fn notify_event(&mut self, id: impl Into<String>, hint: SpawnHint) -> bool {
        if !self.feed_attached {
            return false;
        }
        self.sim.notify_event(id, hint);
        true
    }

    /// Forward a finalization notice
    pub fn confirm(&mut self, id: impl Into<String>) {
        self.sim.confirm(id);
    }

    pub fn request_move(&mut self, mv: Move) {
        self.sim.request_move(mv);
    }

    /// Revive after death and restart the timer
    pub fn retry(&mut self) -> bool {
        if !self.sim.retry() {
            return false;
        }
        self.start();
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        self.sim.snapshot()
    }

    /// Advance by host frame time `dt`. Returns the number of ticks run.
    pub fn tick(&mut self, dt: Duration, observer: &mut impl SessionObserver) -> u32 {
        if !self.running {
            return 0;
        }

        let period = self.period();
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= period && steps < MAX_SUBSTEPS {
            self.accumulator -= period;
            self.sim.step(period);
            steps += 1;

            self.dispatch(observer);

            if self.sim.character.dead {
                // Death ends the run until an explicit retry
                self.stop();
                break;
            }
        }

        if steps == MAX_SUBSTEPS && self.accumulator >= period {
            log::warn!("Dropping {:?} of simulation backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        steps
    }

    fn dispatch(&mut self, observer: &mut impl SessionObserver) {
        for event in self.sim.drain_events() {
            match event {
                SimEvent::Died { lives_left, .. } => observer.on_death(lives_left),
                SimEvent::BlockResolved { id } => observer.on_block_resolved(&id),
                SimEvent::GraceEnded => observer.on_grace_ended(),
                SimEvent::BlockDestroyed { id } => log::debug!("Block {} crushed", id),
                SimEvent::Ignored(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SessionConfig;
    use crate::sim::block::{Block, BlockKind};

    #[derive(Default)]
    struct Recorder {
        deaths: Vec<u32>,
        resolved: Vec<String>,
        grace_ended: u32,
    }

    impl SessionObserver for Recorder {
        fn on_death(&mut self, lives_left: u32) {
            self.deaths.push(lives_left);
        }
        fn on_block_resolved(&mut self, id: &str) {
            self.resolved.push(id.to_string());
        }
        fn on_grace_ended(&mut self) {
            self.grace_ended += 1;
        }
    }

    fn scheduler(gravity: u32) -> Scheduler {
        let config = SessionConfig {
            rows: 8,
            cols: 5,
            seed: Some(7),
            ..Default::default()
        };
        Scheduler::new(Simulation::new(&config).unwrap(), gravity)
    }

    #[test]
    fn test_no_ticks_until_started() {
        let mut s = scheduler(1);
        assert_eq!(s.tick(Duration::from_secs(1), &mut ()), 0);
        assert!(!s.notify_event("a", SpawnHint::default()));

        s.start();
        assert!(s.notify_event("a", SpawnHint::default()));
        assert_eq!(s.tick(Duration::from_millis(250), &mut ()), 0);
        assert_eq!(s.tick(Duration::from_millis(250), &mut ()), 1);
        assert_eq!(s.sim().time_ticks, 1);
    }

    #[test]
    fn test_frame_time_carries_over() {
        let mut s = scheduler(1);
        s.start();
        assert_eq!(s.tick(Duration::from_millis(700), &mut ()), 1);
        assert_eq!(s.tick(Duration::from_millis(300), &mut ()), 1);
        assert_eq!(s.tick(Duration::from_millis(400), &mut ()), 0);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut s = scheduler(4);
        s.start();
        // 125 ms period; a 10 s stall only simulates one clamped second
        assert_eq!(s.tick(Duration::from_secs(10), &mut ()), 8);
        assert_eq!(s.tick(Duration::ZERO, &mut ()), 0);
    }

    #[test]
    fn test_gravity_change_restarts_timer() {
        let mut s = scheduler(1);
        s.start();
        s.tick(Duration::from_millis(400), &mut ());
        s.set_gravity(2);
        assert!(s.is_running());
        assert_eq!(s.period(), Duration::from_millis(250));
        // Partial progress from the old timer is discarded
        assert_eq!(s.tick(Duration::from_millis(200), &mut ()), 0);
        assert_eq!(s.tick(Duration::from_millis(50), &mut ()), 1);
    }

    #[test]
    fn test_death_stops_timer_until_retry() {
        let mut s = scheduler(1);
        s.start();
        s.sim.character.grace(Duration::ZERO);
        let (row, col) = (s.sim.character.row, s.sim.character.col);
        s.sim.blocks.push_unchecked(Block {
            row: row - 1,
            ..Block::new("a", col, 1, BlockKind::Normal)
        });

        let mut recorder = Recorder::default();
        assert_eq!(s.tick(Duration::from_secs(1), &mut recorder), 1);
        assert_eq!(recorder.deaths, vec![2]);
        assert!(!s.is_running());
        assert!(!s.is_feed_attached());
        assert_eq!(s.tick(Duration::from_secs(1), &mut recorder), 0);

        assert!(s.retry());
        assert!(s.is_running());
        assert!(s.sim().character.invulnerable);

        // Six half-second ticks use up the grace window
        s.tick(Duration::from_secs(1), &mut recorder);
        s.tick(Duration::from_secs(1), &mut recorder);
        s.tick(Duration::from_secs(1), &mut recorder);
        assert_eq!(recorder.grace_ended, 1);
        assert!(!s.sim().character.invulnerable);
    }

    #[test]
    fn test_resolved_blocks_reach_observer() {
        let mut s = scheduler(1);
        s.start();
        s.notify_event("a", SpawnHint::default());
        s.tick(Duration::from_millis(500), &mut ());
        s.confirm("a");

        let mut recorder = Recorder::default();
        s.tick(Duration::from_millis(500), &mut recorder);
        assert_eq!(recorder.resolved, vec!["a".to_string()]);
        assert!(s.snapshot().blocks.is_empty());
    }
}
