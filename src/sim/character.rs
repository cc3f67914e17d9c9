//! The player character
//!
//! The character is one column wide and `height` rows tall; `row` is its top
//! row. Moves are validated against the column map before being applied.

use std::time::Duration;

use serde::Serialize;

use super::column_map::ColumnHeightMap;
use crate::error::Notice;

/// A discrete movement command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Move {
    Left,
    Right,
    Jump,
}

/// Character position and life flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub row: i32,
    pub col: usize,
    pub height: i32,
    pub dead: bool,
    pub invulnerable: bool,
    /// Time left before `invulnerable` clears
    #[serde(skip)]
    pub grace_remaining: Duration,
}

impl Character {
    /// Spawn standing on the floor of column 0, protected for `grace`
    pub fn spawn(rows: i32, height: i32, grace: Duration) -> Self {
        let mut character = Self {
            row: 0,
            col: 0,
            height,
            dead: false,
            invulnerable: false,
            grace_remaining: Duration::ZERO,
        };
        character.respawn(rows, grace);
        character
    }

    /// Back to the spawn cell, alive and invulnerable
    pub fn respawn(&mut self, rows: i32, grace: Duration) {
        self.col = 0;
        self.row = (rows - self.height).max(0);
        self.dead = false;
        self.grace(grace);
    }

    /// Start a fresh invulnerability window
    pub fn grace(&mut self, duration: Duration) {
        self.grace_remaining = duration;
        self.invulnerable = !duration.is_zero();
    }

    /// Count down the grace window. Returns true on the tick it ends.
    pub fn tick_grace(&mut self, dt: Duration) -> bool {
        if !self.invulnerable {
            return false;
        }
        self.grace_remaining = self.grace_remaining.saturating_sub(dt);
        if self.grace_remaining.is_zero() {
            self.invulnerable = false;
            return true;
        }
        false
    }

    /// Apply one movement command
    pub fn apply(
        &mut self,
        mv: Move,
        map: &ColumnHeightMap,
        jump_rows: i32,
    ) -> Result<(), Notice> {
        match mv {
            Move::Left => self.step_sideways(-1, map),
            Move::Right => self.step_sideways(1, map),
            Move::Jump => {
                self.row = (self.row - jump_rows).max(0);
                Ok(())
            }
        }
    }

    /// Horizontal move, allowed only with full headroom in the target lane
    fn step_sideways(&mut self, dir: isize, map: &ColumnHeightMap) -> Result<(), Notice> {
        let clamped = Notice::ClampedMovement {
            from: self.col,
            toward: self.col as isize + dir,
        };
        let Some(target) = self.col.checked_add_signed(dir) else {
            return Err(clamped);
        };
        match map.get(target) {
            Some(top) if top - self.row >= self.height => {
                self.col = target;
                Ok(())
            }
            _ => Err(clamped),
        }
    }

    /// Fall one row, or land on the stack in the current lane. A stack taller
    /// than the board's headroom pins the character at row 0.
    ///
    /// Must run after blocks have advanced so it sees this tick's stacks.
    pub fn apply_gravity(&mut self, map: &ColumnHeightMap) {
        // Lanes held open by a push block still have a floor for the player
        let ground = map.top_of(self.col).min(map.rows());
        if self.row + self.height >= ground {
            self.row = (ground - self.height).max(0);
        } else {
            self.row += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_on_floor() {
        let c = Character::spawn(10, 2, Duration::from_secs(3));
        assert_eq!((c.row, c.col), (8, 0));
        assert!(c.invulnerable);
        assert!(!c.dead);
    }

    #[test]
    fn test_gravity_snaps_to_stack() {
        let mut map = ColumnHeightMap::new(5, 10);
        map.push(2, 6);
        let mut c = Character::spawn(10, 2, Duration::ZERO);
        c.row = 5;
        c.col = 2;

        c.apply_gravity(&map);
        assert_eq!(c.row, 4);
    }

    #[test]
    fn test_gravity_falls_one_row() {
        let map = ColumnHeightMap::new(3, 10);
        let mut c = Character::spawn(10, 2, Duration::ZERO);
        c.row = 3;
        c.apply_gravity(&map);
        assert_eq!(c.row, 4);
    }

    #[test]
    fn test_gravity_over_ejected_lane_keeps_floor() {
        let mut map = ColumnHeightMap::new(3, 10);
        map.push(0, 20);
        let mut c = Character::spawn(10, 2, Duration::ZERO);
        c.apply_gravity(&map);
        assert_eq!(c.row, 8);
    }

    #[test]
    fn test_gravity_never_lifts_above_top_row() {
        let mut map = ColumnHeightMap::new(3, 10);
        map.push(0, 1);
        let mut c = Character::spawn(10, 2, Duration::from_secs(3));
        c.apply_gravity(&map);
        assert_eq!(c.row, 0);
    }

    #[test]
    fn test_move_needs_headroom() {
        let mut map = ColumnHeightMap::new(3, 10);
        map.push(1, 9);
        let mut c = Character::spawn(10, 2, Duration::ZERO);

        // Stack in column 1 would overlap the character's feet
        assert!(c.apply(Move::Right, &map, 1).is_err());
        assert_eq!(c.col, 0);

        c.row = 7;
        assert!(c.apply(Move::Right, &map, 1).is_ok());
        assert_eq!(c.col, 1);
    }

    #[test]
    fn test_move_clamps_at_edges() {
        let map = ColumnHeightMap::new(2, 10);
        let mut c = Character::spawn(10, 2, Duration::ZERO);
        assert_eq!(
            c.apply(Move::Left, &map, 1),
            Err(Notice::ClampedMovement { from: 0, toward: -1 })
        );
        c.apply(Move::Right, &map, 1).unwrap();
        assert!(c.apply(Move::Right, &map, 1).is_err());
        assert_eq!(c.col, 1);
    }

    #[test]
    fn test_jump_clamps_at_top() {
        let map = ColumnHeightMap::new(2, 10);
        let mut c = Character::spawn(10, 2, Duration::ZERO);
        c.row = 1;
        c.apply(Move::Jump, &map, 3).unwrap();
        assert_eq!(c.row, 0);
    }

    #[test]
    fn test_grace_runs_out() {
        let mut c = Character::spawn(10, 2, Duration::from_millis(1000));
        assert!(!c.tick_grace(Duration::from_millis(500)));
        assert!(c.invulnerable);
        assert!(c.tick_grace(Duration::from_millis(500)));
        assert!(!c.invulnerable);
        assert!(!c.tick_grace(Duration::from_millis(500)));
    }
}
