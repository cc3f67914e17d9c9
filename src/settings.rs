//! Session configuration
//!
//! Supplied once at session start and fixed for its duration. Loaded from a
//! JSON file by the native binary; every field has a default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_LIVES, GRACE_DURATION, JUMP_ROWS, WIDE_SIZE_THRESHOLD};
use crate::error::SimError;

/// Largest accepted board dimension
pub const MAX_GRID_DIM: u32 = 4096;

/// Largest accepted gravity multiplier
pub const MAX_GRAVITY: u32 = 16;

fn invalid(field: &'static str, reason: &'static str) -> Result<(), SimError> {
    Err(SimError::InvalidSessionConfig { field, reason })
}

/// Session parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Board height in rows
    pub rows: u32,
    /// Board width in lanes
    pub cols: u32,
    /// Rows the character occupies
    pub character_height: u32,
    /// Gravity multiplier; the tick period is `BASE_TICK / gravity`
    pub gravity: u32,
    /// Lives at session start
    pub lives: u32,
    /// Invulnerability after spawn/retry, in milliseconds
    pub grace_ms: u64,
    /// Rows gained per jump
    pub jump_rows: u32,
    /// Events larger than this spawn double-width blocks
    pub wide_size_threshold: u64,
    /// Spawn RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: 20,
            cols: 24,
            character_height: 2,
            gravity: 1,
            lives: DEFAULT_LIVES,
            grace_ms: GRACE_DURATION.as_millis() as u64,
            jump_rows: JUMP_ROWS as u32,
            wide_size_threshold: WIDE_SIZE_THRESHOLD,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Reject parameters the simulation cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        if self.rows == 0 {
            return invalid("rows", "must be at least 1");
        }
        if self.cols == 0 {
            return invalid("cols", "must be at least 1");
        }
        if self.rows > MAX_GRID_DIM {
            return invalid("rows", "exceeds the maximum board size");
        }
        if self.cols > MAX_GRID_DIM {
            return invalid("cols", "exceeds the maximum board size");
        }
        if self.character_height == 0 {
            return invalid("character_height", "must be at least 1");
        }
        if self.character_height > self.rows {
            return invalid("character_height", "must fit on the board");
        }
        if self.gravity == 0 {
            return invalid("gravity", "must be at least 1");
        }
        if self.gravity > MAX_GRAVITY {
            return invalid("gravity", "is too fast");
        }
        if self.jump_rows > self.rows {
            return invalid("jump_rows", "must fit on the board");
        }
        Ok(())
    }

    /// Invulnerability window
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SessionConfig::from_json_str(r#"{ "rows": 8, "cols": 5 }"#).unwrap();
        assert_eq!(config.rows, 8);
        assert_eq!(config.cols, 5);
        assert_eq!(config.character_height, 2);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        for json in [
            r#"{ "rows": 0 }"#,
            r#"{ "cols": 0 }"#,
            r#"{ "character_height": 0 }"#,
            r#"{ "gravity": 0 }"#,
        ] {
            assert!(matches!(
                SessionConfig::from_json_str(json),
                Err(SimError::InvalidSessionConfig { .. })
            ));
        }
    }

    #[test]
    fn test_character_must_fit() {
        let config = SessionConfig {
            rows: 2,
            character_height: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidSessionConfig {
                field: "character_height",
                ..
            })
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_seed() {
        let config = SessionConfig {
            seed: Some(99),
            ..Default::default()
        };
        let back = SessionConfig::from_json_str(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SessionConfig::load("/nonexistent/txfall.json"),
            Err(SimError::Io(_))
        ));
    }
}
