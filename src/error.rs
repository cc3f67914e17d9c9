//! Error and notice types
//!
//! Only session construction can fail. Everything that goes wrong mid-session
//! is absorbed as a no-op and reported as a [`Notice`].

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the host
#[derive(Debug, Error)]
pub enum SimError {
    /// Session parameters rejected at start
    #[error("invalid session config: {field} {reason}")]
    InvalidSessionConfig {
        field: &'static str,
        reason: &'static str,
    },
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Informational, non-fatal outcomes of external requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// A spawn request reused the id of a live block
    IgnoredDuplicateSpawn { id: String },
    /// A confirmation named no live block
    IgnoredUnknownConfirmation { id: String },
    /// A horizontal move was blocked by the grid edge or a stack
    ClampedMovement { from: usize, toward: isize },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::IgnoredDuplicateSpawn { id } => write!(f, "duplicate spawn ignored: {id}"),
            Notice::IgnoredUnknownConfirmation { id } => {
                write!(f, "unknown confirmation ignored: {id}")
            }
            Notice::ClampedMovement { from, toward } => {
                write!(f, "move from column {from} toward {toward} clamped")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = SimError::InvalidSessionConfig {
            field: "rows",
            reason: "must be at least 1",
        };
        assert_eq!(err.to_string(), "invalid session config: rows must be at least 1");
    }

    #[test]
    fn test_json_error_converts() {
        let parse = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: SimError = parse.into();
        assert!(matches!(err, SimError::Json(_)));
    }
}
