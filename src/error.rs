//! Error types for the fallible edges of the game
//!
//! The per-tick simulation never fails; errors only come from loading
//! tuning, talking to storage and applying player commands.

use std::fmt;

use crate::sim::progression::TechKind;

/// Top-level error enum
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// The key-value store refused a read or write.
    Storage {
        key: &'static str,
        reason: String,
    },

    /// A stored value exists but cannot be parsed.
    CorruptValue {
        key: &'static str,
        reason: String,
    },

    /// Tuning JSON is malformed or a value is outside its usable range.
    InvalidTuning(String),

    /// A tech purchase was attempted without enough plasma.
    InsufficientPlasma {
        tech: TechKind,
        cost: u32,
        available: u32,
    },

    /// The tech is already unlocked; buying it twice is refused.
    AlreadyUnlocked(TechKind),

    /// The command does not apply in the current game phase.
    CommandRejected {
        command: &'static str,
        phase: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Storage { key, reason } => {
                write!(f, "storage access for '{}' failed: {}", key, reason)
            }
            GameError::CorruptValue { key, reason } => {
                write!(f, "stored value for '{}' is corrupt: {}", key, reason)
            }
            GameError::InvalidTuning(reason) => write!(f, "invalid tuning: {}", reason),
            GameError::InsufficientPlasma {
                tech,
                cost,
                available,
            } => write!(
                f,
                "cannot unlock {}: costs {} plasma, only {} available",
                tech.storage_key(),
                cost,
                available
            ),
            GameError::AlreadyUnlocked(tech) => {
                write!(f, "{} is already unlocked", tech.storage_key())
            }
            GameError::CommandRejected { command, phase } => {
                write!(f, "command '{}' is not valid while {}", command, phase)
            }
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_tech() {
        let err = GameError::InsufficientPlasma {
            tech: TechKind::AutoAim,
            cost: 15,
            available: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("autoAim"));
        assert!(msg.contains("15"));
    }
}
