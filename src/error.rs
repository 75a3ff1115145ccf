//! Error taxonomy for the prediction core.
//!
//! Missing optional statistics are never errors (they resolve to documented
//! league-average defaults in `models`). The variants here cover caller
//! errors: lookups that cannot degrade to a fallback and configurations the
//! engine rejects before computing anything.

use std::fmt;
use thiserror::Error;

/// Which side of a matchup an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    /// A team identifier could not be resolved in the ratings table, even
    /// after normalization and fuzzy matching. Always names the failing side
    /// and the original identifier.
    #[error("{side} team '{name}' not found in ratings table")]
    TeamNotFound { side: TeamSide, name: String },

    /// A precondition on the inputs was violated (e.g. non-positive sigma).
    /// Rejected synchronously before any computation.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
