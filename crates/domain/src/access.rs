use std::str::FromStr;

use frequencia_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Access level carried by grants and required by features.
///
/// Levels are ordered: `Manage` satisfies every `Read` requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Allows listing and viewing.
    Read,
    /// Allows create, update and delete operations.
    Manage,
}

impl AccessLevel {
    /// Returns a stable storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Manage => "manage",
        }
    }

    /// Returns whether this level meets `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    /// Parses a transport value into an access level.
    pub fn parse_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl FromStr for AccessLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "manage" => Ok(Self::Manage),
            _ => Err(AppError::Validation(format!(
                "unknown access level '{value}'"
            ))),
        }
    }
}
