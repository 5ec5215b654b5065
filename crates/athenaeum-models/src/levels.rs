//! The academic level hierarchy.
//!
//! Levels form a total order by academic seniority:
//! `L100 < L200 < L300 < L400 < MASTERS < PHD`. A caller may access a
//! resource when their level is greater than or equal to the resource's.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Variant order is the hierarchy order; `Ord` is derived from it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    L100,
    L200,
    L300,
    L400,
    Masters,
    Phd,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid level '{0}', expected one of L100, L200, L300, L400, MASTERS, PHD")]
pub struct ParseLevelError(pub String);

impl Level {
    pub const ALL: [Level; 6] = [
        Level::L100,
        Level::L200,
        Level::L300,
        Level::L400,
        Level::Masters,
        Level::Phd,
    ];

    /// Position in the hierarchy, starting at 0 for L100.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::L100 => "L100",
            Level::L200 => "L200",
            Level::L300 => "L300",
            Level::L400 => "L400",
            Level::Masters => "MASTERS",
            Level::Phd => "PHD",
        }
    }

    /// True when a holder of `self` may access material tagged `required`.
    pub fn satisfies(self, required: Level) -> bool {
        self.index() >= required.index()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == upper)
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}
