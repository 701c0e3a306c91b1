//! Descriptive bands for hit counts.

use serde::{Deserialize, Serialize};

/// How good a number of hits is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitQuality {
    /// Zero hits.
    NoHits,
    /// Exactly one hit.
    Single,
    /// Two or three hits.
    Marginal,
    /// Four or five hits.
    Good,
    /// Six to eight hits.
    Great,
    /// Nine or more hits.
    Exceptional,
}

impl HitQuality {
    /// Classify a hit count.
    pub fn from_hits(hits: u32) -> Self {
        match hits {
            0 => Self::NoHits,
            1 => Self::Single,
            2..=3 => Self::Marginal,
            4..=5 => Self::Good,
            6..=8 => Self::Great,
            _ => Self::Exceptional,
        }
    }

    /// Human-readable description of a hit count, e.g. `4 hits (Good success)`.
    pub fn describe(hits: u32) -> String {
        match Self::from_hits(hits) {
            Self::NoHits => "No hits".to_string(),
            Self::Single => "1 hit".to_string(),
            Self::Marginal => format!("{hits} hits (Marginal success)"),
            Self::Good => format!("{hits} hits (Good success)"),
            Self::Great => format!("{hits} hits (Great success)"),
            Self::Exceptional => format!("{hits} hits (Exceptional success!)"),
        }
    }
}
