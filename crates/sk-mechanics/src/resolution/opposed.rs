//! Opposed tests between two rolls.

use serde::{Deserialize, Serialize};

/// Which side came out ahead in an opposed test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// The attacker rolled more hits.
    Attacker,
    /// The defender rolled more hits.
    Defender,
    /// Both sides rolled the same number of hits.
    Tie,
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attacker => write!(f, "attacker"),
            Self::Defender => write!(f, "defender"),
            Self::Tie => write!(f, "tie"),
        }
    }
}

/// The outcome of comparing attacker and defender hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpposedResult {
    /// Which side won.
    pub winner: Winner,
    /// Absolute difference between the two hit counts.
    pub net_hits: u32,
    /// Whether the attacker's action goes through. False on a tie.
    pub attacker_succeeds: bool,
}

impl OpposedResult {
    /// The side that prevails once ties are settled in the defender's favour.
    pub fn prevailing(&self) -> Winner {
        if self.attacker_succeeds {
            Winner::Attacker
        } else {
            Winner::Defender
        }
    }
}

/// Compare attacker hits with defender hits.
///
/// A tie is reported as [`Winner::Tie`] but resolves in the defender's favour:
/// the attacker only succeeds with strictly more hits.
pub fn opposed_test(attacker_hits: u32, defender_hits: u32) -> OpposedResult {
    let winner = match attacker_hits.cmp(&defender_hits) {
        std::cmp::Ordering::Greater => Winner::Attacker,
        std::cmp::Ordering::Less => Winner::Defender,
        std::cmp::Ordering::Equal => Winner::Tie,
    };
    OpposedResult {
        winner,
        net_hits: attacker_hits.abs_diff(defender_hits),
        attacker_succeeds: winner == Winner::Attacker,
    }
}
