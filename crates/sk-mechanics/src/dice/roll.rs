//! Pool roll results, glitch detection, and display.

use serde::{Deserialize, Serialize};

use super::is_hit;
use crate::resolution::{HitQuality, check_success};

/// The result of rolling a dice pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRoll {
    /// Faces of the original dice, in roll order.
    pub raw_results: Vec<u32>,
    /// Original faces followed by every exploded die.
    pub all_results: Vec<u32>,
    /// Number of hits across all dice, exploded ones included.
    pub hits: u32,
    /// Number of ones among the original dice.
    pub ones_count: u32,
    /// More than half of the original dice came up 1.
    pub is_glitch: bool,
    /// A glitch with zero hits.
    pub is_critical_glitch: bool,
}

impl PoolRoll {
    /// Build a result from the original faces and the full face list.
    ///
    /// `all_results` must start with `raw_results`.
    pub fn from_faces(raw_results: Vec<u32>, all_results: Vec<u32>) -> Self {
        let hits = all_results.iter().filter(|&&f| is_hit(f)).count() as u32;
        let ones_count = raw_results.iter().filter(|&&f| f == 1).count() as u32;
        let is_glitch = ones_count * 2 > raw_results.len() as u32;
        Self {
            raw_results,
            all_results,
            hits,
            ones_count,
            is_glitch,
            is_critical_glitch: is_glitch && hits == 0,
        }
    }

    /// Number of dice in the pool before explosions.
    pub fn pool_size(&self) -> usize {
        self.raw_results.len()
    }

    /// Faces produced by explosions only.
    pub fn explosions(&self) -> &[u32] {
        &self.all_results[self.raw_results.len()..]
    }

    /// Whether the roll meets a threshold. `None` when no threshold is given.
    pub fn success(&self, threshold: Option<u32>) -> Option<bool> {
        check_success(self.hits, threshold)
    }

    /// Classify the number of hits.
    pub fn quality(&self) -> HitQuality {
        HitQuality::from_hits(self.hits)
    }

    /// Render the faces with hits as `[5]`, ones as `(1)` and a `|` before
    /// the first exploded die.
    pub fn formatted(&self) -> String {
        format_faces(&self.all_results, Some(self.raw_results.len()))
    }

    /// A one-line summary such as `3 hits - Glitch (Success - needed 2)`.
    pub fn summary(&self, threshold: Option<u32>) -> String {
        let mut out = format!(
            "{} hit{}",
            self.hits,
            if self.hits == 1 { "" } else { "s" }
        );
        if self.is_critical_glitch {
            out.push_str(" - CRITICAL GLITCH!");
        } else if self.is_glitch {
            out.push_str(" - Glitch");
        }
        if let Some(t) = threshold {
            if self.hits >= t {
                out.push_str(&format!(" (Success - needed {t})"));
            } else {
                out.push_str(&format!(" (Failed - needed {t})"));
            }
        }
        out
    }
}

impl std::fmt::Display for PoolRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => {}", self.formatted(), self.summary(None))
    }
}

/// Render a list of faces for display.
///
/// Hits are wrapped in brackets, ones in parentheses. When `original_count`
/// is given and more faces follow it, a `|` marks where explosions begin.
pub fn format_faces(faces: &[u32], original_count: Option<usize>) -> String {
    let mut parts = Vec::with_capacity(faces.len() + 1);
    for (i, &face) in faces.iter().enumerate() {
        if original_count.is_some_and(|n| n > 0 && n == i) {
            parts.push("|".to_string());
        }
        parts.push(if is_hit(face) {
            format!("[{face}]")
        } else if face == 1 {
            format!("({face})")
        } else {
            face.to_string()
        });
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll(raw: &[u32], extra: &[u32]) -> PoolRoll {
        let mut all = raw.to_vec();
        all.extend_from_slice(extra);
        PoolRoll::from_faces(raw.to_vec(), all)
    }

    #[test]
    fn counts_hits_and_ones() {
        let r = roll(&[5, 1, 3, 6], &[]);
        assert_eq!(r.hits, 2);
        assert_eq!(r.ones_count, 1);
        assert!(!r.is_glitch);
        assert_eq!(r.pool_size(), 4);
    }

    #[test]
    fn exploded_hits_count() {
        let r = roll(&[6, 2], &[6, 5]);
        assert_eq!(r.hits, 3);
        assert_eq!(r.explosions(), &[6, 5]);
    }

    #[test]
    fn exactly_half_ones_is_not_a_glitch() {
        assert!(!roll(&[1, 1, 3, 4], &[]).is_glitch);
        assert!(roll(&[1, 1, 1, 4], &[]).is_glitch);
    }

    #[test]
    fn format_marks_hits_ones_and_explosions() {
        assert_eq!(format_faces(&[5, 3, 1, 6], None), "[5] 3 (1) [6]");
        assert_eq!(format_faces(&[6, 2, 6, 4], Some(2)), "[6] 2 | [6] 4");
        assert_eq!(format_faces(&[2, 3], Some(2)), "2 3");
        assert_eq!(format_faces(&[], Some(0)), "");
    }

    #[test]
    fn summary_variants() {
        assert_eq!(roll(&[5, 2], &[]).summary(None), "1 hit");
        assert_eq!(
            roll(&[5, 6, 2], &[]).summary(Some(2)),
            "2 hits (Success - needed 2)"
        );
        assert_eq!(
            roll(&[1, 1, 5], &[]).summary(Some(3)),
            "1 hit - Glitch (Failed - needed 3)"
        );
        assert_eq!(
            roll(&[1, 1, 2], &[]).summary(None),
            "0 hits - CRITICAL GLITCH!"
        );
    }

    #[test]
    fn success_and_quality() {
        let r = roll(&[5, 5, 6, 2], &[]);
        assert_eq!(r.success(None), None);
        assert_eq!(r.success(Some(3)), Some(true));
        assert_eq!(r.success(Some(4)), Some(false));
        assert_eq!(r.quality(), HitQuality::Marginal);
    }

    #[test]
    fn display() {
        let r = roll(&[5, 3], &[]);
        assert_eq!(r.to_string(), "[5] 3 => 1 hit");
    }

    #[test]
    fn serde_roundtrip() {
        let r = roll(&[6, 1], &[4]);
        let json = serde_json::to_string(&r).unwrap();
        let back: PoolRoll = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
