//! Interpreting hits: thresholds, opposed tests, and hit quality.
//!
//! - **Threshold check**: a roll succeeds when its hits meet a threshold
//! - **Opposed test**: two rolls compare hits, ties go to the defender
//! - **Hit quality**: a descriptive band for a hit count

pub mod opposed;
pub mod quality;

pub use opposed::{OpposedResult, Winner, opposed_test};
pub use quality::HitQuality;

/// Check hits against an optional threshold.
///
/// Returns `None` when no threshold applies, otherwise whether
/// `hits >= threshold`.
pub fn check_success(hits: u32, threshold: Option<u32>) -> Option<bool> {
    threshold.map(|t| hits >= t)
}
