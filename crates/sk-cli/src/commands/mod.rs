pub mod opposed;
pub mod roll;
pub mod run;

use colored::{ColoredString, Colorize};
use rand::SeedableRng;
use rand::rngs::StdRng;

use sk_mechanics::{PoolRoll, RngDice};

/// Dice seeded from `seed`, or from the OS when none is given.
pub fn dice(seed: Option<u64>) -> RngDice<StdRng> {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    RngDice::new(rng)
}

/// Roll summary, red on a glitch.
fn colorize_summary(roll: &PoolRoll, threshold: Option<u32>) -> ColoredString {
    let summary = roll.summary(threshold);
    if roll.is_critical_glitch {
        summary.red().bold()
    } else if roll.is_glitch {
        summary.red()
    } else if roll.hits > 0 {
        summary.green()
    } else {
        summary.normal()
    }
}
