//! Six-sided dice, pools, and rolling.
//!
//! All dice in this system are d6. A face of [`HIT_FACE`] or higher is a hit,
//! a face of [`EXPLODE_FACE`] can explode, and a face of 1 counts toward a
//! glitch.

pub mod pool;
pub mod roll;
pub mod source;

pub use pool::{DicePool, roll_pool};
pub use roll::PoolRoll;
pub use source::{DieSource, RngDice, ScriptedDice};

/// Number of sides on every die.
pub const SIDES: u32 = 6;

/// Lowest face that counts as a hit.
pub const HIT_FACE: u32 = 5;

/// Face that triggers an extra die when a pool explodes.
pub const EXPLODE_FACE: u32 = 6;

/// Smallest pool that can be rolled.
pub const MIN_POOL: u32 = 1;

/// Largest pool that can be rolled.
pub const MAX_POOL: u32 = 50;

/// Upper bound on explosion generations for a single roll.
pub const EXPLOSION_CAP: u32 = 100;

/// Returns true if the face is a hit.
pub fn is_hit(face: u32) -> bool {
    face >= HIT_FACE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_are_fives_and_sixes() {
        let hits: Vec<u32> = (1..=SIDES).filter(|&f| is_hit(f)).collect();
        assert_eq!(hits, vec![5, 6]);
    }

    #[test]
    fn pool_bounds() {
        assert!(MIN_POOL < MAX_POOL);
        assert!(EXPLOSION_CAP >= 100);
    }
}
