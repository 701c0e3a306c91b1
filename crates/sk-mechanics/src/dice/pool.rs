//! Dice pool construction and rolling.

use tracing::trace;

use super::roll::PoolRoll;
use super::source::DieSource;
use super::{EXPLODE_FACE, EXPLOSION_CAP, MAX_POOL, MIN_POOL};
use crate::error::{MechError, MechResult};

/// A number of d6 to be rolled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DicePool {
    size: u32,
    explode: bool,
}

impl DicePool {
    /// Create a pool of `size` dice, clamped to `1..=50`. Sixes do not explode.
    pub fn new(size: u32) -> Self {
        Self {
            size: size.clamp(MIN_POOL, MAX_POOL),
            explode: false,
        }
    }

    /// Create a pool, rejecting sizes outside `1..=50` instead of clamping.
    pub fn checked(size: u32) -> MechResult<Self> {
        if (MIN_POOL..=MAX_POOL).contains(&size) {
            Ok(Self::new(size))
        } else {
            Err(MechError::PoolSize(size))
        }
    }

    /// Set whether sixes explode into additional dice.
    pub fn exploding(mut self, explode: bool) -> Self {
        self.explode = explode;
        self
    }

    /// Number of dice in the pool before any explosions.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Whether sixes explode.
    pub fn explodes(&self) -> bool {
        self.explode
    }

    /// Roll the pool.
    ///
    /// When the pool explodes, every six (including sixes produced by earlier
    /// explosions) adds one more die. Explosions are rolled generation by
    /// generation and stop after [`EXPLOSION_CAP`] generations regardless of
    /// what the source keeps producing.
    pub fn roll<D: DieSource + ?Sized>(&self, dice: &mut D) -> PoolRoll {
        let raw_results: Vec<u32> = (0..self.size).map(|_| dice.roll_d6()).collect();
        let mut all_results = raw_results.clone();

        if self.explode {
            let mut pending = count_sixes(&raw_results);
            let mut generations = 0;
            while pending > 0 && generations < EXPLOSION_CAP {
                let batch: Vec<u32> = (0..pending).map(|_| dice.roll_d6()).collect();
                pending = count_sixes(&batch);
                all_results.extend(batch);
                generations += 1;
            }
            if generations > 0 {
                trace!(
                    generations,
                    extra = all_results.len() - raw_results.len(),
                    "pool exploded"
                );
            }
        }

        PoolRoll::from_faces(raw_results, all_results)
    }
}

/// Roll a pool of `size` dice (clamped to `1..=50`), optionally exploding sixes.
pub fn roll_pool<D: DieSource + ?Sized>(size: u32, explode_on_six: bool, dice: &mut D) -> PoolRoll {
    DicePool::new(size).exploding(explode_on_six).roll(dice)
}

fn count_sixes(faces: &[u32]) -> usize {
    faces.iter().filter(|&&f| f == EXPLODE_FACE).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{RngDice, ScriptedDice};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn size_is_clamped() {
        assert_eq!(DicePool::new(0).size(), 1);
        assert_eq!(DicePool::new(12).size(), 12);
        assert_eq!(DicePool::new(500).size(), 50);
    }

    #[test]
    fn checked_rejects_out_of_range() {
        assert_eq!(DicePool::checked(0), Err(MechError::PoolSize(0)));
        assert_eq!(DicePool::checked(51), Err(MechError::PoolSize(51)));
        assert_eq!(DicePool::checked(50).map(|p| p.size()), Ok(50));
    }

    #[test]
    fn plain_pool_ignores_sixes() {
        let mut dice = ScriptedDice::new(&[6, 6, 2]).unwrap();
        let roll = DicePool::new(3).roll(&mut dice);
        assert_eq!(roll.all_results, vec![6, 6, 2]);
        assert_eq!(roll.hits, 2);
        assert_eq!(dice.consumed(), 3);
    }

    #[test]
    fn sixes_explode_recursively() {
        // Originals 6, 3; the explosion is a 6 which explodes again into a 2.
        let mut dice = ScriptedDice::new(&[6, 3, 6, 2]).unwrap();
        let roll = DicePool::new(2).exploding(true).roll(&mut dice);
        assert_eq!(roll.raw_results, vec![6, 3]);
        assert_eq!(roll.all_results, vec![6, 3, 6, 2]);
        assert_eq!(roll.hits, 2);
    }

    #[test]
    fn explosions_stop_at_cap() {
        let mut dice = ScriptedDice::new(&[6]).unwrap();
        let roll = DicePool::new(1).exploding(true).roll(&mut dice);
        assert_eq!(roll.all_results.len(), 1 + EXPLOSION_CAP as usize);
    }

    #[test]
    fn glitch_counts_only_original_dice() {
        // Originals 1, 1, 6, 4: two ones out of four is not a glitch, and the
        // exploded ones must not tip it over.
        let mut dice = ScriptedDice::new(&[1, 1, 6, 4, 1]).unwrap();
        let roll = DicePool::new(4).exploding(true).roll(&mut dice);
        assert_eq!(roll.ones_count, 2);
        assert!(!roll.is_glitch);
    }

    #[test]
    fn critical_glitch() {
        let mut dice = ScriptedDice::new(&[1, 1, 3]).unwrap();
        let roll = roll_pool(3, false, &mut dice);
        assert!(roll.is_glitch);
        assert!(roll.is_critical_glitch);
    }

    #[test]
    fn glitch_with_hits_is_not_critical() {
        let mut dice = ScriptedDice::new(&[1, 1, 5]).unwrap();
        let roll = roll_pool(3, false, &mut dice);
        assert!(roll.is_glitch);
        assert!(!roll.is_critical_glitch);
    }

    proptest! {
        #[test]
        fn plain_pool_rolls_exact_count(size in 1u32..=50, seed in any::<u64>()) {
            let mut dice = RngDice::new(StdRng::seed_from_u64(seed));
            let roll = roll_pool(size, false, &mut dice);
            prop_assert_eq!(roll.all_results.len(), size as usize);
            prop_assert!(roll.all_results.iter().all(|f| (1..=6).contains(f)));
        }

        #[test]
        fn exploding_pool_grows_only_on_sixes(size in 1u32..=50, seed in any::<u64>()) {
            let mut dice = RngDice::new(StdRng::seed_from_u64(seed));
            let roll = roll_pool(size, true, &mut dice);
            prop_assert!(roll.all_results.len() >= size as usize);
            let had_six = roll.raw_results.contains(&6);
            prop_assert_eq!(roll.all_results.len() == size as usize, !had_six);
        }

        #[test]
        fn glitch_matches_original_ones(size in 1u32..=50, seed in any::<u64>(), explode in any::<bool>()) {
            let mut dice = RngDice::new(StdRng::seed_from_u64(seed));
            let roll = roll_pool(size, explode, &mut dice);
            let ones = roll.raw_results.iter().filter(|&&f| f == 1).count() as u32;
            prop_assert_eq!(roll.ones_count, ones);
            prop_assert_eq!(roll.is_glitch, ones * 2 > size);
            if roll.is_critical_glitch {
                prop_assert!(roll.is_glitch);
                prop_assert_eq!(roll.hits, 0);
            }
        }
    }
}
