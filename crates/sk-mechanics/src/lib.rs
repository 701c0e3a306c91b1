//! Dice pool mechanics for the Skirmish combat engine.
//!
//! Pools of six-sided dice where every 5 or 6 is a hit, sixes may explode
//! into extra dice, and a pool glitches when more than half of its original
//! dice come up 1. On top of raw rolls this crate provides threshold checks,
//! opposed tests, and hit-quality classification. Nothing here holds state:
//! randomness always comes from a caller-supplied [`DieSource`].

pub mod dice;
pub mod error;
pub mod resolution;

pub use dice::{DicePool, DieSource, PoolRoll, RngDice, ScriptedDice, roll_pool};
pub use error::{MechError, MechResult};
pub use resolution::{HitQuality, OpposedResult, Winner, check_success, opposed_test};
