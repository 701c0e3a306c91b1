//! Sources of die faces.
//!
//! Rolling never reaches for a global RNG. Callers hand a [`DieSource`] to
//! every roll: [`RngDice`] wraps any `rand` generator for live play, and
//! [`ScriptedDice`] replays a fixed sequence of faces so tests can pin down
//! exact outcomes.

use rand::Rng;

use super::SIDES;
use crate::error::{MechError, MechResult};

/// Something that can produce d6 faces.
pub trait DieSource {
    /// Roll one six-sided die, returning a face in `1..=6`.
    fn roll_d6(&mut self) -> u32;
}

impl<D: DieSource + ?Sized> DieSource for &mut D {
    fn roll_d6(&mut self) -> u32 {
        (**self).roll_d6()
    }
}

impl<D: DieSource + ?Sized> DieSource for Box<D> {
    fn roll_d6(&mut self) -> u32 {
        (**self).roll_d6()
    }
}

/// A die source backed by a `rand` random number generator.
#[derive(Debug, Clone)]
pub struct RngDice<R>(pub R);

impl<R: Rng> RngDice<R> {
    /// Wrap a random number generator.
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: Rng> DieSource for RngDice<R> {
    fn roll_d6(&mut self) -> u32 {
        self.0.random_range(1..=SIDES)
    }
}

/// A die source that replays a fixed list of faces, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u32>,
    cursor: usize,
}

impl ScriptedDice {
    /// Create a scripted source. Every face must be in `1..=6`.
    pub fn new(faces: &[u32]) -> MechResult<Self> {
        if faces.is_empty() {
            return Err(MechError::EmptyScript);
        }
        if let Some(&bad) = faces.iter().find(|&&f| !(1..=SIDES).contains(&f)) {
            return Err(MechError::InvalidFace(bad));
        }
        Ok(Self {
            faces: faces.to_vec(),
            cursor: 0,
        })
    }

    /// How many faces have been handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl DieSource for ScriptedDice {
    fn roll_d6(&mut self) -> u32 {
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face
    }
}
