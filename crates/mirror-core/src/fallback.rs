//! Fallback outcomes used when the backend, matcher or classifier cannot answer.

use crate::types::{EmotionState, PersonState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Pseudo-random stand-in verdicts that keep the mirror responsive.
///
/// The outcomes say nothing about who is actually present.
#[derive(Debug)]
pub struct FallbackPolicy {
    primary_probability: f64,
    rng: Mutex<StdRng>,
}

impl FallbackPolicy {
    pub const DEFAULT_PRIMARY_PROBABILITY: f64 = 0.3;

    /// `primary_probability` is clamped to [0, 1]. A `seed` makes the
    /// sequence of outcomes reproducible.
    pub fn new(primary_probability: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            primary_probability: primary_probability.clamp(0.0, 1.0),
            rng: Mutex::new(rng),
        }
    }

    pub fn primary_probability(&self) -> f64 {
        self.primary_probability
    }

    /// RecognizedPrimary with `primary_probability`, RecognizedOther otherwise.
    pub fn person(&self) -> PersonState {
        let roll: f64 = self.with_rng(|rng| rng.gen());
        if roll < self.primary_probability {
            PersonState::RecognizedPrimary
        } else {
            PersonState::RecognizedOther
        }
    }

    /// Uniform choice among Happy, Sad and Neutral.
    pub fn emotion(&self) -> EmotionState {
        let idx = self.with_rng(|rng| rng.gen_range(0..EmotionState::ALL.len()));
        EmotionState::ALL[idx]
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // Generator state survives a poisoned lock.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PRIMARY_PROBABILITY, None)
    }
}
