//! Matching strategies: decide whether a descriptor belongs to the primary person.

use crate::types::{Descriptor, PersonState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("descriptor is empty")]
    EmptyDescriptor,
    #[error("descriptor has {actual} values, reference has {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("descriptor contains non-finite values")]
    NonFinite,
}

/// Verdict of a [`MatchingStrategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Primary,
    Other,
}

impl From<Identity> for PersonState {
    fn from(identity: Identity) -> Self {
        match identity {
            Identity::Primary => PersonState::RecognizedPrimary,
            Identity::Other => PersonState::RecognizedOther,
        }
    }
}

/// Strategy for classifying a probe descriptor as the primary person or someone else.
pub trait MatchingStrategy: Send + Sync {
    fn identify(&self, probe: &Descriptor) -> Result<Identity, MatchError>;
}

fn check_finite(probe: &Descriptor) -> Result<(), MatchError> {
    if probe.values.is_empty() {
        return Err(MatchError::EmptyDescriptor);
    }
    if probe.values.iter().any(|v| !v.is_finite()) {
        return Err(MatchError::NonFinite);
    }
    Ok(())
}

/// Placeholder matcher: primary when the descriptor's mean lies strictly
/// inside `(low, high)`.
///
/// This has no discriminative power and cannot identify anyone. It exists
/// so the loop has deterministic behavior in demos and tests; plug in
/// [`ReferenceMatcher`] or a real model for actual recognition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageBandMatcher {
    pub low: f32,
    pub high: f32,
}

impl AverageBandMatcher {
    pub const DEFAULT_LOW: f32 = 0.1;
    pub const DEFAULT_HIGH: f32 = 0.3;

    pub fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }
}

impl Default for AverageBandMatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LOW, Self::DEFAULT_HIGH)
    }
}

impl MatchingStrategy for AverageBandMatcher {
    fn identify(&self, probe: &Descriptor) -> Result<Identity, MatchError> {
        check_finite(probe)?;
        let avg = probe.mean().ok_or(MatchError::EmptyDescriptor)?;
        if avg > self.low && avg < self.high {
            Ok(Identity::Primary)
        } else {
            Ok(Identity::Other)
        }
    }
}

/// Cosine similarity matcher against enrolled descriptors of the primary person.
///
/// Always iterates ALL references and keeps the best similarity; the probe
/// is primary when that best similarity reaches `threshold`.
#[derive(Debug, Clone)]
pub struct ReferenceMatcher {
    references: Vec<Descriptor>,
    threshold: f32,
}

impl ReferenceMatcher {
    pub fn new(references: Vec<Descriptor>, threshold: f32) -> Self {
        Self { references, threshold }
    }

    /// Best cosine similarity of `probe` against the enrolled references,
    /// `None` when nothing is enrolled.
    pub fn best_similarity(&self, probe: &Descriptor) -> Result<Option<f32>, MatchError> {
        check_finite(probe)?;

        let mut best_sim = f32::NEG_INFINITY;
        let mut any = false;
        for reference in &self.references {
            if reference.values.len() != probe.values.len() {
                return Err(MatchError::DimensionMismatch {
                    expected: reference.values.len(),
                    actual: probe.values.len(),
                });
            }
            let sim = probe.similarity(reference);
            if sim > best_sim {
                best_sim = sim;
            }
            any = true;
        }

        Ok(any.then_some(best_sim))
    }
}

impl MatchingStrategy for ReferenceMatcher {
    fn identify(&self, probe: &Descriptor) -> Result<Identity, MatchError> {
        match self.best_similarity(probe)? {
            Some(sim) if sim >= self.threshold => Ok(Identity::Primary),
            _ => Ok(Identity::Other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(value: f32, len: usize) -> Descriptor {
        Descriptor::new(vec![value; len])
    }

    #[test]
    fn test_band_inside_is_primary() {
        let m = AverageBandMatcher::default();
        assert_eq!(m.identify(&flat(0.2, 128)).unwrap(), Identity::Primary);
    }

    #[test]
    fn test_band_edges_are_exclusive() {
        let m = AverageBandMatcher::new(0.25, 0.75);
        assert_eq!(m.identify(&flat(0.25, 4)).unwrap(), Identity::Other);
        assert_eq!(m.identify(&flat(0.75, 4)).unwrap(), Identity::Other);
        assert_eq!(m.identify(&flat(0.5, 4)).unwrap(), Identity::Primary);
    }

    #[test]
    fn test_band_outside_is_other() {
        let m = AverageBandMatcher::default();
        assert_eq!(m.identify(&flat(0.5, 16)).unwrap(), Identity::Other);
        assert_eq!(m.identify(&flat(-0.2, 16)).unwrap(), Identity::Other);
    }

    #[test]
    fn test_band_rejects_empty_and_nan() {
        let m = AverageBandMatcher::default();
        assert_eq!(m.identify(&Descriptor::new(vec![])), Err(MatchError::EmptyDescriptor));
        assert_eq!(
            m.identify(&Descriptor::new(vec![0.2, f32::NAN])),
            Err(MatchError::NonFinite)
        );
    }

    #[test]
    fn test_reference_matcher_scans_all_references() {
        // Best match is the last reference
        let m = ReferenceMatcher::new(
            vec![
                Descriptor::new(vec![0.0, 1.0, 0.0]),
                Descriptor::new(vec![0.0, 0.0, 1.0]),
                Descriptor::new(vec![1.0, 0.0, 0.0]),
            ],
            0.5,
        );
        let probe = Descriptor::new(vec![1.0, 0.0, 0.0]);
        let sim = m.best_similarity(&probe).unwrap().unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
        assert_eq!(m.identify(&probe).unwrap(), Identity::Primary);
    }

    #[test]
    fn test_reference_matcher_below_threshold() {
        let m = ReferenceMatcher::new(vec![Descriptor::new(vec![0.0, 1.0])], 0.5);
        assert_eq!(m.identify(&Descriptor::new(vec![1.0, 0.0])).unwrap(), Identity::Other);
    }

    #[test]
    fn test_reference_matcher_empty_gallery() {
        let m = ReferenceMatcher::new(vec![], 0.5);
        let probe = Descriptor::new(vec![1.0, 0.0]);
        assert_eq!(m.best_similarity(&probe).unwrap(), None);
        assert_eq!(m.identify(&probe).unwrap(), Identity::Other);
    }

    #[test]
    fn test_reference_matcher_dimension_mismatch() {
        let m = ReferenceMatcher::new(vec![Descriptor::new(vec![1.0, 0.0, 0.0])], 0.5);
        assert_eq!(
            m.identify(&Descriptor::new(vec![1.0, 0.0])),
            Err(MatchError::DimensionMismatch { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_identity_maps_to_person_state() {
        assert_eq!(PersonState::from(Identity::Primary), PersonState::RecognizedPrimary);
        assert_eq!(PersonState::from(Identity::Other), PersonState::RecognizedOther);
    }
}
