//! Emotion classification from per-face expression confidences.

use crate::types::{EmotionState, Expressions};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("backend reported no expressions for the face")]
    MissingExpressions,
    #[error("expression confidence is not a finite number")]
    NonFinite,
}

/// Strategy for reducing an expression vector to an [`EmotionState`].
pub trait EmotionClassifier: Send + Sync {
    fn classify(&self, expressions: Option<&Expressions>) -> Result<EmotionState, ClassifyError>;
}

/// Fixed-threshold classifier.
///
/// Happy when `happy > threshold`, else Sad when `sad > threshold`, else
/// Neutral. Happy is checked first, so when both exceed the threshold the
/// result is Happy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEmotionClassifier {
    pub threshold: f32,
}

impl ThresholdEmotionClassifier {
    pub const DEFAULT_THRESHOLD: f32 = 0.6;

    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdEmotionClassifier {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl EmotionClassifier for ThresholdEmotionClassifier {
    fn classify(&self, expressions: Option<&Expressions>) -> Result<EmotionState, ClassifyError> {
        let e = expressions.ok_or(ClassifyError::MissingExpressions)?;
        if !e.happy.is_finite() || !e.sad.is_finite() {
            return Err(ClassifyError::NonFinite);
        }

        if e.happy > self.threshold {
            Ok(EmotionState::Happy)
        } else if e.sad > self.threshold {
            Ok(EmotionState::Sad)
        } else {
            Ok(EmotionState::Neutral)
        }
    }
}
