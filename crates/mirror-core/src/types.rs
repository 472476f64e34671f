use serde::{Deserialize, Serialize};
use std::fmt;

/// Who the mirror believes is standing in front of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonState {
    /// No cycle has produced a verdict yet (backend still loading).
    #[default]
    Unresolved,
    /// A verdict is being produced; used by presentation layers between cycles.
    Pending,
    RecognizedPrimary,
    RecognizedOther,
    NoFaceDetected,
}

impl PersonState {
    /// Status line shown by text front-ends for this state.
    pub fn caption(self) -> &'static str {
        match self {
            PersonState::Unresolved => "Awakening the Magic Mirror...",
            PersonState::Pending => "Seeking the fairest of them all...",
            PersonState::RecognizedPrimary => "You are the fairest of them all!",
            PersonState::RecognizedOther => "Nice try. The mirror is not impressed.",
            PersonState::NoFaceDetected => "Mirror, mirror on the wall... who will be the fairest of them all?",
        }
    }
}

impl fmt::Display for PersonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PersonState::Unresolved => "unresolved",
            PersonState::Pending => "pending",
            PersonState::RecognizedPrimary => "recognized_primary",
            PersonState::RecognizedOther => "recognized_other",
            PersonState::NoFaceDetected => "no_face_detected",
        };
        f.write_str(s)
    }
}

/// Mood of the primary person. Only meaningful alongside
/// [`PersonState::RecognizedPrimary`]; callers ignore it otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionState {
    Happy,
    Sad,
    #[default]
    Neutral,
}

impl EmotionState {
    pub const ALL: [EmotionState; 3] = [EmotionState::Happy, EmotionState::Sad, EmotionState::Neutral];
}

impl fmt::Display for EmotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EmotionState::Happy => "happy",
            EmotionState::Sad => "sad",
            EmotionState::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Why a cycle's result came from the fallback policy instead of the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CycleFault {
    /// Backend never became ready; every cycle is a fallback.
    Degraded,
    /// The backend call for this cycle failed.
    Backend(String),
    /// The matching strategy rejected the descriptor.
    Match(String),
    /// The emotion classifier rejected the expression vector.
    Emotion(String),
}

/// Output of one detection cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionCycleResult {
    pub person: PersonState,
    pub emotion: EmotionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<CycleFault>,
}

impl DetectionCycleResult {
    pub fn new(person: PersonState, emotion: EmotionState) -> Self {
        Self { person, emotion, fault: None }
    }

    /// The state before any backend output exists.
    pub fn awakening() -> Self {
        Self::new(PersonState::Unresolved, EmotionState::Neutral)
    }

    pub fn no_face() -> Self {
        Self::new(PersonState::NoFaceDetected, EmotionState::Neutral)
    }

    pub fn with_fault(mut self, fault: CycleFault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// The (person, emotion) pair without the fault indicator.
    pub fn pair(&self) -> (PersonState, EmotionState) {
        (self.person, self.emotion)
    }
}

/// Face feature vector produced by a recognition backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub values: Vec<f32>,
}

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Arithmetic mean of all components, `None` for an empty descriptor.
    pub fn mean(&self) -> Option<f32> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f32>() / self.values.len() as f32)
    }

    /// Compute cosine similarity between two descriptors.
    ///
    /// Returns a value in [-1, 1]. Higher = more similar.
    pub fn similarity(&self, other: &Descriptor) -> f32 {
        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;

        for (a, b) in self.values.iter().zip(other.values.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom > 0.0 { dot / denom } else { 0.0 }
    }
}

/// Per-expression confidences for one face, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Expressions {
    pub happy: f32,
    pub sad: f32,
    pub neutral: f32,
    #[serde(default)]
    pub angry: f32,
    #[serde(default)]
    pub fearful: f32,
    #[serde(default)]
    pub disgusted: f32,
    #[serde(default)]
    pub surprised: f32,
}

/// One face reported by a recognition backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub descriptor: Descriptor,
    /// Backends without an expression head leave this empty.
    pub expressions: Option<Expressions>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_explicit() {
        let r = DetectionCycleResult::default();
        assert_eq!(r.pair(), (PersonState::Unresolved, EmotionState::Neutral));
        assert!(r.fault.is_none());
        assert_eq!(r, DetectionCycleResult::awakening());
    }

    #[test]
    fn test_descriptor_mean() {
        let d = Descriptor::new(vec![0.1, 0.2, 0.3]);
        assert!((d.mean().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(Descriptor::new(vec![]).mean(), None);
    }

    #[test]
    fn test_similarity_identical() {
        let a = Descriptor::new(vec![1.0, 0.0, 0.0]);
        let b = Descriptor::new(vec![1.0, 0.0, 0.0]);
        assert!((a.similarity(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_opposite() {
        let a = Descriptor::new(vec![1.0, 0.0]);
        let b = Descriptor::new(vec![-1.0, 0.0]);
        assert!((a.similarity(&b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_zero_vector() {
        let a = Descriptor::new(vec![0.0, 0.0]);
        let b = Descriptor::new(vec![1.0, 0.0]);
        assert_eq!(a.similarity(&b), 0.0);
    }

    #[test]
    fn test_result_serializes_with_fault() {
        let r = DetectionCycleResult::new(PersonState::RecognizedOther, EmotionState::Sad)
            .with_fault(CycleFault::Backend("boom".into()));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["person"], "recognized_other");
        assert_eq!(json["emotion"], "sad");
        assert_eq!(json["fault"]["kind"], "backend");
        assert_eq!(json["fault"]["detail"], "boom");
    }

    #[test]
    fn test_result_without_fault_omits_field() {
        let json = serde_json::to_value(DetectionCycleResult::no_face()).unwrap();
        assert!(json.get("fault").is_none());
        assert_eq!(json["person"], "no_face_detected");
    }

    #[test]
    fn test_display_matches_serde_names() {
        for p in [
            PersonState::Unresolved,
            PersonState::Pending,
            PersonState::RecognizedPrimary,
            PersonState::RecognizedOther,
            PersonState::NoFaceDetected,
        ] {
            let json = serde_json::to_value(p).unwrap();
            assert_eq!(json, p.to_string());
        }
    }
}
