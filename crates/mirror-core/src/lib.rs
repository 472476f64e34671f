//! mirror-core — Detection state types and the pluggable pieces of a detection cycle.
//!
//! The recognition backend and video source are traits; matching and
//! emotion classification are strategies with default implementations.
//! None of the defaults perform real face recognition.

pub mod backend;
pub mod emotion;
pub mod fallback;
pub mod frame;
pub mod matcher;
pub mod simulated;
pub mod types;

pub use backend::{BackendError, RecognitionBackend, VideoSource};
pub use emotion::{ClassifyError, EmotionClassifier, ThresholdEmotionClassifier};
pub use fallback::FallbackPolicy;
pub use frame::Frame;
pub use matcher::{AverageBandMatcher, Identity, MatchError, MatchingStrategy, ReferenceMatcher};
pub use simulated::SimulatedBackend;
pub use types::{
    CycleFault, DetectedFace, DetectionCycleResult, Descriptor, EmotionState, Expressions,
    PersonState,
};

/// Default model directory: `$XDG_DATA_HOME/mirror/models` or `~/.local/share/mirror/models`.
pub fn default_model_dir() -> std::path::PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            std::path::PathBuf::from(home).join(".local/share")
        })
        .join("mirror/models")
}
