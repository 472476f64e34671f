//! Pixel-statistics stand-in for a real recognition backend.
//!
//! Nothing here recognizes faces. A frame counts as "a face" when it is not
//! dark, the descriptor is a block average of the pixels, and expressions
//! come from how much of the frame is very bright or fairly dark. Useful for
//! demos and for exercising the detection loop without model files.

use crate::backend::{BackendError, RecognitionBackend};
use crate::frame::{self, Frame};
use crate::types::{DetectedFace, Descriptor, Expressions};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

const DESCRIPTOR_DIM: usize = 128;
const DARK_FRAME_THRESHOLD: f32 = 0.95;
const BRIGHT_LEVEL: u8 = 192;
const DIM_LEVEL: u8 = 64;

pub struct SimulatedBackend {
    model_dir: PathBuf,
    loaded: AtomicBool,
}

impl SimulatedBackend {
    /// `load()` succeeds only if `model_dir` exists, mirroring a backend
    /// whose weights live on disk.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            loaded: AtomicBool::new(false),
        }
    }

    fn describe(frame: &Frame) -> Descriptor {
        let chunk = frame.data.len().div_ceil(DESCRIPTOR_DIM).max(1);
        let mut values: Vec<f32> = frame
            .data
            .chunks(chunk)
            .map(|c| c.iter().map(|&p| p as f32).sum::<f32>() / (c.len() as f32 * 255.0))
            .collect();
        // Tiny frames produce fewer chunks; pad with the frame mean.
        let fill = frame.avg_brightness() / 255.0;
        values.resize(DESCRIPTOR_DIM, fill);
        Descriptor::new(values)
    }

    fn expressions(frame: &Frame) -> Expressions {
        let happy = frame.fraction_above(BRIGHT_LEVEL);
        let sad = frame.fraction_below(DIM_LEVEL);
        Expressions {
            happy,
            sad,
            neutral: (1.0 - happy - sad).clamp(0.0, 1.0),
            ..Default::default()
        }
    }
}

impl RecognitionBackend for SimulatedBackend {
    async fn load(&self) -> Result<(), BackendError> {
        if !self.model_dir.is_dir() {
            return Err(BackendError::ModelNotFound(
                self.model_dir.display().to_string(),
            ));
        }
        self.loaded.store(true, Ordering::Release);
        tracing::info!(path = %self.model_dir.display(), "simulated backend loaded");
        Ok(())
    }

    async fn detect_faces(&self, frame: &Frame) -> Result<Vec<DetectedFace>, BackendError> {
        if !self.loaded.load(Ordering::Acquire) {
            return Err(BackendError::NotLoaded);
        }
        if frame.data.is_empty() {
            return Err(BackendError::InferenceFailed(format!(
                "frame {} has no pixel data",
                frame.sequence
            )));
        }
        if frame::is_dark_frame(&frame.data, DARK_FRAME_THRESHOLD) {
            return Ok(Vec::new());
        }

        Ok(vec![DetectedFace {
            descriptor: Self::describe(frame),
            expressions: Some(Self::expressions(frame)),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn loaded_backend() -> SimulatedBackend {
        let backend = SimulatedBackend::new(std::env::temp_dir());
        backend.load().await.unwrap();
        backend
    }

    #[tokio::test]
    async fn test_load_missing_dir_fails() {
        let backend = SimulatedBackend::new("/nonexistent/mirror/models");
        assert!(matches!(backend.load().await, Err(BackendError::ModelNotFound(_))));
    }

    #[tokio::test]
    async fn test_detect_before_load_fails() {
        let backend = SimulatedBackend::new(std::env::temp_dir());
        let frame = Frame::uniform(8, 8, 128, 0);
        assert_eq!(backend.detect_faces(&frame).await, Err(BackendError::NotLoaded));
    }

    #[tokio::test]
    async fn test_dark_frame_has_no_face() {
        let backend = loaded_backend().await;
        let frame = Frame::uniform(16, 16, 5, 0);
        assert!(backend.detect_faces(&frame).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_uniform_frame_descriptor_mean_tracks_brightness() {
        let backend = loaded_backend().await;
        // 51 / 255 = 0.2
        let frame = Frame::uniform(32, 32, 51, 0);
        let faces = backend.detect_faces(&frame).await.unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].descriptor.values.len(), DESCRIPTOR_DIM);
        assert!((faces[0].descriptor.mean().unwrap() - 0.2).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_bright_frame_reads_happy() {
        let backend = loaded_backend().await;
        let frame = Frame::uniform(8, 8, 230, 0);
        let faces = backend.detect_faces(&frame).await.unwrap();
        let e = faces[0].expressions.unwrap();
        assert_eq!(e.happy, 1.0);
        assert_eq!(e.sad, 0.0);
        assert_eq!(e.neutral, 0.0);
    }

    #[tokio::test]
    async fn test_empty_frame_is_an_error() {
        let backend = loaded_backend().await;
        let frame = Frame::new(Vec::new(), 0, 0, 3);
        assert!(matches!(
            backend.detect_faces(&frame).await,
            Err(BackendError::InferenceFailed(_))
        ));
    }
}
