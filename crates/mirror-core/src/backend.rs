//! Seams to the outside world: the recognition backend and the video source.

use crate::frame::Frame;
use crate::types::DetectedFace;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("model files not found: {0}")]
    ModelNotFound(String),
    #[error("backend not loaded")]
    NotLoaded,
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

/// Face detection capability consumed by the detection loop.
///
/// Implementations are shared between cycles and must tolerate `&self`
/// access; the loop never issues two calls at once.
pub trait RecognitionBackend: Send + Sync + 'static {
    /// Prepare models and other resources. Called once per controller.
    fn load(&self) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Detect every face in `frame`, primary (most prominent) face first.
    fn detect_faces(
        &self,
        frame: &Frame,
    ) -> impl Future<Output = Result<Vec<DetectedFace>, BackendError>> + Send;
}

impl<B: RecognitionBackend> RecognitionBackend for Arc<B> {
    fn load(&self) -> impl Future<Output = Result<(), BackendError>> + Send {
        (**self).load()
    }

    fn detect_faces(
        &self,
        frame: &Frame,
    ) -> impl Future<Output = Result<Vec<DetectedFace>, BackendError>> + Send {
        (**self).detect_faces(frame)
    }
}

/// Anything that can hand out the current video frame.
///
/// The source is owned by the caller; the loop only samples it.
pub trait VideoSource: Send + Sync + 'static {
    /// The most recent frame, or `None` if nothing has been captured yet.
    fn current_frame(&self) -> Option<Frame>;

    /// Whether the source is attached to a live stream at all.
    fn is_available(&self) -> bool {
        true
    }
}

impl<V: VideoSource + ?Sized> VideoSource for Arc<V> {
    fn current_frame(&self) -> Option<Frame> {
        (**self).current_frame()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}
