//! mirror-engine — The detection loop controller.
//!
//! Wraps a [`RecognitionBackend`](mirror_core::RecognitionBackend) in an
//! initialize / run-one-cycle / start contract that always produces a
//! state, never an error, once running.

pub mod config;
pub mod controller;

pub use config::{ConfigError, ControllerConfig};
pub use controller::{ControllerError, DetectionController, LoopHandle, Readiness};
