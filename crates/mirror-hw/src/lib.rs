//! mirror-hw — Video sources for the detection loop.
//!
//! Live camera capture belongs to the host application; these sources
//! cover still images and synthetic frames for demos and tests.

pub mod pattern;
pub mod still;

pub use pattern::PatternSource;
pub use still::{SourceError, StillImageSource};
