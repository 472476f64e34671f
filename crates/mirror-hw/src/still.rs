//! Still image served as a repeating video frame.

use mirror_core::{Frame, VideoSource};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Grayscale copy of an image file, returned on every sample with a fresh
/// sequence number.
pub struct StillImageSource {
    gray: Vec<u8>,
    width: u32,
    height: u32,
    sequence: AtomicU64,
}

impl StillImageSource {
    /// Decode the image at `path` and convert it to 8-bit luma.
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }

        let img = image::open(path).map_err(|e| SourceError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let luma = img.to_luma8();
        let (width, height) = luma.dimensions();
        tracing::info!(path = %path.display(), width, height, "still image source opened");

        Ok(Self::from_gray(luma.into_raw(), width, height))
    }

    /// Wrap raw grayscale pixels (width * height bytes).
    pub fn from_gray(gray: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            gray,
            width,
            height,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl VideoSource for StillImageSource {
    fn current_frame(&self) -> Option<Frame> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        Some(Frame::new(self.gray.clone(), self.width, self.height, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = StillImageSource::open(Path::new("/nonexistent/mirror.png"));
        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_open_png_converts_to_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        let img = image::RgbImage::from_pixel(6, 4, image::Rgb([200, 200, 200]));
        img.save(&path).unwrap();

        let source = StillImageSource::open(&path).unwrap();
        assert_eq!(source.dimensions(), (6, 4));
        let frame = source.current_frame().unwrap();
        assert_eq!(frame.data.len(), 24);
        assert!(frame.data.iter().all(|&p| p == 200));
    }

    #[test]
    fn test_open_garbage_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            StillImageSource::open(&path),
            Err(SourceError::Decode { .. })
        ));
    }

    #[test]
    fn test_sequence_increments() {
        let source = StillImageSource::from_gray(vec![0; 4], 2, 2);
        assert_eq!(source.current_frame().unwrap().sequence, 0);
        assert_eq!(source.current_frame().unwrap().sequence, 1);
    }
}
