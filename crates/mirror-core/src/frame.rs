//! Frame type and the cheap pixel statistics used by the simulated backend.

/// A grayscale video frame sampled from a [`VideoSource`](crate::VideoSource).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonic counter assigned by the source.
    pub sequence: u64,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self { data, width, height, sequence }
    }

    /// A frame where every pixel has the same value.
    pub fn uniform(width: u32, height: u32, value: u8, sequence: u64) -> Self {
        Self::new(vec![value; (width * height) as usize], width, height, sequence)
    }

    /// Average pixel brightness (0.0–255.0).
    pub fn avg_brightness(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&b| b as f32).sum::<f32>() / self.data.len() as f32
    }

    /// Fraction of pixels strictly below `level`.
    pub fn fraction_below(&self, level: u8) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().filter(|&&p| p < level).count() as f32 / self.data.len() as f32
    }

    /// Fraction of pixels strictly above `level`.
    pub fn fraction_above(&self, level: u8) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().filter(|&&p| p > level).count() as f32 / self.data.len() as f32
    }
}

/// Check if a frame is dark.
///
/// Returns true if more than `threshold_pct` of pixels fall in the darkest bucket (0–31).
pub fn is_dark_frame(gray: &[u8], threshold_pct: f32) -> bool {
    if gray.is_empty() {
        return true;
    }
    let dark_count = gray.iter().filter(|&&p| p < 32).count();
    (dark_count as f32 / gray.len() as f32) > threshold_pct
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_frame_all_black() {
        let gray = vec![0u8; 1000];
        assert!(is_dark_frame(&gray, 0.95));
    }

    #[test]
    fn test_dark_frame_normal() {
        let gray = vec![128u8; 1000];
        assert!(!is_dark_frame(&gray, 0.95));
    }

    #[test]
    fn test_dark_frame_empty() {
        assert!(is_dark_frame(&[], 0.95));
    }

    #[test]
    fn test_dark_frame_borderline_bright() {
        // 94% dark, 6% bright → should NOT be dark
        let mut gray = vec![10u8; 940];
        gray.extend(vec![128u8; 60]);
        assert!(!is_dark_frame(&gray, 0.95));
    }

    #[test]
    fn test_brightness_and_fractions() {
        let mut data = vec![0u8; 50];
        data.extend(vec![200u8; 50]);
        let frame = Frame::new(data, 10, 10, 0);
        assert!((frame.avg_brightness() - 100.0).abs() < 1e-3);
        assert!((frame.fraction_below(64) - 0.5).abs() < 1e-6);
        assert!((frame.fraction_above(192) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_frame_size() {
        let frame = Frame::uniform(4, 3, 7, 9);
        assert_eq!(frame.data.len(), 12);
        assert_eq!(frame.sequence, 9);
        assert_eq!(frame.avg_brightness(), 7.0);
    }
}
