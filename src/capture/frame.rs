//! Luminance frame sampled from a capture session.

/// A single sampled frame.
///
/// Pixels are 8-bit luminance in row-major order; color input is
/// converted at the camera boundary since QR detection only needs
/// luminance. The sequence number identifies the frame within its
/// session, which is what decode logging keys on.
#[derive(Clone)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    sequence: u64,
}

impl Frame {
    /// Creates a frame from a raw luminance buffer.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            sequence,
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the luminance value at (x, y).
    ///
    /// Callers must stay within bounds; the decoder walks the grid the
    /// frame advertises via `width`/`height` after an `is_valid` check.
    #[inline]
    pub fn luma(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width as usize + x]
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the sequence number within the session.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let pixels = vec![0u8; 1280 * 720];
        let frame = Frame::new(pixels, 1280, 720, 1);

        assert_eq!(frame.width(), 1280);
        assert_eq!(frame.height(), 720);
        assert_eq!(frame.sequence(), 1);
        assert!(frame.is_valid());
    }

    #[test]
    fn test_frame_invalid_size() {
        let pixels = vec![0u8; 100]; // Wrong size
        let frame = Frame::new(pixels, 1280, 720, 1);

        assert!(!frame.is_valid());
    }

    #[test]
    fn test_luma_addresses_row_major() {
        // 3x2 frame with distinct values
        let pixels = vec![10, 20, 30, 40, 50, 60];
        let frame = Frame::new(pixels, 3, 2, 1);

        assert_eq!(frame.luma(0, 0), 10);
        assert_eq!(frame.luma(2, 0), 30);
        assert_eq!(frame.luma(0, 1), 40);
        assert_eq!(frame.luma(2, 1), 60);
    }

    #[test]
    fn test_pixel_count_survives_huge_dimensions() {
        // Product exceeds u32; the count must widen, not wrap
        let frame = Frame::new(Vec::new(), 80_000, 80_000, 1);
        assert_eq!(frame.pixel_count(), 6_400_000_000);
        assert!(!frame.is_valid());
    }
}
