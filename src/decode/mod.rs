//! Per-frame QR decoding.
//!
//! A decoder inspects one frame and either yields the raw payload string
//! of a visible QR code or nothing. "No code in this frame" is the
//! expected steady state of a scanning session, so the interface has no
//! error channel; a frame with no decodable code simply returns `None`.

mod mock;
mod qr;

pub use mock::MockDecoder;
pub use qr::QrDecoder;

use crate::capture::Frame;

/// Trait for frame decoders.
///
/// Implementations must be side-effect free with respect to the frame:
/// decoding never consumes or mutates pixel data.
pub trait Decoder {
    /// Attempts to decode a QR payload from the frame.
    ///
    /// Returns `None` when no code is visible or the symbol is
    /// unreadable; both are retried on the next sampled frame.
    fn decode(&mut self, frame: &Frame) -> Option<String>;
}
