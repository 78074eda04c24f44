//! Real QR decoder backed by the `rqrr` crate.

use super::Decoder;
use crate::capture::Frame;

/// Decodes QR codes from grayscale frames.
///
/// Stateless; one instance can serve any number of sessions.
#[derive(Debug, Default)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for QrDecoder {
    fn decode(&mut self, frame: &Frame) -> Option<String> {
        if !frame.is_valid() {
            tracing::warn!(
                sequence = frame.sequence(),
                "Skipping frame with inconsistent buffer size"
            );
            return None;
        }

        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| frame.luma(x, y));

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, content)) => {
                    tracing::debug!(
                        sequence = frame.sequence(),
                        len = content.len(),
                        "Decoded QR payload"
                    );
                    return Some(content);
                }
                Err(e) => {
                    // Partially visible or damaged symbol; next frame may be better
                    tracing::trace!(sequence = frame.sequence(), error = %e, "Grid decode miss");
                }
            }
        }
        None
    }
}
