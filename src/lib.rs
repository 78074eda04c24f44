//! Payscan: camera QR scan-and-classify pipeline.
//!
//! Acquires a camera stream, samples frames cooperatively, decodes any
//! visible QR code, classifies its payload (ethereum address, bitcoin
//! address, URL, or plain text), and delivers exactly one result per
//! session to the caller.
//!
//! # Architecture
//!
//! The pipeline follows an explicit data flow:
//!
//! ```text
//! capture → decode → classify → deliver
//!     ↓
//! pipeline (session state machine, notices)
//! ```
//!
//! # Design Principles
//!
//! - **One stream at a time**: starting a session always releases any
//!   previous device stream first; flipping cameras never overlaps
//!   acquisitions.
//! - **Cooperative sampling**: the host drives the loop one
//!   [`pipeline::ScanPipeline::tick`] per display frame; stopping
//!   invalidates the session so no late tick does work.
//! - **Nothing is fatal**: permission denial, device loss, and
//!   classification failures surface as transient notices and return
//!   the pipeline to Idle for a retry.
//! - **Injected capabilities**: camera, decoder, and classifier are
//!   trait objects chosen by the caller, so everything mocks cleanly.
//!
//! # Example
//!
//! ```
//! use payscan::{
//!     capture::{CaptureConfig, FacingMode, MockCamera},
//!     decode::MockDecoder,
//!     pipeline::{ScanPipeline, TickOutcome},
//! };
//!
//! let camera = MockCamera::new();
//! let decoder = MockDecoder::after_misses(2, "0x742d35Cc6634C0532925a3b844Bc454e4438f44e");
//! let mut pipeline = ScanPipeline::new(camera, decoder, CaptureConfig::default());
//!
//! pipeline.start(FacingMode::Environment).unwrap();
//! loop {
//!     match pipeline.tick() {
//!         TickOutcome::Delivered(result) => {
//!             println!("{}: {}", result.kind, result.address);
//!             break;
//!         }
//!         TickOutcome::NoCode => continue,
//!         TickOutcome::Idle => break,
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod classify;
pub mod decode;
pub mod metrics;
pub mod pipeline;
#[cfg(feature = "service")]
pub mod service;

// Re-export commonly used types at crate root
pub use capture::{Camera, CaptureConfig, FacingMode, Frame, MockCamera};
pub use classify::{classify, Classify, LocalClassifier, PayloadKind, ScanResult};
pub use decode::{Decoder, MockDecoder, QrDecoder};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use pipeline::{ScanError, ScanPipeline, ScannerState, TickOutcome, TorchStatus};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
