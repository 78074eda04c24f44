//! QR payload classification.
//!
//! Maps a decoded payload string to a semantic kind by pattern
//! matching. Classification is pure and total: no I/O, no device
//! access, and every string maps to some kind (plain text is the
//! catch-all).
//!
//! Match order is fixed: ethereum address, then bitcoin address
//! (base58 P2PKH/P2SH or bech32), then URL, then text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic kind of a scanned payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    /// Hex-encoded ethereum account address.
    Ethereum,
    /// Bitcoin address, legacy base58 or bech32.
    Bitcoin,
    /// http/https URL.
    Url,
    /// Anything else.
    Text,
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadKind::Ethereum => write!(f, "ethereum"),
            PayloadKind::Bitcoin => write!(f, "bitcoin"),
            PayloadKind::Url => write!(f, "url"),
            PayloadKind::Text => write!(f, "text"),
        }
    }
}

/// A classified scan, the unit handed to the result callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Raw payload string as decoded from the code.
    pub address: String,
    /// Classified kind, serialized as `type` on the wire.
    #[serde(rename = "type")]
    pub kind: PayloadKind,
}

impl ScanResult {
    pub fn new(address: impl Into<String>, kind: PayloadKind) -> Self {
        Self {
            address: address.into(),
            kind,
        }
    }
}

/// Classifies a payload string.
///
/// Never fails and never panics; unrecognized content is `Text`.
pub fn classify(payload: &str) -> PayloadKind {
    if is_ethereum_address(payload) {
        PayloadKind::Ethereum
    } else if is_bitcoin_base58(payload) || is_bitcoin_bech32(payload) {
        PayloadKind::Bitcoin
    } else if is_url(payload) {
        PayloadKind::Url
    } else {
        PayloadKind::Text
    }
}

/// `^0x[0-9a-fA-F]{40}$`
fn is_ethereum_address(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 42
        && bytes[0] == b'0'
        && bytes[1] == b'x'
        && bytes[2..].iter().all(|b| b.is_ascii_hexdigit())
}

/// `^[13][1-9A-HJ-NP-Za-km-z]{25,34}$` (base58 alphabet, no 0/O/I/l)
fn is_bitcoin_base58(s: &str) -> bool {
    let bytes = s.as_bytes();
    if !(26..=35).contains(&bytes.len()) {
        return false;
    }
    if bytes[0] != b'1' && bytes[0] != b'3' {
        return false;
    }
    bytes[1..].iter().all(|&b| is_base58_char(b))
}

fn is_base58_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() && !matches!(b, b'0' | b'O' | b'I' | b'l')
}

/// `^bc1[ac-hj-np-z02-9]{39,59}$` (bech32 charset plus the bc1 prefix)
fn is_bitcoin_bech32(s: &str) -> bool {
    let Some(rest) = s.strip_prefix("bc1") else {
        return false;
    };
    let bytes = rest.as_bytes();
    (39..=59).contains(&bytes.len()) && bytes.iter().all(|&b| is_bech32_char(b))
}

fn is_bech32_char(b: u8) -> bool {
    match b {
        b'a' | b'c'..=b'h' | b'j' | b'k' | b'm' | b'n' | b'p'..=b'z' => true,
        b'0' | b'2'..=b'9' => true,
        _ => false,
    }
}

/// `^https?://` case-insensitive
fn is_url(s: &str) -> bool {
    let prefix: String = s.chars().take(8).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("http://") || prefix.starts_with("https://")
}

/// Errors from a fallible classifier backend.
#[derive(Debug, Clone, Error)]
pub enum ClassifyError {
    #[error("classifier rejected payload: {0}")]
    Rejected(String),
    #[error("malformed classifier response: {0}")]
    MalformedResponse(String),
}

/// Trait for classification backends.
///
/// The in-process classifier is infallible, but deployments that defer
/// classification to a remote endpoint can fail (rejection, network,
/// malformed response); the pipeline treats any failure as transient
/// and lets the user rescan.
pub trait Classify {
    fn classify(&mut self, payload: &str) -> Result<ScanResult, ClassifyError>;
}

/// In-process pattern-matching classifier.
#[derive(Debug, Default)]
pub struct LocalClassifier;

impl LocalClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classify for LocalClassifier {
    fn classify(&mut self, payload: &str) -> Result<ScanResult, ClassifyError> {
        Ok(ScanResult::new(payload, classify(payload)))
    }
}
