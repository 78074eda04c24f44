//! Transient error notices.
//!
//! Scan failures are surfaced to the hosting UI as short-lived notices
//! that clear themselves after a fixed display duration. Expiry is
//! checked lazily on read; no timer task is involved.

use std::time::{Duration, Instant};

/// Default notice display duration.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Category of a notice, mirroring the scan error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The user denied camera access.
    PermissionDenied,
    /// No usable camera device, or the device went away.
    DeviceUnavailable,
    /// The classifier rejected the payload or answered garbage.
    ClassificationFailed,
}

/// A transient, human-readable failure notice.
#[derive(Debug, Clone)]
pub struct Notice {
    kind: NoticeKind,
    message: String,
    raised: Instant,
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// When the notice was raised.
    pub fn raised(&self) -> Instant {
        self.raised
    }
}

/// Holds at most one active notice; a newer notice replaces the old.
#[derive(Debug)]
pub struct NoticeBoard {
    current: Option<Notice>,
    ttl: Duration,
    raised_total: u64,
}

impl NoticeBoard {
    /// Creates a board with the given display duration.
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: None,
            ttl,
            raised_total: 0,
        }
    }

    /// Raises a notice, replacing any currently displayed one.
    pub fn raise(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(?kind, %message, "Scan notice raised");
        self.current = Some(Notice {
            kind,
            message,
            raised: Instant::now(),
        });
        self.raised_total += 1;
    }

    /// Returns the active notice, clearing it first if it has expired.
    pub fn active(&mut self) -> Option<&Notice> {
        if let Some(notice) = &self.current {
            if notice.raised.elapsed() >= self.ttl {
                self.current = None;
            }
        }
        self.current.as_ref()
    }

    /// Clears any active notice immediately.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Total notices ever raised.
    pub fn raised_total(&self) -> u64 {
        self.raised_total
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_visible_then_expires() {
        let mut board = NoticeBoard::new(Duration::from_millis(20));
        board.raise(NoticeKind::PermissionDenied, "camera access denied");

        let notice = board.active().expect("notice should be visible");
        assert_eq!(notice.kind(), NoticeKind::PermissionDenied);
        assert_eq!(notice.message(), "camera access denied");

        std::thread::sleep(Duration::from_millis(30));
        assert!(board.active().is_none());
    }

    #[test]
    fn test_newer_notice_replaces_older() {
        let mut board = NoticeBoard::default();
        board.raise(NoticeKind::DeviceUnavailable, "no device");
        board.raise(NoticeKind::ClassificationFailed, "bad response");

        assert_eq!(
            board.active().unwrap().kind(),
            NoticeKind::ClassificationFailed
        );
        assert_eq!(board.raised_total(), 2);
    }

    #[test]
    fn test_clear() {
        let mut board = NoticeBoard::default();
        board.raise(NoticeKind::DeviceUnavailable, "no device");
        board.clear();
        assert!(board.active().is_none());
    }
}
