//! Scripted decoder for tests and demos.

use super::Decoder;
use crate::capture::Frame;
use std::collections::VecDeque;

/// Mock decoder that replays a scripted sequence of outcomes.
///
/// Each call to `decode` pops the next scripted outcome; once the
/// script is exhausted, every further frame is a miss. An optional
/// `repeat` payload instead answers every frame, which is how a real
/// camera behaves while a code stays in view.
#[derive(Debug, Default)]
pub struct MockDecoder {
    script: VecDeque<Option<String>>,
    repeat: Option<String>,
    frames_seen: u64,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that never finds a code.
    pub fn never() -> Self {
        Self::default()
    }

    /// Decoder that yields `payload` on every frame.
    pub fn repeating(payload: impl Into<String>) -> Self {
        Self {
            repeat: Some(payload.into()),
            ..Self::default()
        }
    }

    /// Decoder that misses `misses` frames, then yields `payload` once.
    pub fn after_misses(misses: usize, payload: impl Into<String>) -> Self {
        let mut script: VecDeque<Option<String>> = (0..misses).map(|_| None).collect();
        script.push_back(Some(payload.into()));
        Self {
            script,
            ..Self::default()
        }
    }

    /// Queues one more scripted outcome.
    pub fn push(&mut self, outcome: Option<String>) {
        self.script.push_back(outcome);
    }

    /// Returns how many frames have been offered to this decoder.
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl Decoder for MockDecoder {
    fn decode(&mut self, _frame: &Frame) -> Option<String> {
        self.frames_seen += 1;
        if let Some(payload) = &self.repeat {
            return Some(payload.clone());
        }
        self.script.pop_front().flatten()
    }
}
