// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Button press capture.
//!
//! Collects pressed notes into an ordered buffer while recording is
//! active. Every recording starts from an empty buffer. The buffer
//! survives `stop()` so the caller can commit it to the store.

use crate::music::{transcript, Note, Sequence};

/// Recording state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording,
}

/// Ordered, append-only note recorder
#[derive(Debug, Default)]
pub struct SequenceRecorder {
    /// Current state
    state: RecordingState,
    /// Notes captured so far
    buffer: Sequence,
}

impl SequenceRecorder {
    /// Create a new idle recorder with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Check if recording
    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Start a new take with an empty buffer. No-op if already recording.
    pub fn start(&mut self) {
        if self.state == RecordingState::Idle {
            self.buffer.clear();
            self.state = RecordingState::Recording;
        }
    }

    /// Record a pressed note. Ignored while idle.
    pub fn append(&mut self, note: Note) {
        if self.is_recording() {
            self.buffer.push(note);
        }
    }

    /// Stop recording and return a copy of the buffer
    pub fn stop(&mut self) -> Sequence {
        self.state = RecordingState::Idle;
        self.buffer.clone()
    }

    /// Clear the buffer
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Get the captured notes
    pub fn buffer(&self) -> &[Note] {
        &self.buffer
    }

    /// Get number of captured notes
    pub fn note_count(&self) -> usize {
        self.buffer.len()
    }

    /// Live transcript of the buffer, e.g. `C, D, E`
    pub fn transcript(&self) -> String {
        transcript(&self.buffer)
    }
}
