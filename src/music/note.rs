// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Symbolic note identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Symbolic name of a playable sound, e.g. `"C"` for `C.wav`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Note(String);

impl Note {
    /// Create a note from its identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Note {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Note {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Note {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered list of notes; duplicates allowed, may be empty
pub type Sequence = Vec<Note>;

/// Render a sequence the way the live transcript shows it: `C, D, E`
pub fn transcript(sequence: &[Note]) -> String {
    sequence
        .iter()
        .map(Note::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
