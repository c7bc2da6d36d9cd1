// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note identifiers and sequences.
//!
//! A note is the symbolic name of a playable sound (the stem of a
//! bundled `.wav` asset). A sequence is the ordered list of notes
//! produced by one recording session.

pub mod note;

pub use note::{transcript, Note, Sequence};
