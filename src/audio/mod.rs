// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sound playback for note buttons.
//!
//! This module provides:
//! - Asset catalog resolving notes to bundled `.wav` files
//! - WAV decoding and a single-voice player
//! - Audio output via cpal

pub mod catalog;
pub mod output;
pub mod player;

pub use catalog::AssetCatalog;
pub use output::AudioOutput;
pub use player::{Voice, WavPlayer};

use crate::music::Note;

/// Trait for sound player implementations.
///
/// Playback is fire-and-forget: `play` returns as soon as the sound has
/// been handed to the output. Callers log failures and carry on.
pub trait SoundPlayer {
    /// Play the sound for `note` once.
    ///
    /// # Returns
    /// * `Ok(())` once playback has started
    /// * `Err(SoundError::AssetNotFound)` if there is no asset for the note
    /// * `Err(SoundError::PlaybackError)` if decoding or the device failed
    fn play(&self, note: &Note) -> Result<(), SoundError>;
}

/// Sound player error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SoundError {
    /// No bundled asset for the note
    #[error("No sound asset for note {0}")]
    AssetNotFound(Note),
    /// Decoding or device activation failed
    #[error("Playback failed: {0}")]
    PlaybackError(String),
}

/// Player that discards every note (used with `--mute`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&self, _note: &Note) -> Result<(), SoundError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let missing = SoundError::AssetNotFound(Note::from("Z"));
        assert_eq!(missing.to_string(), "No sound asset for note Z");

        let failed = SoundError::PlaybackError("no device".to_string());
        assert_eq!(failed.to_string(), "Playback failed: no device");
    }

    #[test]
    fn test_silent_player() {
        assert!(SilentPlayer.play(&Note::from("C")).is_ok());
    }
}
