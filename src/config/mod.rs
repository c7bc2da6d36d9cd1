// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application settings.
//!
//! Settings live in a TOML file. Every field has a default, so a missing
//! file or a partial one is fine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::Note;
use crate::sequencer::PlaybackPolicy;
use crate::store::DEFAULT_STORE_KEY;

/// Default settings file name
pub const DEFAULT_CONFIG_FILE: &str = "xylo.toml";

/// Root settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    /// Sound assets and buttons
    #[serde(default)]
    pub audio: AudioSettings,
    /// Record store
    #[serde(default)]
    pub store: StoreSettings,
    /// Sequence playback
    #[serde(default)]
    pub playback: PlaybackSettings,
    /// Log output
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match fs::metadata(path.as_ref()) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to stat config file: {:?}", path.as_ref())),
        }
    }

    /// Parse settings from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML configuration")
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize configuration to TOML")
    }

    /// Save settings to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let text = self.to_toml()?;
        fs::write(path.as_ref(), text)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))
    }
}

/// Sound asset settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    /// Directory holding `<note>.wav` assets
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
    /// Button labels, left to right
    #[serde(default = "default_notes")]
    pub notes: Vec<Note>,
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("sounds")
}
fn default_notes() -> Vec<Note> {
    ["C", "D", "E", "F", "G", "A", "B"]
        .into_iter()
        .map(Note::from)
        .collect()
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            asset_dir: default_asset_dir(),
            notes: default_notes(),
        }
    }
}

/// Record store settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSettings {
    /// Store file path
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Key the records are kept under
    #[serde(default = "default_store_key")]
    pub key: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("records.yaml")
}
fn default_store_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            key: default_store_key(),
        }
    }
}

/// Playback settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackSettings {
    /// Delay between replayed notes in milliseconds
    #[serde(default = "default_note_delay_ms")]
    pub note_delay_ms: u64,
    /// What a new play does to notes still pending
    #[serde(default)]
    pub policy: PlaybackPolicy,
}

fn default_note_delay_ms() -> u64 {
    500
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            note_delay_ms: default_note_delay_ms(),
            policy: PlaybackPolicy::default(),
        }
    }
}

impl PlaybackSettings {
    /// Delay between replayed notes
    pub fn note_delay(&self) -> Duration {
        Duration::from_millis(self.note_delay_ms)
    }
}

/// Log settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file (the terminal belongs to the UI)
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_file() -> PathBuf {
    PathBuf::from("xylo.log")
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}
