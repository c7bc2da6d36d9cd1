// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! xylo - a terminal xylophone that records, names and replays note sequences.

pub mod audio;
pub mod config;
pub mod music;
pub mod recording;
pub mod sequencer;
pub mod session;
pub mod store;
pub mod ui;
