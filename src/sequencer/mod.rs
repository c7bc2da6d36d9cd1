// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sequence playback.

pub mod scheduler;

pub use scheduler::{PlaybackPolicy, PlaybackScheduler, FIXED_DELAY};
