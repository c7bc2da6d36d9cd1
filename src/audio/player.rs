// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Single-voice WAV player.
//!
//! Each `play` decodes (or fetches from cache) the note's asset and
//! replaces whatever the voice was playing. Overlapping presses cut each
//! other off rather than mixing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use hound::{SampleFormat, WavReader};
use tracing::{debug, error};

use super::{AssetCatalog, AudioOutput, SoundError, SoundPlayer};
use crate::music::Note;

/// Decoded mono sample buffer
pub type SampleBuffer = Arc<[f32]>;

/// The one sound currently playing
#[derive(Debug, Default)]
pub struct Voice {
    /// Samples at the output rate
    samples: Option<SampleBuffer>,
    /// Next frame to render
    position: usize,
}

impl Voice {
    /// Replace the current sound
    pub fn start(&mut self, samples: SampleBuffer) {
        self.samples = Some(samples);
        self.position = 0;
    }

    /// Render into an interleaved buffer, writing the same sample to every channel
    pub fn render(&mut self, buffer: &mut [f32], channels: usize) {
        let Some(samples) = self.samples.as_ref() else {
            return;
        };
        if channels == 0 {
            return;
        }

        for frame in buffer.chunks_mut(channels) {
            match samples.get(self.position) {
                Some(&sample) => {
                    frame.fill(sample);
                    self.position += 1;
                }
                None => break,
            }
        }

        if self.position >= samples.len() {
            self.samples = None;
            self.position = 0;
        }
    }
}

/// Decoded WAV asset
#[derive(Debug, Clone)]
pub struct DecodedWav {
    /// Mono samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate of the file
    pub sample_rate: u32,
}

/// Decode a WAV file to mono f32
pub fn decode_wav(path: &Path) -> Result<DecodedWav, SoundError> {
    let reader = WavReader::open(path)
        .map_err(|e| SoundError::PlaybackError(format!("Failed to open {:?}: {}", path, e)))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| SoundError::PlaybackError(format!("Failed to decode {:?}: {}", path, e)))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| {
                    SoundError::PlaybackError(format!("Failed to decode {:?}: {}", path, e))
                })?
        }
    };

    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok(DecodedWav {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Linear-interpolation resampler
pub fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).ceil() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let index = (pos.floor() as usize).min(last);
            let next = (index + 1).min(last);
            let frac = (pos - index as f64) as f32;
            samples[index] + (samples[next] - samples[index]) * frac
        })
        .collect()
}

/// Output opened on first use. A failed open is kept so the device is
/// not probed again on every press.
enum OutputSlot<T> {
    Closed,
    Open(T),
    Failed(SoundError),
}

impl<T> OutputSlot<T> {
    fn get_or_open<F>(&mut self, open: F) -> Result<&T, SoundError>
    where
        F: FnOnce() -> Result<T, SoundError>,
    {
        if let OutputSlot::Closed = self {
            *self = match open() {
                Ok(output) => OutputSlot::Open(output),
                Err(e) => {
                    error!("Audio output unavailable, notes will be silent: {}", e);
                    OutputSlot::Failed(e)
                }
            };
        }

        match &*self {
            OutputSlot::Open(output) => Ok(output),
            OutputSlot::Failed(e) => Err(e.clone()),
            OutputSlot::Closed => Err(SoundError::PlaybackError(
                "Audio output not opened".to_string(),
            )),
        }
    }

    /// True while the output has never been opened
    #[cfg(test)]
    fn is_none(&self) -> bool {
        matches!(self, OutputSlot::Closed)
    }
}

/// Sound player decoding `<note>.wav` and playing it through cpal.
///
/// The output stream is opened on the first `play`, so constructing a
/// player never touches the audio device.
pub struct WavPlayer {
    /// Asset lookup
    catalog: AssetCatalog,
    /// Voice shared with the audio callback
    voice: Arc<Mutex<Voice>>,
    /// Lazily opened output
    output: RefCell<OutputSlot<AudioOutput>>,
    /// Decoded assets at the output rate
    cache: RefCell<HashMap<Note, SampleBuffer>>,
}

impl WavPlayer {
    /// Create a player over `catalog`
    pub fn new(catalog: AssetCatalog) -> Self {
        Self {
            catalog,
            voice: Arc::new(Mutex::new(Voice::default())),
            output: RefCell::new(OutputSlot::Closed),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Get the asset catalog
    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    fn output_rate(&self) -> Result<u32, SoundError> {
        let voice = Arc::clone(&self.voice);
        let mut slot = self.output.borrow_mut();
        let output = slot.get_or_open(move || {
            AudioOutput::new(move |buffer, channels| {
                if let Ok(mut voice) = voice.lock() {
                    voice.render(buffer, channels);
                }
            })
        })?;
        Ok(output.sample_rate())
    }

    fn samples_for(&self, note: &Note, path: &Path, rate: u32) -> Result<SampleBuffer, SoundError> {
        if let Some(samples) = self.cache.borrow().get(note) {
            return Ok(Arc::clone(samples));
        }

        let decoded = decode_wav(path)?;
        let samples: SampleBuffer =
            resample_linear(&decoded.samples, decoded.sample_rate, rate).into();
        debug!(
            "Decoded {:?}: {} samples at {} Hz",
            path,
            samples.len(),
            rate
        );

        self.cache
            .borrow_mut()
            .insert(note.clone(), Arc::clone(&samples));
        Ok(samples)
    }
}

impl SoundPlayer for WavPlayer {
    fn play(&self, note: &Note) -> Result<(), SoundError> {
        let path = self.catalog.resolve(note)?;
        let rate = self.output_rate()?;
        let samples = self.samples_for(note, &path, rate)?;

        let mut voice = self
            .voice
            .lock()
            .map_err(|_| SoundError::PlaybackError("Failed to acquire voice lock".to_string()))?;
        voice.start(samples);
        Ok(())
    }
}
