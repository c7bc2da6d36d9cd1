// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio output via cpal.
//!
//! Opens the default output device at its preferred rate, channel count
//! and sample format. The render callback always works in f32; frames are
//! converted to the device's format on the way out.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::{debug, error};

use super::SoundError;

/// Audio output stream
pub struct AudioOutput {
    /// cpal stream
    _stream: Stream,
    /// Output device
    _device: Device,
    /// Negotiated sample rate in Hz
    sample_rate: u32,
}

impl AudioOutput {
    /// Open the default output device and start pulling from `callback`.
    ///
    /// The callback receives a zeroed interleaved f32 buffer and the
    /// channel count.
    pub fn new<F>(callback: F) -> Result<Self, SoundError>
    where
        F: FnMut(&mut [f32], usize) + Send + 'static,
    {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| SoundError::PlaybackError("No audio device available".to_string()))?;

        let supported = device.default_output_config().map_err(|e| {
            SoundError::PlaybackError(format!("Failed to get default config: {}", e))
        })?;

        let sample_format = supported.sample_format();
        let stream_config = supported.config();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32, F>(&device, &stream_config, callback),
            SampleFormat::I16 => build_stream::<i16, F>(&device, &stream_config, callback),
            SampleFormat::U16 => build_stream::<u16, F>(&device, &stream_config, callback),
            other => {
                return Err(SoundError::PlaybackError(format!(
                    "Unsupported sample format: {:?}. Supported formats: F32, I16, U16",
                    other
                )))
            }
        }?;

        stream
            .play()
            .map_err(|e| SoundError::PlaybackError(format!("Failed to start stream: {}", e)))?;

        debug!(
            "Audio output started at {} Hz, {} channels, {:?}",
            stream_config.sample_rate.0, stream_config.channels, sample_format
        );

        Ok(Self {
            _stream: stream,
            _device: device,
            sample_rate: stream_config.sample_rate.0,
        })
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn build_stream<T, F>(device: &Device, config: &StreamConfig, mut callback: F) -> Result<Stream, SoundError>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
    F: FnMut(&mut [f32], usize) + Send + 'static,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                render_converted(data, &mut scratch, channels, &mut callback);
            },
            move |err| {
                error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| SoundError::PlaybackError(format!("Failed to build stream: {}", e)))
}

/// Render into a zeroed f32 scratch buffer and convert it into `data`
fn render_converted<T, F>(data: &mut [T], scratch: &mut Vec<f32>, channels: usize, callback: &mut F)
where
    T: FromSample<f32>,
    F: FnMut(&mut [f32], usize),
{
    // Only grows when the host asks for a larger buffer than before
    scratch.resize(data.len(), 0.0);
    scratch.fill(0.0);
    callback(scratch, channels);

    for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
        *out = T::from_sample_(sample);
    }
}

/// Get default device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device().and_then(|d| d.name().ok())
}
