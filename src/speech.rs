// speech.rs — Plays synthesized narration through the default output device.
//
// The speech model returns PCM 16-bit mono at 24 kHz. Each clip is converted
// to f32, resampled to the device rate, fanned out to the device's channels,
// and played on the calling thread until it finishes. Clips are not queued:
// two overlapping calls play at the same time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::ai::SpeechClip;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("No default output device found")]
    NoDevice,
    #[error("Output device error: {0}")]
    Device(String),
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("Output stream error: {0}")]
    Stream(String),
}

/// Audio output the session narrates through.
pub trait SpeechOutput: Send + Sync {
    /// Play `clip` to completion. Blocking; callers run it off the async
    /// runtime.
    fn play_blocking(&self, clip: &SpeechClip) -> Result<(), PlaybackError>;
}

/// Default-device playback via cpal.
#[derive(Debug, Default)]
pub struct CpalSpeaker;

/// Interleaved samples plus a read cursor shared with the output callback.
struct PlaybackBuffer {
    samples: Vec<f32>,
    position: usize,
}

impl PlaybackBuffer {
    fn next_sample(&mut self) -> f32 {
        let s = self.samples.get(self.position).copied().unwrap_or(0.0);
        self.position += 1;
        s
    }
}

impl SpeechOutput for CpalSpeaker {
    fn play_blocking(&self, clip: &SpeechClip) -> Result<(), PlaybackError> {
        if clip.pcm.len() < 2 {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(PlaybackError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        let device_rate = supported.sample_rate().0;
        let device_channels = supported.channels() as usize;
        let sample_format = supported.sample_format();

        let mono = pcm16_to_f32(&clip.samples());
        let resampled = resample(&mono, clip.sample_rate, device_rate);
        let interleaved = fan_out(&resampled, device_channels);
        let duration_ms = (resampled.len() as u64 * 1000) / device_rate.max(1) as u64;

        log::debug!(
            "Playing speech: {}ms at {}Hz x{} ({:?})",
            duration_ms,
            device_rate,
            device_channels,
            sample_format
        );

        let buffer = Arc::new(Mutex::new(PlaybackBuffer {
            samples: interleaved,
            position: 0,
        }));
        let stream_config: cpal::StreamConfig = supported.into();
        let err_fn = |err: cpal::StreamError| log::error!("Speech output stream error: {err}");

        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                let buf = Arc::clone(&buffer);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        if let Ok(mut b) = buf.lock() {
                            for out in data.iter_mut() {
                                *out = b.next_sample();
                            }
                        }
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::I16 => {
                let buf = Arc::clone(&buffer);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        if let Ok(mut b) = buf.lock() {
                            for out in data.iter_mut() {
                                *out = (b.next_sample().clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                            }
                        }
                    },
                    err_fn,
                    None,
                )
            }
            cpal::SampleFormat::U16 => {
                let buf = Arc::clone(&buffer);
                device.build_output_stream(
                    &stream_config,
                    move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                        if let Ok(mut b) = buf.lock() {
                            for out in data.iter_mut() {
                                let s = b.next_sample().clamp(-1.0, 1.0);
                                *out = ((s + 1.0) * 0.5 * u16::MAX as f32) as u16;
                            }
                        }
                    },
                    err_fn,
                    None,
                )
            }
            other => return Err(PlaybackError::UnsupportedFormat(format!("{other:?}"))),
        }
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        // Small tail so the device drains its last period before the stream drops.
        std::thread::sleep(Duration::from_millis(duration_ms + 150));
        Ok(())
    }
}

// ─── DSP helpers ───────────────────────────────────────────────────────────────

/// Convert i16 PCM to f32 in -1.0..1.0.
fn pcm16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32768.0).collect()
}

/// Resample audio using simple linear interpolation.
fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || to_rate == 0 {
        return input.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = ((input.len() as f64) / ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < input.len() {
            input[idx] as f64 * (1.0 - frac) + input[idx + 1] as f64 * frac
        } else {
            input.get(idx).copied().unwrap_or(0.0) as f64
        };

        output.push(sample as f32);
    }

    output
}

/// Duplicate each mono sample across `channels` interleaved slots.
fn fan_out(mono: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return mono.to_vec();
    }
    mono.iter()
        .flat_map(|&s| std::iter::repeat(s).take(channels))
        .collect()
}
