//! Audio input
//!
//! Sound mode needs an input device. Whether it can run is decided once, at
//! startup, by [`probe`]; the stream itself delivers fixed-size mono blocks
//! regardless of the buffer sizes the host picks.

use std::fmt;

/// Whether sound mode can run on this machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCapability {
    /// An input device is ready
    Available { device: String },
    /// Sound mode must refuse to start
    Unavailable { reason: String },
}

impl fmt::Display for AudioCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioCapability::Available { device } => write!(f, "available ({})", device),
            AudioCapability::Unavailable { reason } => write!(f, "unavailable: {}", reason),
        }
    }
}

/// Look for a default input device
#[cfg(feature = "audio")]
pub fn probe() -> AudioCapability {
    use cpal::traits::{DeviceTrait, HostTrait};

    let host = cpal::default_host();
    match host.default_input_device() {
        Some(device) => AudioCapability::Available {
            device: device.name().unwrap_or_else(|_| "unknown device".to_string()),
        },
        None => AudioCapability::Unavailable {
            reason: format!("no input device on the {} audio host", host.id().name()),
        },
    }
}

/// Look for a default input device
#[cfg(not(feature = "audio"))]
pub fn probe() -> AudioCapability {
    AudioCapability::Unavailable {
        reason: "built without the `audio` feature".to_string(),
    }
}

/// Regroups interleaved host buffers into fixed-size mono blocks
///
/// Only the first channel is kept.
#[derive(Debug)]
pub struct BlockAssembler {
    block_size: usize,
    channels: usize,
    pending: Vec<f32>,
}

impl BlockAssembler {
    pub fn new(block_size: usize, channels: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            block_size,
            channels: channels.max(1),
            pending: Vec::with_capacity(block_size),
        }
    }

    /// Append interleaved frames, calling `on_block` for every completed block
    pub fn push(&mut self, interleaved: &[f32], mut on_block: impl FnMut(&[f32])) {
        for frame in interleaved.chunks(self.channels) {
            self.pending.push(frame[0]);
            if self.pending.len() == self.block_size {
                on_block(&self.pending);
                self.pending.clear();
            }
        }
    }
}

#[cfg(feature = "audio")]
pub use input::{start_input, AudioInput};

#[cfg(feature = "audio")]
mod input {
    use super::BlockAssembler;
    use crate::config::SoundSettings;
    use anyhow::{anyhow, bail, Context, Result};
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{SampleFormat, SampleRate, StreamConfig};
    use tracing::{info, warn};

    /// Running input stream; audio stops when dropped
    pub struct AudioInput {
        _stream: cpal::Stream,
    }

    /// Open the default input device and deliver mono blocks to `on_block`
    ///
    /// `on_block` runs on the audio thread and must not block.
    pub fn start_input<F>(settings: &SoundSettings, on_block: F) -> Result<AudioInput>
    where
        F: FnMut(&[f32]) + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no default input device"))?;
        let name = device.name().unwrap_or_else(|_| "unknown device".to_string());

        let default = device
            .default_input_config()
            .with_context(|| format!("Failed to query input config of {}", name))?;
        let channels = default.channels();
        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(settings.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut assembler = BlockAssembler::new(settings.block_size, channels as usize);
        let mut on_block = on_block;
        let on_error = |e: cpal::StreamError| warn!("Audio stream error: {}", e);

        let stream = match default.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    assembler.push(data, &mut on_block);
                },
                on_error,
                None,
            ),
            SampleFormat::I16 => {
                let mut converted = Vec::new();
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        converted.clear();
                        converted.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
                        assembler.push(&converted, &mut on_block);
                    },
                    on_error,
                    None,
                )
            }
            other => bail!("unsupported input sample format {:?} on {}", other, name),
        }
        .with_context(|| format!("Failed to open input stream on {}", name))?;

        stream
            .play()
            .with_context(|| format!("Failed to start input stream on {}", name))?;

        info!(
            "Listening on {} ({} Hz, {} channel(s), {} samples per block)",
            name, settings.sample_rate, channels, settings.block_size
        );
        Ok(AudioInput { _stream: stream })
    }
}
