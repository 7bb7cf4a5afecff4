//! CPAL Capture Transport
//!
//! Opens the feedback pcm through CPAL's ALSA host. The amplifier consumes
//! the voltage/current samples itself; all this stream has to do is run,
//! so captured buffers are dropped on the floor.
//!
//! CPAL exposes channels, rate and period size only. Period count and the
//! start/stop/silence thresholds are left to the driver defaults.

use amp_platform::{PcmBackend, PcmConfig, PcmDirection, PcmFormat, PcmStream, PlatformError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Host, Stream, StreamConfig as CpalStreamConfig};
use tracing::{debug, warn};

/// ALSA name of a hardware pcm device
pub fn pcm_device_name(card: u32, device: u32) -> String {
    format!("hw:{},{}", card, device)
}

/// The part of a [`PcmConfig`] CPAL can express
pub fn stream_config(config: &PcmConfig) -> CpalStreamConfig {
    CpalStreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.rate),
        buffer_size: cpal::BufferSize::Fixed(config.period_size),
    }
}

/// Capture transport backed by the default CPAL host
pub struct CpalCapture {
    host: Host,
}

impl CpalCapture {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    fn build(
        &self,
        card: u32,
        device: u32,
        direction: PcmDirection,
        config: &PcmConfig,
    ) -> Result<Stream, String> {
        if direction != PcmDirection::Capture {
            return Err("only capture streams are supported".to_string());
        }
        if config.format != PcmFormat::S16Le {
            return Err(format!("unsupported sample format {:?}", config.format));
        }

        let name = pcm_device_name(card, device);
        let input = self
            .host
            .input_devices()
            .map_err(|e| e.to_string())?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| format!("cannot find {}", name))?;

        debug!("Building feedback capture stream on {}", name);
        input
            .build_input_stream(
                &stream_config(config),
                move |_data: &[i16], _: &cpal::InputCallbackInfo| {},
                move |err| warn!("Feedback capture stream error: {}", err),
                None,
            )
            .map_err(|e| e.to_string())
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl PcmBackend for CpalCapture {
    type Stream = CpalCaptureStream;

    fn open(
        &mut self,
        card: u32,
        device: u32,
        direction: PcmDirection,
        config: &PcmConfig,
    ) -> CpalCaptureStream {
        match self.build(card, device, direction, config) {
            Ok(stream) => CpalCaptureStream {
                stream: Some(stream),
                error: String::new(),
            },
            Err(error) => CpalCaptureStream {
                stream: None,
                error,
            },
        }
    }
}

/// Feedback capture stream opened through CPAL
pub struct CpalCaptureStream {
    // Held only to keep the capture running
    stream: Option<Stream>,
    error: String,
}

impl PcmStream for CpalCaptureStream {
    fn is_ready(&self) -> bool {
        self.stream.is_some()
    }

    fn error_message(&self) -> String {
        self.error.clone()
    }

    fn start(&mut self) -> Result<(), PlatformError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| PlatformError::StreamStartFailed(self.error.clone()))?;
        stream
            .play()
            .map_err(|e| PlatformError::StreamStartFailed(e.to_string()))
    }

    fn close(self) {
        if let Some(stream) = self.stream {
            if let Err(e) = stream.pause() {
                debug!("Pausing feedback capture before close failed: {}", e);
            }
        }
    }
}
