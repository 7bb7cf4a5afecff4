//! Capture Stream Configuration

use serde::{Deserialize, Serialize};

/// Threshold that keeps a stream running through xruns
pub const NEVER_STOP_THRESHOLD: u32 = i32::MAX as u32;

/// Sample format of a pcm stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PcmFormat {
    S16Le,
    S24Le,
    S32Le,
}

impl PcmFormat {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            PcmFormat::S16Le => 2,
            PcmFormat::S24Le | PcmFormat::S32Le => 4,
        }
    }
}

/// Hardware pcm stream configuration
///
/// The default is the amplifier feedback format: stereo 48 kHz S16LE,
/// 4 periods of 256 frames, started immediately and never auto-stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmConfig {
    /// Number of interleaved channels
    pub channels: u16,

    /// Sample rate in Hz
    pub rate: u32,

    /// Frames per period
    pub period_size: u32,

    /// Periods in the hardware ring
    pub period_count: u32,

    pub format: PcmFormat,

    /// Frames queued before the stream starts (0 = start immediately)
    pub start_threshold: u32,

    /// Available frames at which the stream stops on xrun
    pub stop_threshold: u32,

    /// Silence inserted on underrun (0 = none)
    pub silence_threshold: u32,
}

impl Default for PcmConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            rate: 48000,
            period_size: 256,
            period_count: 4,
            format: PcmFormat::S16Le,
            start_threshold: 0,
            stop_threshold: NEVER_STOP_THRESHOLD,
            silence_threshold: 0,
        }
    }
}

impl PcmConfig {
    /// Bytes in one interleaved frame
    pub fn bytes_per_frame(&self) -> usize {
        self.format.bytes_per_sample() * self.channels as usize
    }

    /// Total frames in the hardware ring
    pub fn buffer_frames(&self) -> u32 {
        self.period_size * self.period_count
    }

    /// Latency of one period in milliseconds
    pub fn latency_ms(&self) -> f32 {
        (self.period_size as f32 / self.rate as f32) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rate < 8000 || self.rate > 192000 {
            return Err(format!("Invalid sample rate: {}", self.rate));
        }
        if self.channels == 0 || self.channels > 8 {
            return Err(format!("Invalid channel count: {}", self.channels));
        }
        if self.period_size < 32 || self.period_size > 8192 {
            return Err(format!("Invalid period size: {}", self.period_size));
        }
        if self.period_count < 2 {
            return Err(format!("Invalid period count: {}", self.period_count));
        }
        Ok(())
    }
}
