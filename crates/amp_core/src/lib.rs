//! Amp Core - Speaker Feedback Module
//!
//! This crate is the amplifier module an audio host loads to keep a smart
//! amplifier's speaker-protection loop fed:
//! - Module descriptor and `open` factory
//! - The device handle the host keeps (`AmpDevice`)
//! - The feedback usecase controller (start/stop with full unwind)
//! - Optional CPAL capture transport (`cpal` feature)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Audio host                           │
//! │  open(name) ──▶ HAL_MODULE_INFO ──resolve──▶ HostSymbols     │
//! │  speaker route change ──set_feedback──▶ AmpDevice            │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    FeedbackController                        │
//! │  usecase list ◀─ head insert / unlink                        │
//! │  enable/disable snd device + route ─▶ host                   │
//! │  pcm capture open/start/close ─▶ PcmBackend                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The host is expected to serialize calls into one device.
//! `SharedAmpDevice` adds a mutex for hosts that do not.

mod config;
mod controller;
mod device;
mod error;
mod message;
mod module;

#[cfg(feature = "cpal")]
mod stream;

pub use config::AmpConfig;
pub use controller::FeedbackController;
pub use device::{AmpDevice, AmplifierDevice, AudioMode, SharedAmpDevice};
pub use error::{AmpError, AmpResult};
pub use message::FeedbackEvent;
pub use module::{
    AmplifierModule, ApiVersion, AMPLIFIER_HARDWARE_INTERFACE, AMPLIFIER_HARDWARE_MODULE_ID,
    HAL_MODULE_INFO,
};

#[cfg(feature = "cpal")]
pub use stream::{pcm_device_name, CpalCapture, CpalCaptureStream};

// Re-export the host contract for convenience
pub use amp_platform::{
    CapabilityProvider, HostContext, PcmBackend, PcmConfig, PcmStream, SndDevice, UsecaseId,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify public API is accessible
        let _config = AmpConfig::default();
        assert_eq!(HAL_MODULE_INFO.id, AMPLIFIER_HARDWARE_MODULE_ID);
    }
}
