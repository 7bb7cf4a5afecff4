//! Amp Platform - Host Audio Framework Contract
//!
//! This crate describes everything the amplifier feedback module touches but
//! does not own:
//! - Sound devices and the speaker-route classification
//! - Usecase records and the host's shared usecase list
//! - The six host capabilities and their one-shot resolution
//! - The pcm capture transport
//!
//! # Architecture
//!
//! ```text
//! Audio host ──CapabilityProvider──▶ HostSymbols (resolved once at open)
//!     │                                     │
//!     └── HostContext (borrowed per call) ──┴──▶ amp_core controller
//!                                                     │
//!                                         PcmBackend ─┘ (capture stream)
//! ```
//!
//! The [`sim`] module provides an in-memory host and transport.

mod error;
mod pcm;
mod snd_device;
mod symbols;
mod traits;
mod usecase;

pub mod sim;

pub use error::PlatformError;
pub use pcm::{PcmConfig, PcmFormat, NEVER_STOP_THRESHOLD};
pub use snd_device::SndDevice;
pub use symbols::{
    AudioRouteFn, Capability, CapabilityProvider, FindUsecaseFn, HostSymbols, PcmDeviceIdFn,
    SndDeviceFn,
};
pub use traits::{HostContext, PcmBackend, PcmStream};
pub use usecase::{PcmDirection, Usecase, UsecaseHandle, UsecaseId, UsecaseList};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        let _config = PcmConfig::default();
        let _list = UsecaseList::new();
        assert!(SndDevice::Speaker.is_speaker());
    }
}
