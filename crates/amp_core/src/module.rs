//! Module Descriptor
//!
//! The fixed record the audio host uses to discover this module, and the
//! factory that turns an `open` request into an [`AmpDevice`].

use std::fmt;

use amp_platform::{CapabilityProvider, HostContext, HostSymbols, PcmBackend};
use serde::Serialize;
use tracing::{error, info};

use crate::config::AmpConfig;
use crate::device::AmpDevice;
use crate::error::{AmpError, AmpResult};

/// Id the host looks the module up by
pub const AMPLIFIER_HARDWARE_MODULE_ID: &str = "audio_amplifier";

/// Interface name the factory accepts
pub const AMPLIFIER_HARDWARE_INTERFACE: &str = "amplifier_hw_if";

/// Major/minor API version pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ApiVersion {
    pub major: u8,
    pub minor: u8,
}

impl ApiVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Static module descriptor
#[derive(Debug, Serialize)]
pub struct AmplifierModule {
    pub id: &'static str,
    pub name: &'static str,
    pub author: &'static str,
    pub module_api_version: ApiVersion,
    pub hal_api_version: ApiVersion,
    /// Version stamped on every device this module opens
    pub device_api_version: ApiVersion,
}

/// The descriptor exported to the host
pub static HAL_MODULE_INFO: AmplifierModule = AmplifierModule {
    id: AMPLIFIER_HARDWARE_MODULE_ID,
    name: "AW882xx smart amplifier feedback HAL",
    author: "Amp Feedback Authors",
    module_api_version: ApiVersion::new(0, 1),
    hal_api_version: ApiVersion::new(1, 0),
    device_api_version: ApiVersion::new(1, 0),
};

impl AmplifierModule {
    /// Open the amplifier device
    ///
    /// Fails with [`AmpError::NoSuchDevice`] if `name` is not the amplifier
    /// interface (nothing is resolved or allocated in that case) or if the
    /// host does not export every required capability.
    pub fn open<H, P, C>(
        &'static self,
        name: &str,
        provider: &C,
        pcm: P,
        config: &AmpConfig,
    ) -> AmpResult<AmpDevice<H, P>>
    where
        H: HostContext,
        P: PcmBackend,
        C: CapabilityProvider<H> + ?Sized,
    {
        if name != AMPLIFIER_HARDWARE_INTERFACE {
            error!("{} does not match amplifier hardware interface name", name);
            return Err(AmpError::NoSuchDevice(format!("unknown interface {}", name)));
        }

        config.validate().map_err(AmpError::InvalidArgument)?;

        let symbols = HostSymbols::resolve(provider)?;

        info!("Opened {} (device API {})", self.name, self.device_api_version);
        Ok(AmpDevice::new(self, symbols, pcm, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amp_platform::sim::{SimCapabilities, SimHost, SimPcm};
    use amp_platform::{Capability, SndDeviceFn};

    /// Provider that must never be consulted
    struct Untouchable;

    impl CapabilityProvider<SimHost> for Untouchable {
        fn enable_snd_device(&self) -> Option<SndDeviceFn<SimHost>> {
            panic!("capabilities resolved for a rejected interface name");
        }
    }

    #[test]
    fn test_descriptor() {
        assert_eq!(HAL_MODULE_INFO.id, "audio_amplifier");
        assert_eq!(HAL_MODULE_INFO.module_api_version.to_string(), "0.1");
        assert_eq!(HAL_MODULE_INFO.hal_api_version, ApiVersion::new(1, 0));
    }

    #[test]
    fn test_open() {
        let device: AmpDevice<SimHost, SimPcm> = HAL_MODULE_INFO
            .open(
                AMPLIFIER_HARDWARE_INTERFACE,
                &SimCapabilities::new(),
                SimPcm::new(),
                &AmpConfig::default(),
            )
            .unwrap();
        assert!(!device.is_feedback_active());
        assert_eq!(device.version(), ApiVersion::new(1, 0));
        assert_eq!(device.module().id, AMPLIFIER_HARDWARE_MODULE_ID);
    }

    #[test]
    fn test_open_wrong_interface() {
        let result: AmpResult<AmpDevice<SimHost, SimPcm>> = HAL_MODULE_INFO.open(
            "audio_hw_if",
            &Untouchable,
            SimPcm::new(),
            &AmpConfig::default(),
        );
        let err = result.err().unwrap();
        assert!(matches!(err, AmpError::NoSuchDevice(_)));
        assert_eq!(err.errno(), -libc::ENODEV);
    }

    #[test]
    fn test_open_missing_capability() {
        for capability in Capability::ALL {
            let result: AmpResult<AmpDevice<SimHost, SimPcm>> = HAL_MODULE_INFO.open(
                AMPLIFIER_HARDWARE_INTERFACE,
                &SimCapabilities::without(capability),
                SimPcm::new(),
                &AmpConfig::default(),
            );
            let err = result.err().unwrap();
            assert_eq!(err.errno(), -libc::ENODEV);
            assert!(err.to_string().contains(capability.symbol()));
        }
    }

    #[test]
    fn test_open_invalid_config() {
        let mut config = AmpConfig::default();
        config.capture.rate = 0;
        let result: AmpResult<AmpDevice<SimHost, SimPcm>> = HAL_MODULE_INFO.open(
            AMPLIFIER_HARDWARE_INTERFACE,
            &SimCapabilities::new(),
            SimPcm::new(),
            &config,
        );
        assert!(matches!(result.err(), Some(AmpError::InvalidArgument(_))));
    }

    #[test]
    fn test_config_cannot_rename_interface() {
        let config: AmpConfig =
            serde_json::from_str(r#"{ "interface_name": "speaker_hw_if" }"#).unwrap();

        let result: AmpResult<AmpDevice<SimHost, SimPcm>> =
            HAL_MODULE_INFO.open("speaker_hw_if", &Untouchable, SimPcm::new(), &config);
        assert!(matches!(result.err(), Some(AmpError::NoSuchDevice(_))));

        let result: AmpResult<AmpDevice<SimHost, SimPcm>> = HAL_MODULE_INFO.open(
            AMPLIFIER_HARDWARE_INTERFACE,
            &SimCapabilities::new(),
            SimPcm::new(),
            &config,
        );
        assert!(result.is_ok());
    }
}
