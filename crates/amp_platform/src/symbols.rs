//! Host Capability Resolution
//!
//! The amplifier module drives the host's routing engine through six entry
//! points. A [`CapabilityProvider`] offers them; [`HostSymbols::resolve`]
//! binds all six once at open time and refuses to produce a partial set.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PlatformError;
use crate::snd_device::SndDevice;
use crate::usecase::{PcmDirection, Usecase, UsecaseHandle, UsecaseId};

/// Activate or deactivate a routing endpoint
pub type SndDeviceFn<H> = fn(&mut H, SndDevice) -> Result<(), PlatformError>;

/// Apply or remove the mixer route implied by a usecase
pub type AudioRouteFn<H> = fn(&mut H, &Usecase) -> Result<(), PlatformError>;

/// Map (usecase, direction) to a hardware pcm index, negative when unmapped
pub type PcmDeviceIdFn<H> = fn(&H, UsecaseId, PcmDirection) -> i32;

/// Locate a usecase in the host list by id
pub type FindUsecaseFn<H> = fn(&H, UsecaseId) -> Option<UsecaseHandle>;

/// Named host capabilities, in resolution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    EnableSndDevice,
    EnableAudioRoute,
    DisableSndDevice,
    DisableAudioRoute,
    GetPcmDeviceId,
    GetUsecaseFromList,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::EnableSndDevice,
        Capability::EnableAudioRoute,
        Capability::DisableSndDevice,
        Capability::DisableAudioRoute,
        Capability::GetPcmDeviceId,
        Capability::GetUsecaseFromList,
    ];

    /// Symbol name the host exports this capability under
    pub fn symbol(self) -> &'static str {
        match self {
            Capability::EnableSndDevice => "enable_snd_device",
            Capability::EnableAudioRoute => "enable_audio_route",
            Capability::DisableSndDevice => "disable_snd_device",
            Capability::DisableAudioRoute => "disable_audio_route",
            Capability::GetPcmDeviceId => "platform_get_pcm_device_id",
            Capability::GetUsecaseFromList => "get_usecase_from_list",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Source of host capabilities
///
/// Every method defaults to "not exported" so a provider only names what
/// the host really has.
pub trait CapabilityProvider<H> {
    fn enable_snd_device(&self) -> Option<SndDeviceFn<H>> {
        None
    }

    fn enable_audio_route(&self) -> Option<AudioRouteFn<H>> {
        None
    }

    fn disable_snd_device(&self) -> Option<SndDeviceFn<H>> {
        None
    }

    fn disable_audio_route(&self) -> Option<AudioRouteFn<H>> {
        None
    }

    fn get_pcm_device_id(&self) -> Option<PcmDeviceIdFn<H>> {
        None
    }

    fn get_usecase_from_list(&self) -> Option<FindUsecaseFn<H>> {
        None
    }
}

/// Fully resolved host capabilities. Immutable once built.
pub struct HostSymbols<H> {
    pub enable_snd_device: SndDeviceFn<H>,
    pub enable_audio_route: AudioRouteFn<H>,
    pub disable_snd_device: SndDeviceFn<H>,
    pub disable_audio_route: AudioRouteFn<H>,
    pub get_pcm_device_id: PcmDeviceIdFn<H>,
    pub get_usecase_from_list: FindUsecaseFn<H>,
}

// Manual impls: fn pointers are Copy for every H, derive would demand H: Clone.
impl<H> Clone for HostSymbols<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for HostSymbols<H> {}

impl<H> fmt::Debug for HostSymbols<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSymbols").finish_non_exhaustive()
    }
}

fn require<T>(found: Option<T>, capability: Capability) -> Result<T, PlatformError> {
    match found {
        Some(symbol) => {
            debug!("Resolved host capability {}", capability);
            Ok(symbol)
        }
        None => {
            warn!("{} not found in host", capability);
            Err(PlatformError::CapabilityMissing(capability))
        }
    }
}

impl<H> HostSymbols<H> {
    /// Resolve all six capabilities, stopping at the first one missing
    pub fn resolve<P>(provider: &P) -> Result<Self, PlatformError>
    where
        P: CapabilityProvider<H> + ?Sized,
    {
        Ok(Self {
            enable_snd_device: require(provider.enable_snd_device(), Capability::EnableSndDevice)?,
            enable_audio_route: require(
                provider.enable_audio_route(),
                Capability::EnableAudioRoute,
            )?,
            disable_snd_device: require(
                provider.disable_snd_device(),
                Capability::DisableSndDevice,
            )?,
            disable_audio_route: require(
                provider.disable_audio_route(),
                Capability::DisableAudioRoute,
            )?,
            get_pcm_device_id: require(provider.get_pcm_device_id(), Capability::GetPcmDeviceId)?,
            get_usecase_from_list: require(
                provider.get_usecase_from_list(),
                Capability::GetUsecaseFromList,
            )?,
        })
    }
}
