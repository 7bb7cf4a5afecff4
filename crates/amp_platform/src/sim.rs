//! In-Process Simulated Host
//!
//! A host audio framework and capture transport that live entirely in
//! memory. [`SimHost`] records every capability call in order and keeps a
//! real [`UsecaseList`]; [`SimPcm`] counts opens, starts and closes and can
//! be told to fail. Used by the tests, the benchmark and the simulator.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::PlatformError;
use crate::pcm::PcmConfig;
use crate::snd_device::SndDevice;
use crate::symbols::{
    AudioRouteFn, Capability, CapabilityProvider, FindUsecaseFn, PcmDeviceIdFn, SndDeviceFn,
};
use crate::traits::{HostContext, PcmBackend, PcmStream};
use crate::usecase::{PcmDirection, Usecase, UsecaseHandle, UsecaseId, UsecaseList};

/// pcm device the simulated platform maps the feedback usecase to
pub const SIM_FEEDBACK_PCM_DEVICE: i32 = 9;

/// One capability invocation seen by the simulated host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    EnableSndDevice(SndDevice),
    EnableAudioRoute(UsecaseId),
    DisableSndDevice(SndDevice),
    DisableAudioRoute(UsecaseId),
    GetPcmDeviceId(UsecaseId, PcmDirection),
    GetUsecaseFromList(UsecaseId),
}

/// Simulated host audio device context
#[derive(Debug)]
pub struct SimHost {
    snd_card: u32,
    usecases: UsecaseList,
    calls: Mutex<Vec<HostCall>>,
    active_devices: HashSet<SndDevice>,
    active_routes: Vec<UsecaseId>,
    pcm_devices: HashMap<(UsecaseId, PcmDirection), i32>,
}

impl SimHost {
    pub fn new(snd_card: u32) -> Self {
        let mut pcm_devices = HashMap::new();
        pcm_devices.insert((UsecaseId::DeepBufferPlayback, PcmDirection::Playback), 0);
        pcm_devices.insert((UsecaseId::LowLatencyPlayback, PcmDirection::Playback), 1);
        pcm_devices.insert((UsecaseId::AudioRecord, PcmDirection::Capture), 0);
        pcm_devices.insert(
            (UsecaseId::SpeakerCalibrationTx, PcmDirection::Capture),
            SIM_FEEDBACK_PCM_DEVICE,
        );

        Self {
            snd_card,
            usecases: UsecaseList::new(),
            calls: Mutex::new(Vec::new()),
            active_devices: HashSet::new(),
            active_routes: Vec::new(),
            pcm_devices,
        }
    }

    /// A host whose usecase list cannot link more than `capacity` records
    pub fn with_usecase_capacity(snd_card: u32, capacity: usize) -> Self {
        Self {
            usecases: UsecaseList::with_capacity_limit(capacity),
            ..Self::new(snd_card)
        }
    }

    /// Override (or remove, with `None`) the pcm mapping of a usecase
    pub fn set_pcm_device(&mut self, id: UsecaseId, direction: PcmDirection, device: Option<i32>) {
        match device {
            Some(device) => {
                self.pcm_devices.insert((id, direction), device);
            }
            None => {
                self.pcm_devices.remove(&(id, direction));
            }
        }
    }

    /// Capability calls in the order they happened
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn is_device_active(&self, device: SndDevice) -> bool {
        self.active_devices.contains(&device)
    }

    pub fn active_routes(&self) -> &[UsecaseId] {
        &self.active_routes
    }

    fn record(&self, call: HostCall) {
        self.calls.lock().push(call);
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HostContext for SimHost {
    fn snd_card(&self) -> u32 {
        self.snd_card
    }

    fn usecases(&self) -> &UsecaseList {
        &self.usecases
    }

    fn usecases_mut(&mut self) -> &mut UsecaseList {
        &mut self.usecases
    }
}

fn enable_snd_device(host: &mut SimHost, device: SndDevice) -> Result<(), PlatformError> {
    host.record(HostCall::EnableSndDevice(device));
    host.active_devices.insert(device);
    Ok(())
}

fn disable_snd_device(host: &mut SimHost, device: SndDevice) -> Result<(), PlatformError> {
    host.record(HostCall::DisableSndDevice(device));
    host.active_devices.remove(&device);
    Ok(())
}

fn enable_audio_route(host: &mut SimHost, usecase: &Usecase) -> Result<(), PlatformError> {
    host.record(HostCall::EnableAudioRoute(usecase.id));
    host.active_routes.push(usecase.id);
    Ok(())
}

fn disable_audio_route(host: &mut SimHost, usecase: &Usecase) -> Result<(), PlatformError> {
    host.record(HostCall::DisableAudioRoute(usecase.id));
    match host.active_routes.iter().position(|id| *id == usecase.id) {
        Some(index) => {
            host.active_routes.remove(index);
            Ok(())
        }
        None => Err(PlatformError::RouteFailed(format!(
            "{:?} has no active route",
            usecase.id
        ))),
    }
}

fn get_pcm_device_id(host: &SimHost, id: UsecaseId, direction: PcmDirection) -> i32 {
    host.record(HostCall::GetPcmDeviceId(id, direction));
    host.pcm_devices.get(&(id, direction)).copied().unwrap_or(-1)
}

fn get_usecase_from_list(host: &SimHost, id: UsecaseId) -> Option<UsecaseHandle> {
    host.record(HostCall::GetUsecaseFromList(id));
    host.usecases.find_by_id(id)
}

/// Capability provider backed by [`SimHost`], optionally hiding one entry
#[derive(Debug, Clone, Copy, Default)]
pub struct SimCapabilities {
    missing: Option<Capability>,
}

impl SimCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that does not export `capability`
    pub fn without(capability: Capability) -> Self {
        Self {
            missing: Some(capability),
        }
    }

    fn exports(&self, capability: Capability) -> bool {
        self.missing != Some(capability)
    }
}

impl CapabilityProvider<SimHost> for SimCapabilities {
    fn enable_snd_device(&self) -> Option<SndDeviceFn<SimHost>> {
        self.exports(Capability::EnableSndDevice)
            .then_some(enable_snd_device as SndDeviceFn<SimHost>)
    }

    fn enable_audio_route(&self) -> Option<AudioRouteFn<SimHost>> {
        self.exports(Capability::EnableAudioRoute)
            .then_some(enable_audio_route as AudioRouteFn<SimHost>)
    }

    fn disable_snd_device(&self) -> Option<SndDeviceFn<SimHost>> {
        self.exports(Capability::DisableSndDevice)
            .then_some(disable_snd_device as SndDeviceFn<SimHost>)
    }

    fn disable_audio_route(&self) -> Option<AudioRouteFn<SimHost>> {
        self.exports(Capability::DisableAudioRoute)
            .then_some(disable_audio_route as AudioRouteFn<SimHost>)
    }

    fn get_pcm_device_id(&self) -> Option<PcmDeviceIdFn<SimHost>> {
        self.exports(Capability::GetPcmDeviceId)
            .then_some(get_pcm_device_id as PcmDeviceIdFn<SimHost>)
    }

    fn get_usecase_from_list(&self) -> Option<FindUsecaseFn<SimHost>> {
        self.exports(Capability::GetUsecaseFromList)
            .then_some(get_usecase_from_list as FindUsecaseFn<SimHost>)
    }
}

/// How the simulated transport should misbehave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimPcmFailure {
    #[default]
    None,
    /// Streams open but never become ready
    NotReady,
    /// Streams open ready but refuse to start
    Start,
}

/// Parameters of one `open` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPcmOpen {
    pub card: u32,
    pub device: u32,
    pub direction: PcmDirection,
    pub config: PcmConfig,
}

/// Counters shared between [`SimPcm`], its streams and the test
#[derive(Debug, Default)]
pub struct SimPcmState {
    pub failure: SimPcmFailure,
    pub opens: Vec<SimPcmOpen>,
    pub starts: usize,
    pub closes: usize,
    /// Streams opened and not yet released
    pub live: usize,
}

/// Simulated pcm capture transport
#[derive(Debug, Clone, Default)]
pub struct SimPcm {
    state: Arc<Mutex<SimPcmState>>,
}

impl SimPcm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(failure: SimPcmFailure) -> Self {
        let pcm = Self::new();
        pcm.set_failure(failure);
        pcm
    }

    pub fn set_failure(&self, failure: SimPcmFailure) {
        self.state.lock().failure = failure;
    }

    /// Shared counters; stays valid after the backend is moved away
    pub fn state(&self) -> Arc<Mutex<SimPcmState>> {
        Arc::clone(&self.state)
    }
}

impl PcmBackend for SimPcm {
    type Stream = SimPcmStream;

    fn open(
        &mut self,
        card: u32,
        device: u32,
        direction: PcmDirection,
        config: &PcmConfig,
    ) -> SimPcmStream {
        let failure = {
            let mut state = self.state.lock();
            state.opens.push(SimPcmOpen {
                card,
                device,
                direction,
                config: config.clone(),
            });
            state.live += 1;
            state.failure
        };

        SimPcmStream {
            state: Arc::clone(&self.state),
            ready: failure != SimPcmFailure::NotReady,
            refuse_start: failure == SimPcmFailure::Start,
            device,
        }
    }
}

/// Stream handed out by [`SimPcm`]
#[derive(Debug)]
pub struct SimPcmStream {
    state: Arc<Mutex<SimPcmState>>,
    ready: bool,
    refuse_start: bool,
    device: u32,
}

impl PcmStream for SimPcmStream {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn error_message(&self) -> String {
        if self.ready {
            String::new()
        } else {
            format!("cannot open device {} for capture", self.device)
        }
    }

    fn start(&mut self) -> Result<(), PlatformError> {
        if self.refuse_start {
            return Err(PlatformError::StreamStartFailed(format!(
                "device {} refused to start",
                self.device
            )));
        }
        self.state.lock().starts += 1;
        Ok(())
    }

    fn close(self) {
        self.state.lock().closes += 1;
    }
}

impl Drop for SimPcmStream {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.live = state.live.saturating_sub(1);
    }
}
