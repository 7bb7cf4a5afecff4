//! Amplifier Device
//!
//! The handle the host keeps after `open`. Of all the hooks an amplifier
//! device may implement, this module only acts on `set_feedback`; the rest
//! are left at their no-op defaults.

use std::sync::Arc;

use amp_platform::{HostContext, HostSymbols, PcmBackend, SndDevice, UsecaseHandle};
use crossbeam_channel::Sender;
use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AmpConfig;
use crate::controller::FeedbackController;
use crate::error::AmpResult;
use crate::message::FeedbackEvent;
use crate::module::{AmplifierModule, ApiVersion};

/// Host audio mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioMode {
    Normal,
    Ringtone,
    InCall,
    InCommunication,
}

/// Hooks an amplifier device can implement
///
/// Every hook defaults to doing nothing and reporting success, which is how
/// the host treats a hook the device leaves unset.
pub trait AmplifierDevice<H> {
    fn set_input_devices(&mut self, _devices: SndDevice) -> AmpResult<()> {
        Ok(())
    }

    fn set_output_devices(&mut self, _devices: SndDevice) -> AmpResult<()> {
        Ok(())
    }

    fn enable_input_devices(&mut self, _devices: SndDevice, _enable: bool) -> AmpResult<()> {
        Ok(())
    }

    fn enable_output_devices(&mut self, _devices: SndDevice, _enable: bool) -> AmpResult<()> {
        Ok(())
    }

    fn set_mode(&mut self, _mode: AudioMode) -> AmpResult<()> {
        Ok(())
    }

    fn output_stream_start(&mut self, _offload: bool) -> AmpResult<()> {
        Ok(())
    }

    fn input_stream_start(&mut self) -> AmpResult<()> {
        Ok(())
    }

    fn output_stream_standby(&mut self) -> AmpResult<()> {
        Ok(())
    }

    fn input_stream_standby(&mut self) -> AmpResult<()> {
        Ok(())
    }

    fn set_parameters(&mut self, _kv_pairs: &str) -> AmpResult<()> {
        Ok(())
    }

    fn out_set_parameters(&mut self, _kv_pairs: &str) -> AmpResult<()> {
        Ok(())
    }

    fn in_set_parameters(&mut self, _kv_pairs: &str) -> AmpResult<()> {
        Ok(())
    }

    /// Speaker route transition: enable or disable the feedback loop
    fn set_feedback(&mut self, _host: &mut H, _devices: SndDevice, _enable: bool) -> AmpResult<()> {
        Ok(())
    }
}

/// Smart amplifier device with speaker feedback capture
pub struct AmpDevice<H, P: PcmBackend> {
    module: &'static AmplifierModule,
    controller: FeedbackController<H, P>,
    events: Option<Sender<FeedbackEvent>>,
}

impl<H: HostContext, P: PcmBackend> AmpDevice<H, P> {
    pub(crate) fn new(
        module: &'static AmplifierModule,
        symbols: HostSymbols<H>,
        pcm: P,
        config: &AmpConfig,
    ) -> Self {
        Self {
            module,
            controller: FeedbackController::new(symbols, pcm, config.capture.clone()),
            events: None,
        }
    }

    /// Module that opened this device
    pub fn module(&self) -> &'static AmplifierModule {
        self.module
    }

    pub fn version(&self) -> ApiVersion {
        self.module.device_api_version
    }

    /// Receive a [`FeedbackEvent`] for every start, stop and failed start
    pub fn set_event_sender(&mut self, sender: Sender<FeedbackEvent>) {
        self.events = Some(sender);
    }

    pub fn is_feedback_active(&self) -> bool {
        self.controller.is_active()
    }

    pub fn feedback_usecase(&self) -> Option<UsecaseHandle> {
        self.controller.usecase()
    }

    pub fn pcm_device(&self) -> Option<u32> {
        self.controller.pcm_device()
    }

    /// Start the feedback capture, reporting failures to the caller
    pub fn start_feedback(&mut self, host: &mut H, devices: SndDevice) -> AmpResult<()> {
        let was_active = self.controller.is_active();
        let result = self.controller.start(host, devices);

        match &result {
            Ok(()) => {
                if let (false, Some(pcm_device)) = (was_active, self.controller.pcm_device()) {
                    self.emit(FeedbackEvent::Started {
                        devices,
                        pcm_device,
                    });
                }
            }
            Err(e) => self.emit(FeedbackEvent::StartFailed {
                devices,
                errno: e.errno(),
                message: e.to_string(),
            }),
        }
        result
    }

    /// Stop the feedback capture
    pub fn stop_feedback(&mut self, host: &mut H, devices: SndDevice) {
        let was_active = self.controller.is_active();
        self.controller.stop(host, devices);
        if was_active && !self.controller.is_active() {
            self.emit(FeedbackEvent::Stopped { devices });
        }
    }

    /// Release the device
    ///
    /// Feedback must already be stopped; a capture still running is dropped
    /// without notifying the host.
    pub fn close(self) {
        if self.controller.is_active() {
            warn!("Closing amplifier device with feedback capture still running");
        }
        debug!("Amplifier device closed");
    }

    fn emit(&self, event: FeedbackEvent) {
        if let Some(sender) = &self.events {
            // Receiver gone is fine: events are advisory
            let _ = sender.send(event);
        }
    }
}

impl<H: HostContext, P: PcmBackend> AmplifierDevice<H> for AmpDevice<H, P> {
    /// Always succeeds: failures are logged and unwound, the host does not
    /// branch on this hook's result.
    fn set_feedback(&mut self, host: &mut H, devices: SndDevice, enable: bool) -> AmpResult<()> {
        if enable {
            let _ = self.start_feedback(host, devices);
        } else {
            self.stop_feedback(host, devices);
        }
        Ok(())
    }
}

/// [`AmpDevice`] behind a mutex, for hosts that do not serialize calls
pub struct SharedAmpDevice<H, P: PcmBackend> {
    inner: Arc<Mutex<AmpDevice<H, P>>>,
}

impl<H, P: PcmBackend> Clone for SharedAmpDevice<H, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<H: HostContext, P: PcmBackend> SharedAmpDevice<H, P> {
    pub fn new(device: AmpDevice<H, P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Serialized [`AmplifierDevice::set_feedback`]
    pub fn set_feedback(&self, host: &mut H, devices: SndDevice, enable: bool) -> AmpResult<()> {
        self.inner.lock().set_feedback(host, devices, enable)
    }

    pub fn is_feedback_active(&self) -> bool {
        self.inner.lock().is_feedback_active()
    }

    pub fn lock(&self) -> MutexGuard<'_, AmpDevice<H, P>> {
        self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{AMPLIFIER_HARDWARE_INTERFACE, HAL_MODULE_INFO};
    use amp_platform::sim::{SimCapabilities, SimHost, SimPcm, SimPcmFailure};
    use amp_platform::{PcmDirection, UsecaseId};
    use crossbeam_channel::unbounded;

    fn open(pcm: &SimPcm) -> AmpDevice<SimHost, SimPcm> {
        HAL_MODULE_INFO
            .open(
                AMPLIFIER_HARDWARE_INTERFACE,
                &SimCapabilities::new(),
                pcm.clone(),
                &AmpConfig::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_set_feedback_dispatch() {
        let pcm = SimPcm::new();
        let mut device = open(&pcm);
        let mut host = SimHost::default();

        device.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
        assert!(device.is_feedback_active());
        assert!(device.feedback_usecase().is_some());
        assert!(device.pcm_device().is_some());

        device.set_feedback(&mut host, SndDevice::Speaker, false).unwrap();
        assert!(!device.is_feedback_active());
        assert!(device.feedback_usecase().is_none());
        assert!(host.usecases().is_empty());
    }

    #[test]
    fn test_set_feedback_swallows_failures() {
        let pcm = SimPcm::with_failure(SimPcmFailure::NotReady);
        let mut device = open(&pcm);
        let mut host = SimHost::default();

        assert!(device.set_feedback(&mut host, SndDevice::Speaker, true).is_ok());
        assert!(!device.is_feedback_active());
        assert!(host.usecases().is_empty());

        // The direct entry point still reports the failure
        assert!(device.start_feedback(&mut host, SndDevice::Speaker).is_err());
    }

    #[test]
    fn test_events() {
        let pcm = SimPcm::new();
        let mut device = open(&pcm);
        let mut host = SimHost::default();
        let (tx, rx) = unbounded();
        device.set_event_sender(tx);

        device.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
        device.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
        device.set_feedback(&mut host, SndDevice::WiredHeadset, false).unwrap();
        device.set_feedback(&mut host, SndDevice::Speaker, false).unwrap();

        host.set_pcm_device(UsecaseId::SpeakerCalibrationTx, PcmDirection::Capture, None);
        device.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();

        let events: Vec<FeedbackEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[0],
            FeedbackEvent::Started {
                devices: SndDevice::Speaker,
                ..
            }
        ));
        assert_eq!(events[1], FeedbackEvent::Stopped { devices: SndDevice::Speaker });
        match &events[2] {
            FeedbackEvent::StartFailed { errno, .. } => assert_eq!(*errno, -libc::ENODEV),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_stop_without_capture_is_silent() {
        let pcm = SimPcm::with_failure(SimPcmFailure::Start);
        let mut device = open(&pcm);
        let mut host = SimHost::default();
        let (tx, rx) = unbounded();
        device.set_event_sender(tx);

        device.set_feedback(&mut host, SndDevice::Speaker, false).unwrap();
        assert!(rx.try_iter().next().is_none());

        device.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
        device.set_feedback(&mut host, SndDevice::Speaker, false).unwrap();

        let events: Vec<FeedbackEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], FeedbackEvent::StartFailed { .. }));
        // Stop still ran against the host
        assert!(host.usecases().is_empty());
    }

    #[test]
    fn test_dropped_receiver_is_harmless() {
        let pcm = SimPcm::new();
        let mut device = open(&pcm);
        let mut host = SimHost::default();
        let (tx, rx) = unbounded();
        device.set_event_sender(tx);
        drop(rx);

        device.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
        assert!(device.is_feedback_active());
    }

    #[test]
    fn test_unset_hooks_are_noops() {
        let pcm = SimPcm::new();
        let mut device = open(&pcm);

        assert!(device.set_mode(AudioMode::InCall).is_ok());
        assert!(device.set_output_devices(SndDevice::Speaker).is_ok());
        assert!(device.enable_output_devices(SndDevice::Speaker, true).is_ok());
        assert!(device.output_stream_start(false).is_ok());
        assert!(device.set_parameters("spkr_prot=1").is_ok());
        assert!(!device.is_feedback_active());
        assert!(pcm.state().lock().opens.is_empty());
    }

    #[test]
    fn test_close_does_not_touch_host() {
        let pcm = SimPcm::new();
        let mut device = open(&pcm);
        let mut host = SimHost::default();

        device.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
        host.clear_calls();
        device.close();

        assert!(host.calls().is_empty());
        // Usecase stays linked: stopping before close is the host's job
        assert_eq!(host.usecases().len(), 1);
        assert_eq!(pcm.state().lock().live, 0);
    }

    #[test]
    fn test_shared_device_serializes_calls() {
        let pcm = SimPcm::new();
        let shared = SharedAmpDevice::new(open(&pcm));
        let worker = shared.clone();

        let handle = std::thread::spawn(move || {
            let mut host = SimHost::default();
            worker.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
            worker.set_feedback(&mut host, SndDevice::Speaker, true).unwrap();
            host
        });
        let host = handle.join().unwrap();

        assert!(shared.is_feedback_active());
        assert_eq!(host.usecases().len(), 1);
        assert_eq!(pcm.state().lock().opens.len(), 1);
        let head = host.usecases().iter().next().map(|(h, _)| h);
        assert_eq!(shared.lock().feedback_usecase(), head);
    }
}
