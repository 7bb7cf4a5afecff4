//! Feedback Usecase Controller
//!
//! Owns the lifecycle of the amplifier's voltage/current feedback capture.
//!
//! # Start
//!
//! ```text
//! insert usecase at list head
//!   → enable_snd_device(CaptureViFeedback) → enable_audio_route(usecase)
//!   → platform_get_pcm_device_id → open capture → start capture
//! ```
//!
//! Any failure after the usecase is linked unwinds in reverse: close the
//! stream, unlink the usecase, disable the sound device, disable the route.
//! The host is left exactly as it was before the call.
//!
//! # Stop
//!
//! Stop follows the *current* device set, not the one start ran for. The
//! usecase is looked up again by id in the host list instead of trusting
//! the handle from start, since the host may have reshuffled the list.

use amp_platform::{
    HostContext, HostSymbols, PcmBackend, PcmConfig, PcmStream, SndDevice, Usecase,
    UsecaseHandle, UsecaseId,
};
use tracing::{debug, error, info, warn};

use crate::error::{AmpError, AmpResult};


/// Start/stop state machine for the feedback capture usecase
///
/// Not synchronized: callers serialize `start`/`stop` (see
/// [`SharedAmpDevice`](crate::SharedAmpDevice) for hosts that cannot).
pub struct FeedbackController<H, P: PcmBackend> {
    symbols: HostSymbols<H>,
    pcm: P,
    capture: PcmConfig,

    /// Usecase linked by the last successful start
    usecase: Option<UsecaseHandle>,

    /// Running capture stream; present iff `usecase` is
    stream: Option<P::Stream>,

    pcm_device: Option<u32>,
}

impl<H: HostContext, P: PcmBackend> FeedbackController<H, P> {
    pub fn new(symbols: HostSymbols<H>, pcm: P, capture: PcmConfig) -> Self {
        Self {
            symbols,
            pcm,
            capture,
            usecase: None,
            stream: None,
            pcm_device: None,
        }
    }

    /// Whether the feedback capture is running
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Handle of the usecase linked by the last successful start
    pub fn usecase(&self) -> Option<UsecaseHandle> {
        self.usecase
    }

    /// Hardware pcm device the capture runs on
    pub fn pcm_device(&self) -> Option<u32> {
        self.pcm_device
    }

    pub fn capture_config(&self) -> &PcmConfig {
        &self.capture
    }

    /// Start the feedback capture for `devices`
    ///
    /// No-op if the capture is already running or `devices` is not a
    /// speaker route.
    pub fn start(&mut self, host: &mut H, devices: SndDevice) -> AmpResult<()> {
        if self.stream.is_some() || !devices.is_speaker() {
            debug!(
                "Feedback start skipped for {} (active: {})",
                devices,
                self.is_active()
            );
            return Ok(());
        }

        let usecase = Usecase::speaker_calibration_tx();
        let handle = host
            .usecases_mut()
            .insert_head(usecase.clone())
            .map_err(|e| {
                error!("Failed to allocate feedback usecase: {}", e);
                AmpError::from(e)
            })?;

        if let Err(e) = (self.symbols.enable_snd_device)(host, usecase.in_snd_device) {
            warn!("enable_snd_device({}) failed: {}", usecase.in_snd_device, e);
        }
        if let Err(e) = (self.symbols.enable_audio_route)(host, &usecase) {
            warn!("enable_audio_route({:?}) failed: {}", usecase.id, e);
        }

        match self.open_capture(host, &usecase) {
            Ok((stream, pcm_device)) => {
                info!(
                    "Feedback capture started for {} on pcm {}:{}",
                    devices,
                    host.snd_card(),
                    pcm_device
                );
                self.usecase = Some(handle);
                self.stream = Some(stream);
                self.pcm_device = Some(pcm_device);
                Ok(())
            }
            Err(e) => {
                error!("Feedback start failed for {}: {}", devices, e);
                self.unlink(host, handle, usecase);
                Err(e)
            }
        }
    }

    /// Stop the feedback capture for `devices`
    ///
    /// Safe to call when nothing was started. Non-speaker routes are ignored.
    pub fn stop(&mut self, host: &mut H, devices: SndDevice) {
        if !devices.is_speaker() {
            debug!("Feedback stop skipped for {}", devices);
            return;
        }

        if let Some(stream) = self.stream.take() {
            stream.close();
        }
        self.pcm_device = None;

        if let Err(e) = (self.symbols.disable_snd_device)(host, SndDevice::CaptureViFeedback) {
            warn!("disable_snd_device({}) failed: {}", SndDevice::CaptureViFeedback, e);
        }

        self.usecase = None;
        let Some(handle) =
            (self.symbols.get_usecase_from_list)(host, UsecaseId::SpeakerCalibrationTx)
        else {
            debug!("No feedback usecase registered, nothing to unlink");
            return;
        };

        if let Some(usecase) = host.usecases_mut().remove(handle) {
            if let Err(e) = (self.symbols.disable_audio_route)(host, &usecase) {
                warn!("disable_audio_route({:?}) failed: {}", usecase.id, e);
            }
        }
        info!("Feedback capture stopped for {}", devices);
    }

    /// Resolve the pcm device, then open and start the capture stream.
    /// The stream is closed again on every error path.
    fn open_capture(&mut self, host: &H, usecase: &Usecase) -> AmpResult<(P::Stream, u32)> {
        let raw_id = (self.symbols.get_pcm_device_id)(host, usecase.id, usecase.direction);
        debug!("pcm device for {:?} = {}", usecase.id, raw_id);
        let pcm_device = u32::try_from(raw_id).map_err(|_| {
            AmpError::NoSuchDevice(format!("no pcm device for usecase {:?}", usecase.id))
        })?;

        let mut stream = self.pcm.open(
            host.snd_card(),
            pcm_device,
            usecase.direction,
            &self.capture,
        );
        if !stream.is_ready() {
            let message = stream.error_message();
            stream.close();
            return Err(AmpError::Io(message));
        }

        if let Err(e) = stream.start() {
            stream.close();
            return Err(AmpError::InvalidState(e.to_string()));
        }

        Ok((stream, pcm_device))
    }

    /// Reverse a partial start: unlink, then disable device and route
    fn unlink(&mut self, host: &mut H, handle: UsecaseHandle, usecase: Usecase) {
        let usecase = host.usecases_mut().remove(handle).unwrap_or(usecase);

        if let Err(e) = (self.symbols.disable_snd_device)(host, usecase.in_snd_device) {
            warn!("disable_snd_device({}) failed: {}", usecase.in_snd_device, e);
        }
        if let Err(e) = (self.symbols.disable_audio_route)(host, &usecase) {
            warn!("disable_audio_route({:?}) failed: {}", usecase.id, e);
        }
        self.usecase = None;
    }
}
