//! Host and Transport Traits
//!
//! Defines what the amplifier module needs from the audio host it is loaded
//! into and from the pcm capture transport.

use crate::error::PlatformError;
use crate::pcm::PcmConfig;
use crate::usecase::{PcmDirection, UsecaseList};

/// The host's audio device context
///
/// Borrowed for the duration of a single call; the module never stores it.
pub trait HostContext {
    /// Sound card that hardware pcm devices are opened on
    fn snd_card(&self) -> u32;

    /// The host's shared usecase list
    fn usecases(&self) -> &UsecaseList;

    fn usecases_mut(&mut self) -> &mut UsecaseList;
}

/// An opened pcm stream
///
/// Opening never fails outright; a stream that could not be set up reports
/// `is_ready() == false` and carries the transport's error message.
pub trait PcmStream {
    fn is_ready(&self) -> bool;

    /// Last transport error, if any
    fn error_message(&self) -> String;

    /// Start the stream
    fn start(&mut self) -> Result<(), PlatformError>;

    /// Close the stream and release the hardware
    fn close(self);
}

/// Capture transport that opens hardware pcm devices
pub trait PcmBackend {
    type Stream: PcmStream;

    /// Open `device` on `card`. Blocks until the transport answers.
    fn open(
        &mut self,
        card: u32,
        device: u32,
        direction: PcmDirection,
        config: &PcmConfig,
    ) -> Self::Stream;
}
