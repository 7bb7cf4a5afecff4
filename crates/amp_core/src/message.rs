//! Feedback Events
//!
//! Sent from the device to whoever attached a receiver (daemon, simulator).
//! Nothing in the module waits on them.

use amp_platform::SndDevice;
use serde::{Deserialize, Serialize};

/// Events emitted when the feedback capture changes state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum FeedbackEvent {
    /// Capture running on the given pcm device
    Started { devices: SndDevice, pcm_device: u32 },

    /// Capture torn down for a speaker route
    Stopped { devices: SndDevice },

    /// Start failed and was fully unwound
    StartFailed {
        devices: SndDevice,
        errno: i32,
        message: String,
    },
}
