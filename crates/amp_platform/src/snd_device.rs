//! Sound Devices
//!
//! Host routing endpoints. Output devices describe where playback is going;
//! the amplifier only cares whether that set includes the speaker.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Host sound device (routing endpoint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SndDevice {
    None,

    // Output devices
    Earpiece,
    Speaker,
    SpeakerReverse,
    SpeakerSafe,
    Headphones,
    WiredHeadset,
    SpeakerAndHeadphones,
    VoiceSpeaker,
    VoiceSpeaker2,
    VoiceHeadphones,
    Hdmi,
    SpeakerAndHdmi,
    UsbHeadset,
    SpeakerAndUsbHeadset,
    AncHeadset,
    SpeakerAndAncHeadset,
    BtSco,

    // Input devices
    HandsetMic,
    /// Voltage/current sense capture from the smart amplifier
    CaptureViFeedback,
}

impl SndDevice {
    /// Every known device, outputs first
    pub const ALL: [SndDevice; 20] = [
        SndDevice::None,
        SndDevice::Earpiece,
        SndDevice::Speaker,
        SndDevice::SpeakerReverse,
        SndDevice::SpeakerSafe,
        SndDevice::Headphones,
        SndDevice::WiredHeadset,
        SndDevice::SpeakerAndHeadphones,
        SndDevice::VoiceSpeaker,
        SndDevice::VoiceSpeaker2,
        SndDevice::VoiceHeadphones,
        SndDevice::Hdmi,
        SndDevice::SpeakerAndHdmi,
        SndDevice::UsbHeadset,
        SndDevice::SpeakerAndUsbHeadset,
        SndDevice::AncHeadset,
        SndDevice::SpeakerAndAncHeadset,
        SndDevice::BtSco,
        SndDevice::HandsetMic,
        SndDevice::CaptureViFeedback,
    ];

    /// Whether this device set drives the amplifier's speaker.
    ///
    /// Gates both starting and stopping the feedback capture. Speaker-safe
    /// is not a speaker route here.
    pub fn is_speaker(self) -> bool {
        matches!(
            self,
            SndDevice::Speaker
                | SndDevice::SpeakerReverse
                | SndDevice::SpeakerAndHeadphones
                | SndDevice::VoiceSpeaker
                | SndDevice::VoiceSpeaker2
                | SndDevice::SpeakerAndHdmi
                | SndDevice::SpeakerAndUsbHeadset
                | SndDevice::SpeakerAndAncHeadset
        )
    }

    pub fn is_input(self) -> bool {
        matches!(self, SndDevice::HandsetMic | SndDevice::CaptureViFeedback)
    }

    /// Stable kebab-case name (matches the serde representation)
    pub fn name(self) -> &'static str {
        match self {
            SndDevice::None => "none",
            SndDevice::Earpiece => "earpiece",
            SndDevice::Speaker => "speaker",
            SndDevice::SpeakerReverse => "speaker-reverse",
            SndDevice::SpeakerSafe => "speaker-safe",
            SndDevice::Headphones => "headphones",
            SndDevice::WiredHeadset => "wired-headset",
            SndDevice::SpeakerAndHeadphones => "speaker-and-headphones",
            SndDevice::VoiceSpeaker => "voice-speaker",
            SndDevice::VoiceSpeaker2 => "voice-speaker2",
            SndDevice::VoiceHeadphones => "voice-headphones",
            SndDevice::Hdmi => "hdmi",
            SndDevice::SpeakerAndHdmi => "speaker-and-hdmi",
            SndDevice::UsbHeadset => "usb-headset",
            SndDevice::SpeakerAndUsbHeadset => "speaker-and-usb-headset",
            SndDevice::AncHeadset => "anc-headset",
            SndDevice::SpeakerAndAncHeadset => "speaker-and-anc-headset",
            SndDevice::BtSco => "bt-sco",
            SndDevice::HandsetMic => "handset-mic",
            SndDevice::CaptureViFeedback => "capture-vi-feedback",
        }
    }
}

impl fmt::Display for SndDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SndDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SndDevice::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("Unknown sound device: {}", s))
    }
}
