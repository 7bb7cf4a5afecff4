//! Usecase Records and Registry
//!
//! A usecase bundles an active audio path (direction, devices, routing).
//! The host keeps every active usecase in one shared list; modules insert
//! their own records into it and must remove exactly what they inserted.
//!
//! The registry hands out [`UsecaseHandle`]s that stay valid until the
//! node is removed and are never reused, so a stale handle can only miss.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;
use crate::snd_device::SndDevice;

/// Host usecase identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UsecaseId {
    DeepBufferPlayback,
    LowLatencyPlayback,
    AudioRecord,
    VoiceCall,
    /// Speaker calibration / protection feedback capture
    SpeakerCalibrationTx,
}

/// Direction of the pcm stream backing a usecase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PcmDirection {
    Playback,
    Capture,
}

/// One entry in the host usecase list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usecase {
    pub id: UsecaseId,

    pub direction: PcmDirection,

    /// Input endpoint for capture usecases
    pub in_snd_device: SndDevice,

    /// Output endpoint for playback usecases
    pub out_snd_device: SndDevice,

    /// Devices attached to this usecase (empty for feedback capture)
    pub devices: Vec<SndDevice>,
}

impl Usecase {
    /// The amplifier's voltage/current feedback capture usecase
    pub fn speaker_calibration_tx() -> Self {
        Self {
            id: UsecaseId::SpeakerCalibrationTx,
            direction: PcmDirection::Capture,
            in_snd_device: SndDevice::CaptureViFeedback,
            out_snd_device: SndDevice::None,
            devices: Vec::new(),
        }
    }

    /// A playback usecase routed to `device`
    pub fn playback(id: UsecaseId, device: SndDevice) -> Self {
        Self {
            id,
            direction: PcmDirection::Playback,
            in_snd_device: SndDevice::None,
            out_snd_device: device,
            devices: vec![device],
        }
    }
}

/// Stable reference to a node in a [`UsecaseList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsecaseHandle(u64);

impl UsecaseHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Host-owned list of active usecases, most recent head-inserts first
#[derive(Debug, Default)]
pub struct UsecaseList {
    nodes: VecDeque<(UsecaseHandle, Usecase)>,
    next_handle: u64,
    capacity: Option<usize>,
}

impl UsecaseList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list that refuses to link more than `capacity` records
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    /// Link a record at the head of the list
    ///
    /// Fails with [`PlatformError::OutOfMemory`] if the list cannot grow;
    /// the record is dropped and the list is unchanged.
    pub fn insert_head(&mut self, usecase: Usecase) -> Result<UsecaseHandle, PlatformError> {
        self.reserve()?;
        let handle = self.allocate_handle();
        self.nodes.push_front((handle, usecase));
        Ok(handle)
    }

    /// Link a record at the tail of the list (host-side playback usecases)
    pub fn insert_tail(&mut self, usecase: Usecase) -> Result<UsecaseHandle, PlatformError> {
        self.reserve()?;
        let handle = self.allocate_handle();
        self.nodes.push_back((handle, usecase));
        Ok(handle)
    }

    /// Unlink exactly the node behind `handle`
    pub fn remove(&mut self, handle: UsecaseHandle) -> Option<Usecase> {
        let index = self.nodes.iter().position(|(h, _)| *h == handle)?;
        self.nodes.remove(index).map(|(_, usecase)| usecase)
    }

    /// First node (from the head) with the given id
    pub fn find_by_id(&self, id: UsecaseId) -> Option<UsecaseHandle> {
        self.nodes
            .iter()
            .find(|(_, usecase)| usecase.id == id)
            .map(|(handle, _)| *handle)
    }

    pub fn get(&self, handle: UsecaseHandle) -> Option<&Usecase> {
        self.nodes
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, usecase)| usecase)
    }

    pub fn contains(&self, handle: UsecaseHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UsecaseHandle, &Usecase)> {
        self.nodes.iter().map(|(handle, usecase)| (*handle, usecase))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn reserve(&mut self) -> Result<(), PlatformError> {
        if self.capacity.is_some_and(|capacity| self.nodes.len() >= capacity) {
            return Err(PlatformError::OutOfMemory);
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| PlatformError::OutOfMemory)
    }

    fn allocate_handle(&mut self) -> UsecaseHandle {
        let handle = UsecaseHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}
