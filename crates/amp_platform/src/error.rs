//! Platform Error Types

use thiserror::Error;

use crate::symbols::Capability;

/// Errors from the host audio framework and the capture transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Host capability not found: {0}")]
    CapabilityMissing(Capability),

    #[error("Out of memory while registering usecase")]
    OutOfMemory,

    #[error("Failed to apply audio route: {0}")]
    RouteFailed(String),

    #[error("Capture stream failed to start: {0}")]
    StreamStartFailed(String),
}
