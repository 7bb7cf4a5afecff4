//! Amplifier Error Types

use amp_platform::PlatformError;
use thiserror::Error;

/// Errors that can occur while opening the module or toggling feedback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmpError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Out of memory")]
    OutOfMemory,

    #[error("No such device: {0}")]
    NoSuchDevice(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl AmpError {
    /// Negative errno reported to the host for this error
    pub fn errno(&self) -> i32 {
        let code = match self {
            AmpError::InvalidArgument(_) => libc::EINVAL,
            AmpError::OutOfMemory => libc::ENOMEM,
            AmpError::NoSuchDevice(_) => libc::ENODEV,
            AmpError::Io(_) => libc::EIO,
            // The host reports a failed stream start as EINVAL
            AmpError::InvalidState(_) => libc::EINVAL,
        };
        -code
    }
}

impl From<PlatformError> for AmpError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::CapabilityMissing(_) => AmpError::NoSuchDevice(err.to_string()),
            PlatformError::OutOfMemory => AmpError::OutOfMemory,
            PlatformError::StreamStartFailed(msg) => AmpError::InvalidState(msg),
            PlatformError::RouteFailed(_) => AmpError::Io(err.to_string()),
        }
    }
}

/// Result type alias for amplifier operations
pub type AmpResult<T> = Result<T, AmpError>;
