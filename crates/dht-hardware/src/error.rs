//! Error types for hardware operations.
//!
//! Two families live here. [`HardwareError`] covers failures of the hardware
//! subsystem itself (bring-up, I/O). [`TransactionError`]
//! covers a single failed sensor transaction; those are expected on a
//! single-wire bus and are retried by the caller rather than surfaced.

use dht_core::{GpioPin, Measurement};

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur while preparing or talking to the hardware subsystem.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Hardware subsystem bring-up failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }
}

/// A single failed transaction on the sensor bus.
///
/// Some failures still decode a frame (a checksum mismatch means all 40 bits
/// arrived but disagree); those carry the decoded values as a best-effort
/// reading, available through [`TransactionError::partial_reading`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransactionError {
    /// The sensor never answered the start signal.
    #[error("No response from sensor on {pin}")]
    NoResponse { pin: GpioPin },

    /// A pulse arrived outside its allowed window.
    #[error("Timing violation during {phase} after {elapsed_us}us")]
    Timing { phase: String, elapsed_us: u32 },

    /// The frame checksum did not match the data bytes.
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        expected: u8,
        actual: u8,
        decoded: Measurement,
    },
}

impl TransactionError {
    /// Create a new no-response error.
    pub fn no_response(pin: GpioPin) -> Self {
        Self::NoResponse { pin }
    }

    /// Create a new timing violation error.
    pub fn timing(phase: impl Into<String>, elapsed_us: u32) -> Self {
        Self::Timing {
            phase: phase.into(),
            elapsed_us,
        }
    }

    /// Create a new checksum mismatch error carrying the decoded values.
    pub fn checksum_mismatch(expected: u8, actual: u8, decoded: Measurement) -> Self {
        Self::ChecksumMismatch {
            expected,
            actual,
            decoded,
        }
    }

    /// Values decoded before the failure was detected, if any.
    pub fn partial_reading(&self) -> Option<Measurement> {
        match self {
            Self::ChecksumMismatch { decoded, .. } => Some(*decoded),
            _ => None,
        }
    }
}
