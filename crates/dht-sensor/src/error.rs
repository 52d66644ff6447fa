//! Error types for sensor reads.
//!
//! Three outcomes are distinguished:
//!
//! - **Invalid configuration**: unsupported sensor model, out-of-range pin or
//!   malformed options. Reported before any hardware access.
//! - **Initialization failure**: hardware bring-up did not succeed. The next
//!   call re-attempts it.
//! - **Read failure**: every retry was consumed without a valid frame. Only
//!   surfaced on the callback path; blocking reads report it through
//!   [`Readout::is_valid`](crate::Readout::is_valid) instead.

use dht_hardware::HardwareError;

/// Result type alias for sensor reads.
pub type Result<T> = std::result::Result<T, ReadError>;

/// Errors reported to callers of the read service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadError {
    /// Unsupported sensor model, invalid pin or malformed options.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] dht_core::Error),

    /// Hardware bring-up failed; retried on the next call.
    #[error("failed to initialize sensor: {message}")]
    InitializationFailed { message: String },

    /// All attempts failed.
    #[error("failed to read sensor after {attempts} attempts")]
    ReadFailed { attempts: u32 },

    /// The background worker running the read panicked or was torn down.
    #[error("read worker failed: {message}")]
    WorkerFailed { message: String },
}

impl ReadError {
    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new worker failure error.
    pub fn worker_failed(message: impl Into<String>) -> Self {
        Self::WorkerFailed {
            message: message.into(),
        }
    }

    /// Check if this error came from bad caller input.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}

impl From<HardwareError> for ReadError {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::InitializationFailed { message } => Self::InitializationFailed { message },
            other => Self::initialization_failed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ReadError {
    fn from(error: serde_json::Error) -> Self {
        Self::InvalidConfiguration(dht_core::Error::Config(error.to_string()))
    }
}
