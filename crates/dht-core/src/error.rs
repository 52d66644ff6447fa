use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Validation errors
    #[error("sensor type is invalid: {0} (expected 11 or 22)")]
    UnsupportedSensorType(u8),

    #[error("GPIO pin {pin} out of range (max {max})")]
    PinOutOfRange { pin: u8, max: u8 },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
