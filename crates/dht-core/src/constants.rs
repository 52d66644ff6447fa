//! Core constants for DHT sensor polling.
//!
//! This module centralizes the numeric values shared by the driver seam and
//! the orchestration layer: supported sensor models, the GPIO range covered by
//! the per-pin cache, and the default retry behavior.
//!
//! # Usage
//!
//! ```
//! use dht_core::constants::*;
//! use std::time::Duration;
//!
//! assert!(SUPPORTED_SENSOR_MODELS.contains(&DEFAULT_SENSOR_MODEL));
//! assert!(DEFAULT_GPIO_PIN <= MAX_GPIO_PIN);
//!
//! let backoff = Duration::from_millis(RETRY_BACKOFF_MS);
//! assert_eq!(backoff.as_millis(), 450);
//! ```

// ============================================================================
// Sensor Models
// ============================================================================

/// Model number of the DHT11 variant.
pub const DHT11_MODEL: u8 = 11;

/// Model number of the DHT22 (AM2302) variant.
pub const DHT22_MODEL: u8 = 22;

/// All model numbers accepted by the read path.
pub const SUPPORTED_SENSOR_MODELS: [u8; 2] = [DHT11_MODEL, DHT22_MODEL];

// ============================================================================
// GPIO Range
// ============================================================================

/// Number of GPIO pins tracked by the per-pin reading cache.
///
/// Pins are numbered `0..PIN_COUNT` using the BCM numbering of the host.
pub const PIN_COUNT: usize = 32;

/// Highest GPIO pin number accepted by the read path.
pub const MAX_GPIO_PIN: u8 = (PIN_COUNT - 1) as u8;

// ============================================================================
// Defaults
// ============================================================================

/// Sensor model used by zero-argument reads until configured otherwise.
pub const DEFAULT_SENSOR_MODEL: u8 = DHT11_MODEL;

/// GPIO pin used by zero-argument reads until configured otherwise.
pub const DEFAULT_GPIO_PIN: u8 = 4;

/// Retry budget applied after the first failed transaction.
///
/// A value of 3 means up to 4 transactions per read.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed delay between failed transactions (milliseconds).
///
/// The sensor needs time to recover after a misread; the delay is the same
/// for every retry.
pub const RETRY_BACKOFF_MS: u64 = 450;

/// Number of background workers available to asynchronous reads.
pub const DEFAULT_MAX_WORKERS: usize = 4;
