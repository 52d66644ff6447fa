//! Read orchestration for DHT11/DHT22 temperature and humidity sensors.
//!
//! This crate sits between callers and a [`SensorDriver`](dht_hardware::SensorDriver).
//! It validates requests, brings the hardware up lazily, retries failed
//! transactions with a fixed backoff, keeps the last value per pin, and
//! serializes every hardware access behind a single lock. Reads run either
//! blocking on the calling thread or in the background on a Tokio runtime.
//!
//! # Example
//!
//! ```
//! use dht_core::Measurement;
//! use dht_hardware::MockSensor;
//! use dht_sensor::SensorService;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dht_sensor::Result<()> {
//! let (driver, _handle) = MockSensor::new();
//! let service = SensorService::new(driver);
//! service.configure_json(r#"{"test": {"fake": {"temperature": 21.5, "humidity": 60}}}"#)?;
//!
//! let readout = service.read_async(11, 4).await?;
//! assert_eq!((readout.temperature, readout.humidity), (21.5, 60.0));
//! assert!(readout.is_valid);
//! # Ok(())
//! # }
//! ```

pub mod bus;
pub mod cache;
pub mod error;
pub mod init;
pub mod retry;
pub mod service;
pub mod settings;
pub mod worker;

pub use cache::{CachedReading, PinCache};
pub use error::{ReadError, Result};
pub use retry::{ReadOutcome, RetryPolicy, attempt_read};
pub use service::{Readout, SensorService};
pub use settings::{SensorOptions, SensorSettings, TestOverride};
pub use worker::ReadHandle;
