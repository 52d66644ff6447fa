//! Hardware driver abstraction for DHT11/DHT22 temperature and humidity sensors.
//!
//! This crate defines the seam between the read orchestration layer and the
//! low-level driver that performs the single-wire protocol transaction on a
//! GPIO pin. Real drivers (memory-mapped GPIO, character-device GPIO, ...)
//! implement [`SensorDriver`]; the [`mock`] module provides a scriptable
//! driver for development and testing.
//!
//! # Design
//!
//! - **Synchronous**: a transaction is a timing-critical busy loop, so the
//!   trait is plain `fn` and callers run it on a blocking thread.
//! - **Object-safe**: `Box<dyn SensorDriver>` works out of the box.
//! - **Two error families**: [`HardwareError`] for subsystem failures,
//!   [`TransactionError`] for a single failed read that the caller may retry.
//!
//! # Example
//!
//! ```
//! use dht_core::{GpioPin, Measurement, SensorType};
//! use dht_hardware::{MockSensor, SensorDriver};
//!
//! # fn main() -> dht_hardware::Result<()> {
//! let (mut driver, _handle) = MockSensor::responding(Measurement::new(21.0, 48.0));
//! driver.bring_up()?;
//!
//! let pin = GpioPin::new(4).expect("pin 4 is valid");
//! let reading = driver.perform_transaction(SensorType::Dht22, pin);
//! assert_eq!(reading.unwrap().humidity, 48.0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mock;
pub mod traits;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result, TransactionError};
pub use mock::{MockSensor, MockSensorHandle};
pub use traits::SensorDriver;
