//! Sensor driver trait definition.
//!
//! This module defines the contract between the read orchestration layer and
//! the low-level driver that bit-bangs the single-wire protocol. The driver is
//! synchronous: a transaction is a tight, timing-critical loop on
//! one pin and must not be interleaved with other bus activity, so the caller
//! runs it on a dedicated thread while holding the hardware lock.
//!
//! Because the methods are plain `fn`, the trait is object-safe and can be
//! used as `Box<dyn SensorDriver>` as well as through generics.

use crate::error::{Result, TransactionError};
use dht_core::{GpioPin, Measurement, SensorType};

/// Low-level DHT sensor driver.
///
/// # Examples
///
/// ```
/// use dht_core::{GpioPin, SensorType};
/// use dht_hardware::traits::SensorDriver;
///
/// fn poll<D: SensorDriver>(driver: &mut D) -> Option<f32> {
///     let pin = GpioPin::new(4).ok()?;
///     driver
///         .perform_transaction(SensorType::Dht22, pin)
///         .ok()
///         .map(|m| m.temperature)
/// }
/// ```
pub trait SensorDriver: Send + 'static {
    /// Prepare the hardware subsystem (memory-map GPIO, set scheduling, ...).
    ///
    /// Called at most once successfully per driver; the caller re-invokes it
    /// after a failure.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::InitializationFailed` (or `Io`) if the
    /// subsystem could not be prepared.
    fn bring_up(&mut self) -> Result<()>;

    /// Perform one physical read attempt on `pin`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransactionError`] on timing violation, checksum mismatch
    /// or when the sensor does not respond.
    fn perform_transaction(
        &mut self,
        sensor_type: SensorType,
        pin: GpioPin,
    ) -> std::result::Result<Measurement, TransactionError>;
}

impl<D: SensorDriver + ?Sized> SensorDriver for Box<D> {
    fn bring_up(&mut self) -> Result<()> {
        (**self).bring_up()
    }

    fn perform_transaction(
        &mut self,
        sensor_type: SensorType,
        pin: GpioPin,
    ) -> std::result::Result<Measurement, TransactionError> {
        (**self).perform_transaction(sensor_type, pin)
    }
}
