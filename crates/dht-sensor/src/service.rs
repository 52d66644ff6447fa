//! The read service: configuration, initialization and blocking reads.
//!
//! [`SensorService`] is the context object shared by every caller. It owns
//! the settings behind a read-write lock and the hardware behind the
//! [`HardwareLock`]. The two locks are never held together: a read takes a
//! settings snapshot first, releases it, then enters the hardware critical
//! section.
//!
//! # Examples
//!
//! ```
//! use dht_core::Measurement;
//! use dht_hardware::MockSensor;
//! use dht_sensor::SensorService;
//!
//! # fn main() -> dht_sensor::Result<()> {
//! let (driver, _handle) = MockSensor::responding(Measurement::new(22.0, 55.0));
//! let service = SensorService::new(driver);
//!
//! let readout = service.read(22, 4)?;
//! assert!(readout.is_valid);
//! assert_eq!(readout.temperature, 22.0);
//! assert_eq!(readout.error_count, 0);
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dht_core::{GpioPin, SensorType};
use dht_hardware::SensorDriver;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::{
    Result,
    bus::HardwareLock,
    cache::CachedReading,
    error::ReadError,
    retry::ReadOutcome,
    settings::{SensorOptions, SensorSettings},
};

/// What a read reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Readout {
    pub temperature: f32,
    pub humidity: f32,

    /// Whether the final transaction succeeded
    pub is_valid: bool,

    /// Failed transactions during this read
    pub error_count: u32,
}

impl From<ReadOutcome> for Readout {
    fn from(outcome: ReadOutcome) -> Self {
        Self {
            temperature: outcome.reading.temperature,
            humidity: outcome.reading.humidity,
            is_valid: outcome.succeeded,
            error_count: outcome.error_count(),
        }
    }
}

pub(crate) struct Shared<D> {
    settings: RwLock<SensorSettings>,
    hardware: HardwareLock<D>,
    pub(crate) workers: Arc<Semaphore>,
}

/// Entry point for sensor reads.
///
/// Cloning is cheap and every clone talks to the same hardware, settings and
/// cache.
pub struct SensorService<D> {
    pub(crate) shared: Arc<Shared<D>>,
}

impl<D> Clone for SensorService<D> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D: SensorDriver> SensorService<D> {
    /// Create a service with default settings.
    pub fn new(driver: D) -> Self {
        Self::with_settings(driver, SensorSettings::default())
    }

    /// Create a service with explicit settings.
    pub fn with_settings(driver: D, settings: SensorSettings) -> Self {
        let hardware = HardwareLock::new(driver);
        if settings.test_override.enabled {
            hardware.with_exclusive_access(|bus| bus.init.mark_ready());
        }

        Self {
            shared: Arc::new(Shared {
                workers: Arc::new(Semaphore::new(settings.max_workers.max(1))),
                settings: RwLock::new(settings),
                hardware,
            }),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> SensorSettings {
        self.read_settings().clone()
    }

    /// Read the sensor configured for zero-argument reads.
    ///
    /// Bring-up is not attempted here; call [`ensure_initialized`] or
    /// [`configure_legacy`] first. Exhausted retries are reported through
    /// `is_valid == false`.
    ///
    /// [`ensure_initialized`]: SensorService::ensure_initialized
    /// [`configure_legacy`]: SensorService::configure_legacy
    pub fn read_configured(&self) -> Readout {
        let (sensor_type, pin, policy, fake) = {
            let settings = self.read_settings();
            (
                settings.sensor_type,
                settings.gpio_pin,
                settings.retry_policy(),
                settings.test_override.reading(),
            )
        };

        self.shared
            .hardware
            .with_exclusive_access(|bus| bus.read(sensor_type, pin, policy, fake))
            .into()
    }

    /// Blocking read of `sensor_type` (11 or 22) on `pin`.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidConfiguration` for an unsupported model or
    /// pin, before any hardware access, and `ReadError::InitializationFailed`
    /// when bring-up fails.
    pub fn read(&self, sensor_type: u8, pin: u8) -> Result<Readout> {
        let sensor_type = SensorType::from_model(sensor_type)?;
        let pin = GpioPin::new(pin)?;
        self.execute(sensor_type, pin)
    }

    /// Bring the hardware up unless it already is.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InitializationFailed` on failure. The next call
    /// retries.
    pub fn ensure_initialized(&self) -> Result<()> {
        self.shared
            .hardware
            .with_exclusive_access(|bus| bus.ensure_ready())
            .map_err(ReadError::from)
    }

    /// Whether the hardware has been brought up.
    pub fn is_initialized(&self) -> bool {
        self.shared
            .hardware
            .with_exclusive_access(|bus| bus.init.is_ready())
    }

    /// Apply a configuration update.
    ///
    /// A present `test` block switches to fake mode and marks the hardware
    /// initialized; an absent one switches fake mode off.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidConfiguration` and leaves the settings
    /// unchanged if any field is invalid.
    pub fn configure(&self, options: SensorOptions) -> Result<()> {
        {
            let mut settings = self.write_settings();
            settings.apply(&options)?;
            info!(
                "Sensor configured: {} on {}, max_retries={}, fake={}",
                settings.sensor_type,
                settings.gpio_pin,
                settings.max_retries,
                settings.test_override.enabled
            );
        }

        if options.is_test_mode() {
            self.shared
                .hardware
                .with_exclusive_access(|bus| bus.init.mark_ready());
        }
        Ok(())
    }

    /// Apply a configuration update given as JSON text.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidConfiguration` for malformed JSON or
    /// invalid values.
    pub fn configure_json(&self, json: &str) -> Result<()> {
        let options = SensorOptions::from_json(json)?;
        self.configure(options)
    }

    /// Set the default sensor and retry budget, then bring the hardware up.
    ///
    /// Fake mode is left as it is. Returns whether the hardware is ready.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidConfiguration` for an unsupported model or
    /// pin; nothing is changed in that case.
    pub fn configure_legacy(
        &self,
        sensor_type: u8,
        pin: u8,
        max_retries: Option<u32>,
    ) -> Result<bool> {
        let sensor_type = SensorType::from_model(sensor_type)?;
        let pin = GpioPin::new(pin)?;

        {
            let mut settings = self.write_settings();
            settings.sensor_type = sensor_type;
            settings.gpio_pin = pin;
            if let Some(max_retries) = max_retries {
                settings.max_retries = max_retries;
            }
            info!(
                "Sensor configured: {} on {}, max_retries={}",
                sensor_type, pin, settings.max_retries
            );
        }

        match self.ensure_initialized() {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Eager initialization failed: {}", e);
                Ok(false)
            }
        }
    }

    /// Set the retry budget used by reads that start after this call.
    pub fn set_max_retries(&self, max_retries: u32) {
        self.write_settings().max_retries = max_retries;
        debug!("max_retries set to {}", max_retries);
    }

    /// The cached value for `pin` and when it was stored.
    ///
    /// # Errors
    ///
    /// Returns `ReadError::InvalidConfiguration` for an out-of-range pin.
    pub fn last_reading(&self, pin: u8) -> Result<CachedReading> {
        let pin = GpioPin::new(pin)?;
        Ok(self
            .shared
            .hardware
            .with_exclusive_access(|bus| bus.cache.get(pin)))
    }

    /// Initialize if needed, then run the retried read with the hardware
    /// locked.
    ///
    /// Settings are sampled when this runs, not when the read was requested.
    pub(crate) fn execute(&self, sensor_type: SensorType, pin: GpioPin) -> Result<Readout> {
        let (policy, fake) = {
            let settings = self.read_settings();
            (settings.retry_policy(), settings.test_override.reading())
        };

        let outcome = self.shared.hardware.with_exclusive_access(|bus| {
            bus.ensure_ready()?;
            Ok::<_, ReadError>(bus.read(sensor_type, pin, policy, fake))
        })?;

        Ok(outcome.into())
    }

    fn read_settings(&self) -> RwLockReadGuard<'_, SensorSettings> {
        self.shared
            .settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_settings(&self) -> RwLockWriteGuard<'_, SensorSettings> {
        self.shared
            .settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dht_core::Measurement;
    use dht_hardware::{MockSensor, MockSensorHandle, TransactionError};
    use rstest::rstest;
    use std::time::Duration;

    fn service(driver: MockSensor) -> SensorService<MockSensor> {
        SensorService::with_settings(
            driver,
            SensorSettings::default().with_backoff(Duration::ZERO),
        )
    }

    fn silent() -> (SensorService<MockSensor>, MockSensorHandle) {
        let (driver, handle) = MockSensor::new();
        (service(driver), handle)
    }

    #[test]
    fn test_fake_mode_read() {
        let (service, handle) = silent();
        service
            .configure_json(r#"{"test": {"fake": {"temperature": 21.5, "humidity": 60}}}"#)
            .unwrap();

        let readout = service.read(11, 4).unwrap();
        assert_eq!(
            readout,
            Readout {
                temperature: 21.5,
                humidity: 60.0,
                is_valid: true,
                error_count: 0
            }
        );
        assert_eq!(handle.transaction_count(), 0);
        assert_eq!(handle.bring_up_count(), 0);
    }

    #[test]
    fn test_success_after_two_failures() {
        let (driver, handle) = MockSensor::new();
        let service = service(driver);
        handle.fail_times(2);
        handle.push_reading(Measurement::new(22.0, 55.0));

        let readout = service.read(22, 4).unwrap();
        assert_eq!(readout.temperature, 22.0);
        assert_eq!(readout.humidity, 55.0);
        assert!(readout.is_valid);
        assert_eq!(readout.error_count, 2);
        assert_eq!(handle.transaction_count(), 3);
    }

    #[test]
    fn test_exhausted_retries_return_cached_value() {
        let (driver, handle) = MockSensor::new();
        let service = service(driver);
        handle.push_reading(Measurement::new(22.0, 55.0));
        service.read(22, 4).unwrap();

        let readout = service.read(22, 4).unwrap();
        assert!(!readout.is_valid);
        assert_eq!(readout.error_count, 4);
        assert_eq!(readout.temperature, 22.0);
        assert_eq!(readout.humidity, 55.0);
        assert_eq!(handle.transaction_count(), 5);
    }

    #[rstest]
    #[case(99, 4)]
    #[case(0, 4)]
    #[case(11, 32)]
    fn test_invalid_arguments_touch_nothing(#[case] sensor_type: u8, #[case] pin: u8) {
        let (service, handle) = silent();

        let error = service.read(sensor_type, pin).unwrap_err();
        assert!(error.is_invalid_configuration());
        assert_eq!(handle.transaction_count(), 0);
        assert_eq!(handle.bring_up_count(), 0);
    }

    #[test]
    fn test_initialization_failure_is_an_error_and_retried() {
        let (driver, handle) = MockSensor::responding(Measurement::new(20.0, 40.0));
        let service = service(driver);
        handle.fail_bring_up(1);

        let error = service.read(11, 4).unwrap_err();
        assert!(matches!(error, ReadError::InitializationFailed { .. }));
        assert_eq!(handle.transaction_count(), 0);
        assert!(!service.is_initialized());

        assert!(service.read(11, 4).unwrap().is_valid);
        assert_eq!(handle.bring_up_count(), 2);
    }

    #[test]
    fn test_bring_up_runs_once() {
        let (driver, handle) = MockSensor::responding(Measurement::default());
        let service = service(driver);

        for _ in 0..3 {
            service.read(11, 4).unwrap();
        }
        service.ensure_initialized().unwrap();
        assert_eq!(handle.bring_up_count(), 1);
    }

    #[test]
    fn test_read_configured_uses_settings() {
        let (driver, handle) = MockSensor::responding(Measurement::default());
        let service = service(driver);
        service
            .configure_json(r#"{"sensorType": 22, "gpioPin": 17}"#)
            .unwrap();

        service.read_configured();
        assert_eq!(
            handle.transactions(),
            vec![(SensorType::Dht22, GpioPin::new(17).unwrap())]
        );
    }

    #[test]
    fn test_read_configured_skips_bring_up() {
        let (driver, handle) = MockSensor::responding(Measurement::new(20.0, 40.0));
        let service = service(driver);
        handle.fail_bring_up(1);

        let readout = service.read_configured();
        assert!(readout.is_valid);
        assert_eq!(readout.temperature, 20.0);
        assert_eq!(handle.bring_up_count(), 0);
        assert!(!service.is_initialized());
    }

    #[test]
    fn test_configure_rejects_bad_json() {
        let (service, _handle) = silent();
        let before = service.settings();

        assert!(service.configure_json("{not json").is_err());
        assert!(service.configure_json(r#"{"sensorType": 21}"#).is_err());
        assert_eq!(service.settings(), before);
    }

    #[test]
    fn test_configure_without_test_block_disables_fake_mode() {
        let (driver, handle) = MockSensor::responding(Measurement::new(1.0, 2.0));
        let service = service(driver);
        service
            .configure_json(r#"{"test": {"fake": {"temperature": 9, "humidity": 9}}}"#)
            .unwrap();
        service.configure(SensorOptions::default()).unwrap();

        let readout = service.read(11, 4).unwrap();
        assert_eq!(readout.temperature, 1.0);
        assert_eq!(handle.transaction_count(), 1);
    }

    #[test]
    fn test_configure_legacy() {
        let (driver, handle) = MockSensor::responding(Measurement::default());
        let service = service(driver);

        assert!(service.configure_legacy(22, 27, Some(1)).unwrap());
        let settings = service.settings();
        assert_eq!(settings.sensor_type, SensorType::Dht22);
        assert_eq!(settings.gpio_pin.as_u8(), 27);
        assert_eq!(settings.max_retries, 1);
        assert_eq!(handle.bring_up_count(), 1);
    }

    #[test]
    fn test_configure_legacy_reports_failed_bring_up() {
        let (service, handle) = silent();
        handle.fail_bring_up(1);

        assert!(!service.configure_legacy(11, 4, None).unwrap());
        assert_eq!(service.settings().max_retries, 3);
        assert!(service.configure_legacy(11, 4, None).unwrap());
    }

    #[test]
    fn test_configure_legacy_validates_first() {
        let (service, handle) = silent();

        assert!(service.configure_legacy(33, 17, Some(0)).is_err());
        assert_eq!(service.settings(), SensorSettings::default().with_backoff(Duration::ZERO));
        assert_eq!(handle.bring_up_count(), 0);
    }

    #[test]
    fn test_set_max_retries_zero() {
        let (service, handle) = silent();
        service.set_max_retries(0);

        let readout = service.read(11, 4).unwrap();
        assert!(!readout.is_valid);
        assert_eq!(readout.error_count, 1);
        assert_eq!(handle.transaction_count(), 1);
    }

    #[test]
    fn test_checksum_failure_reports_decoded_values() {
        let (service, handle) = silent();
        service.set_max_retries(0);
        handle.push_failure(TransactionError::checksum_mismatch(
            0x50,
            0x51,
            Measurement::new(24.0, 51.0),
        ));

        let readout = service.read(22, 4).unwrap();
        assert!(!readout.is_valid);
        assert_eq!(readout.temperature, 24.0);
        assert_eq!(service.last_reading(4).unwrap().reading.humidity, 51.0);
    }

    #[test]
    fn test_last_reading() {
        let (driver, _handle) = MockSensor::responding(Measurement::new(19.5, 45.0));
        let service = service(driver);

        assert_eq!(service.last_reading(4).unwrap().updated_at, None);
        service.read(11, 4).unwrap();

        let cached = service.last_reading(4).unwrap();
        assert_eq!(cached.reading, Measurement::new(19.5, 45.0));
        assert!(cached.updated_at.is_some());
        assert!(service.last_reading(40).is_err());
    }

    #[test]
    fn test_with_fake_settings_skips_bring_up() {
        let (driver, handle) = MockSensor::new();
        let service = SensorService::with_settings(
            driver,
            SensorSettings::default().with_fake_reading(Measurement::new(3.0, 4.0)),
        );

        assert!(service.is_initialized());
        assert!(service.read_configured().is_valid);
        assert_eq!(handle.bring_up_count(), 0);
    }

    #[test]
    fn test_readout_serializes_camel_case() {
        let readout = Readout {
            temperature: 21.5,
            humidity: 60.0,
            is_valid: true,
            error_count: 0,
        };
        let json = serde_json::to_value(readout).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["errorCount"], 0);
    }
}
