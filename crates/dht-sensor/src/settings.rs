//! Process-wide read settings and the options that update them.
//!
//! [`SensorSettings`] is what every read consults: the sensor used by
//! zero-argument reads, the retry budget, the backoff between attempts and
//! the fake-reading override. [`SensorOptions`] is the deserializable update
//! accepted by `configure`:
//!
//! ```json
//! {
//!   "sensorType": 22,
//!   "gpioPin": 4,
//!   "maxRetries": 2,
//!   "test": { "fake": { "temperature": 21.5, "humidity": 60 } }
//! }
//! ```

use dht_core::{
    Error, GpioPin, Measurement, SensorType,
    constants::{DEFAULT_MAX_RETRIES, DEFAULT_MAX_WORKERS, RETRY_BACKOFF_MS},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Fake-reading override used in test mode.
///
/// While enabled, every transaction succeeds immediately with the configured
/// values and the driver is never touched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TestOverride {
    pub enabled: bool,
    pub fake_temperature: f32,
    pub fake_humidity: f32,
}

impl TestOverride {
    /// An enabled override returning `reading`.
    pub fn fake(reading: Measurement) -> Self {
        Self {
            enabled: true,
            fake_temperature: reading.temperature,
            fake_humidity: reading.humidity,
        }
    }

    /// The fake reading, if the override is enabled.
    pub fn reading(&self) -> Option<Measurement> {
        self.enabled
            .then(|| Measurement::new(self.fake_temperature, self.fake_humidity))
    }
}

/// Settings consulted by every read.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSettings {
    /// Sensor model used by zero-argument reads
    pub sensor_type: SensorType,

    /// Pin used by zero-argument reads
    pub gpio_pin: GpioPin,

    /// Retries after the first failed transaction
    pub max_retries: u32,

    /// Delay between failed transactions
    pub backoff: Duration,

    /// Upper bound on concurrently running asynchronous reads
    pub max_workers: usize,

    pub test_override: TestOverride,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            sensor_type: SensorType::default(),
            gpio_pin: GpioPin::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Duration::from_millis(RETRY_BACKOFF_MS),
            max_workers: DEFAULT_MAX_WORKERS,
            test_override: TestOverride::default(),
        }
    }
}

impl SensorSettings {
    /// Set the sensor used by zero-argument reads.
    pub fn with_sensor(mut self, sensor_type: SensorType, gpio_pin: GpioPin) -> Self {
        self.sensor_type = sensor_type;
        self.gpio_pin = gpio_pin;
        self
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay between failed transactions.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the number of background workers for asynchronous reads.
    ///
    /// Zero is treated as one.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Enable the fake-reading override.
    pub fn with_fake_reading(mut self, reading: Measurement) -> Self {
        self.test_override = TestOverride::fake(reading);
        self
    }

    /// Retry policy derived from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: self.backoff,
        }
    }

    /// Apply a configuration update.
    ///
    /// Every field is validated before anything changes, so a rejected
    /// update leaves the settings untouched. An absent `test` block disables
    /// fake mode.
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported sensor model, an out-of-range pin
    /// or a `test.fake` block missing one of its values.
    pub fn apply(&mut self, options: &SensorOptions) -> dht_core::Result<()> {
        let sensor_type = options
            .sensor_type
            .map(SensorType::from_model)
            .transpose()?;
        let gpio_pin = options.gpio_pin.map(GpioPin::new).transpose()?;
        let fake = match options.test.as_ref().and_then(|test| test.fake.as_ref()) {
            Some(fake) => Some(fake.to_measurement()?),
            None => None,
        };

        if let Some(sensor_type) = sensor_type {
            self.sensor_type = sensor_type;
        }
        if let Some(gpio_pin) = gpio_pin {
            self.gpio_pin = gpio_pin;
        }
        if let Some(max_retries) = options.max_retries {
            self.max_retries = max_retries;
        }
        self.test_override = fake.map(TestOverride::fake).unwrap_or_default();

        Ok(())
    }
}

/// Configuration update accepted by `configure`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorOptions {
    pub sensor_type: Option<u8>,
    pub gpio_pin: Option<u8>,
    pub max_retries: Option<u32>,
    pub test: Option<TestOptions>,
}

impl SensorOptions {
    /// Parse options from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed input.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Whether this update switches the service into test mode.
    pub fn is_test_mode(&self) -> bool {
        self.test.is_some()
    }
}

/// The `test` block of [`SensorOptions`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestOptions {
    pub fake: Option<FakeOptions>,
}

/// The `test.fake` block of [`SensorOptions`].
///
/// Both values are required once the block is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FakeOptions {
    pub temperature: Option<f32>,
    pub humidity: Option<f32>,
}

impl FakeOptions {
    fn to_measurement(&self) -> dht_core::Result<Measurement> {
        let temperature = self
            .temperature
            .ok_or_else(|| Error::MissingConfig("test.fake.temperature".to_string()))?;
        let humidity = self
            .humidity
            .ok_or_else(|| Error::MissingConfig("test.fake.humidity".to_string()))?;
        Ok(Measurement::new(temperature, humidity))
    }
}
