//! Shared helpers for the sensor integration tests.
//!
//! Every service built here uses a zero backoff so retry-heavy scenarios run
//! instantly.

#![allow(dead_code)]

use dht_core::Measurement;
use dht_hardware::{MockSensor, MockSensorHandle};
use dht_sensor::{SensorService, SensorSettings};
use std::time::Duration;

/// Settings used by every test service.
pub fn fast_settings() -> SensorSettings {
    SensorSettings::default().with_backoff(Duration::ZERO)
}

/// Service around a mock that never answers unless scripted.
pub fn silent_service() -> (SensorService<MockSensor>, MockSensorHandle) {
    let (driver, handle) = MockSensor::new();
    (SensorService::with_settings(driver, fast_settings()), handle)
}

/// Service around a mock that answers with `reading` unless scripted.
pub fn responding_service(reading: Measurement) -> (SensorService<MockSensor>, MockSensorHandle) {
    let (driver, handle) = MockSensor::responding(reading);
    (SensorService::with_settings(driver, fast_settings()), handle)
}

/// JSON options enabling fake mode with the given values.
pub fn fake_options(temperature: f32, humidity: f32) -> String {
    format!(r#"{{"test": {{"fake": {{"temperature": {temperature}, "humidity": {humidity}}}}}}}"#)
}
