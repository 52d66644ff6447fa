//! Mock DHT sensor driver for testing and development.
//!
//! This module provides a simulated driver whose transaction outcomes are
//! scripted through a handle, so retry and initialization behavior can be
//! exercised without a sensor on the bus.

use crate::{
    HardwareError, Result,
    error::TransactionError,
    traits::SensorDriver,
};
use dht_core::{GpioPin, Measurement, SensorType};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::trace;

/// Outcome queued for the next transaction.
#[derive(Debug, Clone)]
enum ScriptedOutcome {
    Reading(Measurement),
    Failure(TransactionError),
}

/// Activity recorded by the mock, shared with its handle.
#[derive(Debug, Default)]
struct MockLog {
    transactions: Vec<(SensorType, GpioPin)>,
    bring_up_calls: usize,
    pending_bring_up_failures: usize,
}

fn lock_log(log: &Mutex<MockLog>) -> MutexGuard<'_, MockLog> {
    log.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock sensor driver for testing and development.
///
/// Outcomes queued through [`MockSensorHandle`] are consumed one per
/// transaction. When the queue is empty the driver falls back to its idle
/// behavior: answering with a fixed measurement, or not answering at all.
///
/// # Examples
///
/// ```
/// use dht_core::{GpioPin, Measurement, SensorType};
/// use dht_hardware::mock::MockSensor;
/// use dht_hardware::traits::SensorDriver;
///
/// let (mut sensor, handle) = MockSensor::responding(Measurement::new(20.0, 50.0));
/// handle.fail_times(1);
///
/// let pin = GpioPin::new(4).unwrap();
/// assert!(sensor.perform_transaction(SensorType::Dht22, pin).is_err());
/// assert_eq!(
///     sensor.perform_transaction(SensorType::Dht22, pin).unwrap(),
///     Measurement::new(20.0, 50.0)
/// );
/// assert_eq!(handle.transaction_count(), 2);
/// ```
#[derive(Debug)]
pub struct MockSensor {
    /// Scripted outcomes, consumed in order
    script_rx: mpsc::UnboundedReceiver<ScriptedOutcome>,

    /// Reading returned when nothing is scripted (`None` = no response)
    idle_reading: Option<Measurement>,

    log: Arc<Mutex<MockLog>>,
}

impl MockSensor {
    /// Create a mock sensor that never answers unless scripted.
    pub fn new() -> (Self, MockSensorHandle) {
        Self::build(None)
    }

    /// Create a mock sensor that answers with `reading` unless scripted.
    pub fn responding(reading: Measurement) -> (Self, MockSensorHandle) {
        Self::build(Some(reading))
    }

    fn build(idle_reading: Option<Measurement>) -> (Self, MockSensorHandle) {
        let (script_tx, script_rx) = mpsc::unbounded_channel();
        let log = Arc::new(Mutex::new(MockLog::default()));

        let sensor = Self {
            script_rx,
            idle_reading,
            log: Arc::clone(&log),
        };

        (sensor, MockSensorHandle { script_tx, log })
    }
}

impl Default for MockSensor {
    fn default() -> Self {
        Self::new().0
    }
}

impl SensorDriver for MockSensor {
    fn bring_up(&mut self) -> Result<()> {
        let mut log = lock_log(&self.log);
        log.bring_up_calls += 1;

        if log.pending_bring_up_failures > 0 {
            log.pending_bring_up_failures -= 1;
            return Err(HardwareError::initialization_failed(
                "mock bring-up scripted to fail",
            ));
        }
        Ok(())
    }

    fn perform_transaction(
        &mut self,
        sensor_type: SensorType,
        pin: GpioPin,
    ) -> std::result::Result<Measurement, TransactionError> {
        lock_log(&self.log).transactions.push((sensor_type, pin));

        let outcome = match self.script_rx.try_recv() {
            Ok(ScriptedOutcome::Reading(reading)) => Ok(reading),
            Ok(ScriptedOutcome::Failure(error)) => Err(error),
            Err(_) => self
                .idle_reading
                .ok_or_else(|| TransactionError::no_response(pin)),
        };

        trace!("Mock {} transaction on {}: {:?}", sensor_type, pin, outcome);
        outcome
    }
}

/// Handle for scripting and inspecting a mock sensor.
///
/// It can be cloned and moved to other threads while the driver itself is
/// owned by the read service.
#[derive(Debug, Clone)]
pub struct MockSensorHandle {
    script_tx: mpsc::UnboundedSender<ScriptedOutcome>,
    log: Arc<Mutex<MockLog>>,
}

impl MockSensorHandle {
    /// Queue a successful transaction.
    pub fn push_reading(&self, reading: Measurement) {
        // The receiver lives as long as the driver; a send after the driver
        // is dropped has nobody to observe it.
        let _ = self.script_tx.send(ScriptedOutcome::Reading(reading));
    }

    /// Queue a failed transaction.
    pub fn push_failure(&self, error: TransactionError) {
        let _ = self.script_tx.send(ScriptedOutcome::Failure(error));
    }

    /// Queue `count` timing failures.
    pub fn fail_times(&self, count: usize) {
        for _ in 0..count {
            self.push_failure(TransactionError::timing("response", 85));
        }
    }

    /// Make the next `count` bring-up calls fail.
    pub fn fail_bring_up(&self, count: usize) {
        lock_log(&self.log).pending_bring_up_failures += count;
    }

    /// Number of transactions performed so far.
    pub fn transaction_count(&self) -> usize {
        lock_log(&self.log).transactions.len()
    }

    /// Every transaction performed so far, in order.
    pub fn transactions(&self) -> Vec<(SensorType, GpioPin)> {
        lock_log(&self.log).transactions.clone()
    }

    /// Number of bring-up calls so far, successful or not.
    pub fn bring_up_count(&self) -> usize {
        lock_log(&self.log).bring_up_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(n: u8) -> GpioPin {
        GpioPin::new(n).unwrap()
    }

    #[test]
    fn test_mock_sensor_no_response_by_default() {
        let (mut sensor, handle) = MockSensor::new();

        let result = sensor.perform_transaction(SensorType::Dht11, pin(4));
        assert_eq!(result, Err(TransactionError::no_response(pin(4))));
        assert_eq!(handle.transaction_count(), 1);
    }

    #[test]
    fn test_mock_sensor_idle_reading() {
        let reading = Measurement::new(19.0, 44.0);
        let (mut sensor, _handle) = MockSensor::responding(reading);

        for _ in 0..3 {
            assert_eq!(
                sensor.perform_transaction(SensorType::Dht22, pin(17)),
                Ok(reading)
            );
        }
    }

    #[test]
    fn test_mock_sensor_script_order() {
        let (mut sensor, handle) = MockSensor::new();
        let decoded = Measurement::new(30.0, 10.0);

        handle.push_failure(TransactionError::checksum_mismatch(1, 2, decoded));
        handle.push_reading(Measurement::new(22.0, 55.0));

        let first = sensor.perform_transaction(SensorType::Dht22, pin(4));
        assert_eq!(first.unwrap_err().partial_reading(), Some(decoded));

        let second = sensor.perform_transaction(SensorType::Dht22, pin(4));
        assert_eq!(second, Ok(Measurement::new(22.0, 55.0)));

        // Script exhausted, back to idle behavior
        assert!(sensor.perform_transaction(SensorType::Dht22, pin(4)).is_err());
    }

    #[test]
    fn test_mock_sensor_records_transactions() {
        let (mut sensor, handle) = MockSensor::responding(Measurement::default());

        sensor.perform_transaction(SensorType::Dht11, pin(4)).unwrap();
        sensor.perform_transaction(SensorType::Dht22, pin(27)).unwrap();

        assert_eq!(
            handle.transactions(),
            vec![(SensorType::Dht11, pin(4)), (SensorType::Dht22, pin(27))]
        );
    }

    #[test]
    fn test_mock_sensor_bring_up_failures() {
        let (mut sensor, handle) = MockSensor::new();
        handle.fail_bring_up(2);

        assert!(sensor.bring_up().is_err());
        assert!(sensor.bring_up().is_err());
        assert!(sensor.bring_up().is_ok());
        assert_eq!(handle.bring_up_count(), 3);
    }

    #[test]
    fn test_mock_sensor_boxed() {
        let (sensor, handle) = MockSensor::responding(Measurement::new(1.0, 2.0));
        let mut boxed: Box<dyn SensorDriver> = Box::new(sensor);

        assert!(boxed.bring_up().is_ok());
        assert!(boxed.perform_transaction(SensorType::Dht11, pin(0)).is_ok());
        assert_eq!(handle.transaction_count(), 1);
    }

    #[test]
    fn test_mock_sensor_handle_clone_shares_state() {
        let (mut sensor, handle) = MockSensor::new();
        let other = handle.clone();

        other.push_reading(Measurement::new(5.0, 6.0));
        assert!(sensor.perform_transaction(SensorType::Dht11, pin(2)).is_ok());
        assert_eq!(handle.transaction_count(), 1);
    }
}
