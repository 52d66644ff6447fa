//! Exclusive access to the sensor hardware.
//!
//! Everything that touches the driver lives in [`HardwareBus`]: the driver
//! itself, the initialization state machine and the per-pin cache. The bus is
//! only reachable through [`HardwareLock::with_exclusive_access`], so bring-up
//! and transactions never overlap, whichever thread or task issued them.

use std::sync::{Mutex, PoisonError};

use dht_core::{GpioPin, Measurement, SensorType};
use dht_hardware::{HardwareError, SensorDriver};

use crate::{
    cache::PinCache,
    init::InitStateMachine,
    retry::{ReadOutcome, RetryPolicy, attempt_read},
};

/// Driver plus the state that must change together with it.
#[derive(Debug)]
pub struct HardwareBus<D> {
    pub driver: D,
    pub init: InitStateMachine,
    pub cache: PinCache,
}

impl<D: SensorDriver> HardwareBus<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            init: InitStateMachine::new(),
            cache: PinCache::new(),
        }
    }

    /// Bring the hardware up if it is not ready yet.
    pub fn ensure_ready(&mut self) -> Result<(), HardwareError> {
        self.init.ensure_ready(&mut self.driver)
    }

    /// Run a retried read on `pin`.
    ///
    /// With `fake` set every transaction succeeds immediately with that value
    /// and the driver is not called.
    pub fn read(
        &mut self,
        sensor_type: SensorType,
        pin: GpioPin,
        policy: RetryPolicy,
        fake: Option<Measurement>,
    ) -> ReadOutcome {
        let driver = &mut self.driver;
        attempt_read(sensor_type, pin, policy, &mut self.cache, |sensor_type, pin| {
            match fake {
                Some(reading) => Ok(reading),
                None => driver.perform_transaction(sensor_type, pin),
            }
        })
    }
}

/// The hardware access serializer.
///
/// A panic inside a critical section poisons the mutex; later callers take
/// the bus over as it was left.
#[derive(Debug)]
pub struct HardwareLock<D> {
    bus: Mutex<HardwareBus<D>>,
}

impl<D: SensorDriver> HardwareLock<D> {
    pub fn new(driver: D) -> Self {
        Self {
            bus: Mutex::new(HardwareBus::new(driver)),
        }
    }

    /// Run `f` with the bus locked. The lock is released when `f` returns.
    pub fn with_exclusive_access<R>(&self, f: impl FnOnce(&mut HardwareBus<D>) -> R) -> R {
        let mut bus = self.bus.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut bus)
    }
}
