//! Hardware initialization state machine.
//!
//! The hardware subsystem is brought up lazily, on the first read that needs
//! it. A failed bring-up is not fatal: the machine stays in `NotReady` and the
//! next call tries again. Once `Ready` is reached the driver's bring-up routine
//! is never invoked again.
//!
//! # States
//!
//! - `NotReady`: bring-up not attempted yet, or the last attempt failed
//! - `Ready`: terminal, the subsystem is prepared
//!
//! # Examples
//!
//! ```
//! use dht_hardware::MockSensor;
//! use dht_sensor::init::{InitState, InitStateMachine};
//!
//! let (mut driver, handle) = MockSensor::new();
//! handle.fail_bring_up(1);
//!
//! let mut machine = InitStateMachine::new();
//! assert!(machine.ensure_ready(&mut driver).is_err());
//! assert_eq!(machine.state(), InitState::NotReady);
//!
//! assert!(machine.ensure_ready(&mut driver).is_ok());
//! assert_eq!(machine.state(), InitState::Ready);
//!
//! // Ready is terminal: no further bring-up calls
//! assert!(machine.ensure_ready(&mut driver).is_ok());
//! assert_eq!(handle.bring_up_count(), 2);
//! ```

use std::fmt;

use dht_hardware::{HardwareError, SensorDriver};
use tracing::{debug, info, warn};

/// Readiness of the hardware subsystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InitState {
    /// Bring-up not attempted yet, or the last attempt failed.
    #[default]
    NotReady,

    /// Bring-up succeeded.
    Ready,
}

impl fmt::Display for InitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitState::NotReady => write!(f, "NotReady"),
            InitState::Ready => write!(f, "Ready"),
        }
    }
}

/// Tracks hardware readiness and drives bring-up on demand.
///
/// # Thread Safety
///
/// Not synchronized by itself; it lives inside the hardware bus and is only
/// touched while the hardware lock is held.
#[derive(Debug, Default)]
pub struct InitStateMachine {
    state: InitState,

    /// Bring-up attempts made so far, successful or not.
    attempts: u32,
}

impl InitStateMachine {
    /// Create a state machine in `NotReady`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> InitState {
        self.state
    }

    /// Whether the subsystem is ready.
    pub fn is_ready(&self) -> bool {
        self.state == InitState::Ready
    }

    /// Number of bring-up attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Bring the hardware up unless it already is.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when bring-up fails. The state stays
    /// `NotReady` so a later call retries.
    pub fn ensure_ready<D: SensorDriver + ?Sized>(
        &mut self,
        driver: &mut D,
    ) -> Result<(), HardwareError> {
        if self.is_ready() {
            return Ok(());
        }

        self.attempts += 1;
        debug!("Bringing up sensor hardware (attempt {})", self.attempts);

        match driver.bring_up() {
            Ok(()) => {
                self.state = InitState::Ready;
                info!("Sensor hardware ready after {} attempt(s)", self.attempts);
                Ok(())
            }
            Err(e) => {
                warn!("Sensor hardware bring-up failed: {}", e);
                Err(e)
            }
        }
    }

    /// Mark the subsystem ready without calling the driver.
    ///
    /// Used when test mode replaces every transaction with fake values, so
    /// the real hardware is never needed.
    pub fn mark_ready(&mut self) {
        if !self.is_ready() {
            debug!("Marking sensor hardware ready without bring-up");
            self.state = InitState::Ready;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dht_hardware::MockSensor;

    #[test]
    fn test_new_machine_not_ready() {
        let machine = InitStateMachine::new();
        assert_eq!(machine.state(), InitState::NotReady);
        assert!(!machine.is_ready());
        assert_eq!(machine.attempts(), 0);
    }

    #[test]
    fn test_ensure_ready_success() {
        let (mut driver, handle) = MockSensor::new();
        let mut machine = InitStateMachine::new();

        assert!(machine.ensure_ready(&mut driver).is_ok());
        assert!(machine.is_ready());
        assert_eq!(handle.bring_up_count(), 1);
    }

    #[test]
    fn test_failure_stays_not_ready_and_retries() {
        let (mut driver, handle) = MockSensor::new();
        handle.fail_bring_up(3);
        let mut machine = InitStateMachine::new();

        for _ in 0..3 {
            let result = machine.ensure_ready(&mut driver);
            assert!(matches!(
                result,
                Err(HardwareError::InitializationFailed { .. })
            ));
            assert_eq!(machine.state(), InitState::NotReady);
        }

        assert!(machine.ensure_ready(&mut driver).is_ok());
        assert_eq!(machine.attempts(), 4);
        assert_eq!(handle.bring_up_count(), 4);
    }

    #[test]
    fn test_ready_is_terminal() {
        let (mut driver, handle) = MockSensor::new();
        let mut machine = InitStateMachine::new();

        for _ in 0..5 {
            machine.ensure_ready(&mut driver).unwrap();
        }
        assert_eq!(handle.bring_up_count(), 1);
    }

    #[test]
    fn test_mark_ready_skips_bring_up() {
        let (mut driver, handle) = MockSensor::new();
        let mut machine = InitStateMachine::new();

        machine.mark_ready();
        machine.ensure_ready(&mut driver).unwrap();

        assert!(machine.is_ready());
        assert_eq!(handle.bring_up_count(), 0);
        assert_eq!(machine.attempts(), 0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(InitState::NotReady.to_string(), "NotReady");
        assert_eq!(InitState::Ready.to_string(), "Ready");
    }
}
