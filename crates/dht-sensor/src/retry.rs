//! Bounded retry loop around a single sensor transaction.
//!
//! The loop is shared by the blocking and background read paths. It runs with
//! the hardware lock already held, so the backoff sleep blocks the calling
//! thread on purpose: nothing else may talk to the sensor in between.

use std::{thread, time::Duration};

use dht_core::{GpioPin, Measurement, SensorType};
use dht_hardware::TransactionError;
use tracing::{debug, warn};

use crate::cache::PinCache;

/// How many times to retry a failed transaction and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first failure; `n` allows `n + 1` transactions
    pub max_retries: u32,

    /// Fixed delay between a failure and the next transaction
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Upper bound on transactions for one read.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Result of one retried read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadOutcome {
    /// Final value: fresh on success, otherwise the cached or partially
    /// decoded value
    pub reading: Measurement,

    pub succeeded: bool,

    /// Transactions performed, including the successful one
    pub attempts_used: u32,
}

impl ReadOutcome {
    /// Failed transactions during this read.
    pub fn error_count(&self) -> u32 {
        if self.succeeded {
            self.attempts_used - 1
        } else {
            self.attempts_used
        }
    }
}

/// Run `transact` until it succeeds or the retry budget is spent.
///
/// The result starts from the pin's cached value. A checksum failure that
/// still decoded a frame replaces it with the decoded values. Whatever value
/// the read ends with is written back to the cache.
pub fn attempt_read<F>(
    sensor_type: SensorType,
    pin: GpioPin,
    policy: RetryPolicy,
    cache: &mut PinCache,
    mut transact: F,
) -> ReadOutcome
where
    F: FnMut(SensorType, GpioPin) -> Result<Measurement, TransactionError>,
{
    let mut reading = cache.seed(pin);
    let mut retries_left = policy.max_retries;
    let mut attempts_used = 0u32;

    let succeeded = loop {
        attempts_used += 1;

        match transact(sensor_type, pin) {
            Ok(fresh) => {
                reading = fresh;
                break true;
            }
            Err(e) => {
                if let Some(partial) = e.partial_reading() {
                    reading = partial;
                }

                if retries_left == 0 {
                    warn!(
                        "{} on {} failed after {} attempt(s): {}",
                        sensor_type, pin, attempts_used, e
                    );
                    break false;
                }

                retries_left -= 1;
                debug!(
                    "{} on {} attempt {} failed ({}), {} retries left",
                    sensor_type, pin, attempts_used, e, retries_left
                );
                if !policy.backoff.is_zero() {
                    thread::sleep(policy.backoff);
                }
            }
        }
    };

    cache.store(pin, reading);

    ReadOutcome {
        reading,
        succeeded,
        attempts_used,
    }
}
