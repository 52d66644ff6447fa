//! Last-value cache, one slot per GPIO pin.

use chrono::{DateTime, Utc};
use dht_core::{GpioPin, Measurement, constants::PIN_COUNT};

/// The most recent value stored for a pin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CachedReading {
    pub reading: Measurement,

    /// When the value was stored; `None` until the pin is first read
    pub updated_at: Option<DateTime<Utc>>,
}

/// Per-pin cache of the last value produced by a read.
///
/// Every slot starts at `(0.0, 0.0)`. A read seeds its result from the slot
/// and writes its final value back whether or not it succeeded.
#[derive(Debug, Clone, Default)]
pub struct PinCache {
    slots: [CachedReading; PIN_COUNT],
}

impl PinCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value a read on `pin` starts from.
    pub fn seed(&self, pin: GpioPin) -> Measurement {
        self.slots[pin.index()].reading
    }

    /// Record the final value of a read on `pin`.
    pub fn store(&mut self, pin: GpioPin, reading: Measurement) {
        self.slots[pin.index()] = CachedReading {
            reading,
            updated_at: Some(Utc::now()),
        };
    }

    /// The full cache entry for `pin`.
    pub fn get(&self, pin: GpioPin) -> CachedReading {
        self.slots[pin.index()]
    }
}
