use crate::{
    Result,
    constants::{DEFAULT_GPIO_PIN, DHT11_MODEL, DHT22_MODEL, MAX_GPIO_PIN},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported sensor variant.
///
/// Both variants speak the same single-wire protocol and differ only in
/// start-signal timing and in how the data bytes encode the values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum SensorType {
    /// DHT11: integer resolution, slow start signal.
    #[default]
    Dht11 = DHT11_MODEL,
    /// DHT22 / AM2302: 0.1 resolution, short start signal.
    Dht22 = DHT22_MODEL,
}

impl SensorType {
    /// Create a sensor type from its model number.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedSensorType` for anything other than 11 or 22.
    #[inline]
    pub fn from_model(model: u8) -> Result<Self> {
        match model {
            DHT11_MODEL => Ok(SensorType::Dht11),
            DHT22_MODEL => Ok(SensorType::Dht22),
            _ => Err(Error::UnsupportedSensorType(model)),
        }
    }

    /// Model number (11 or 22).
    #[inline]
    #[must_use]
    pub fn model(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SensorType {
    type Error = Error;

    fn try_from(model: u8) -> Result<Self> {
        SensorType::from_model(model)
    }
}

impl From<SensorType> for u8 {
    fn from(sensor_type: SensorType) -> u8 {
        sensor_type.model()
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SensorType::Dht11 => write!(f, "DHT11"),
            SensorType::Dht22 => write!(f, "DHT22"),
        }
    }
}

impl std::str::FromStr for SensorType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("DHT")
            .or_else(|| trimmed.strip_prefix("dht"))
            .unwrap_or(trimmed);
        let model: u8 = digits
            .parse()
            .map_err(|_| Error::Config(format!("Invalid sensor type: {s}")))?;
        SensorType::from_model(model)
    }
}

/// GPIO pin number, validated against the per-pin cache range (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GpioPin(u8);

impl GpioPin {
    /// Create a new GPIO pin with validation.
    ///
    /// # Errors
    /// Returns `Error::PinOutOfRange` if the pin is above `MAX_GPIO_PIN`.
    pub fn new(pin: u8) -> Result<Self> {
        if pin > MAX_GPIO_PIN {
            return Err(Error::PinOutOfRange {
                pin,
                max: MAX_GPIO_PIN,
            });
        }
        Ok(GpioPin(pin))
    }

    /// Get the raw pin number.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Index into per-pin tables.
    #[must_use]
    pub fn index(&self) -> usize {
        usize::from(self.0)
    }
}

impl Default for GpioPin {
    fn default() -> Self {
        GpioPin(DEFAULT_GPIO_PIN)
    }
}

impl TryFrom<u8> for GpioPin {
    type Error = Error;

    fn try_from(pin: u8) -> Result<Self> {
        GpioPin::new(pin)
    }
}

impl From<GpioPin> for u8 {
    fn from(pin: GpioPin) -> u8 {
        pin.0
    }
}

impl fmt::Display for GpioPin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// A temperature/humidity pair as decoded from one sensor frame.
///
/// Temperature is in degrees Celsius, humidity in percent relative humidity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub temperature: f32,
    pub humidity: f32,
}

impl Measurement {
    #[must_use]
    pub fn new(temperature: f32, humidity: f32) -> Self {
        Self {
            temperature,
            humidity,
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1}°C, {:.1}%", self.temperature, self.humidity)
    }
}
