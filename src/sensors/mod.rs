//! Sensor subsystem: the DHT11 decoder, the averaged light reading and
//! the composite air-quality estimate derived from both.

pub mod aqi;
pub mod dht11;
#[cfg(not(target_os = "espidf"))]
pub mod dht11_sim;
pub mod light;

/// One validated DHT11 reading. Only produced after the checksum and the
/// operating envelope have both been checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
}
