//! Ambient light (LDR voltage divider on ADC1).
//!
//! Single ADC samples jitter by a few dozen counts; the acquisition loop
//! averages a burst of back-to-back samples instead.

use crate::app::ports::LightSensorPort;

/// Full scale of the 12-bit ADC.
pub const LIGHT_FULL_SCALE: u16 = 4095;

/// Mean of `samples` consecutive reads. Readings above full scale are
/// clamped; `samples == 0` is treated as one sample.
pub fn read_averaged(port: &mut impl LightSensorPort, samples: u8) -> u16 {
    let count = samples.max(1);
    let sum: u32 = (0..count)
        .map(|_| u32::from(port.read_light_raw().min(LIGHT_FULL_SCALE)))
        .sum();
    (sum / u32::from(count)) as u16
}
