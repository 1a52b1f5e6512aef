//! Hardware adapter: bridges the board's GPIO and ADC to the port traits.
//!
//! This and [`crate::drivers`] are the only modules that touch real
//! hardware. On non-espidf targets the `hw_init` calls underneath are
//! atomics, so both adapters run unchanged in host tests.

use crate::app::ports::{ActuatorPort, LightSensorPort};
use crate::drivers::hw_init;
use crate::pins;

/// Red/green status LEDs plus the buzzer.
///
/// The indicator is a complementary pair: alert lights red, otherwise
/// green. Never both, never neither.
pub struct IndicatorPanel {
    red: i32,
    green: i32,
    buzzer: i32,
}

impl Default for IndicatorPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPanel {
    pub fn new() -> Self {
        Self {
            red: pins::LED_RED_GPIO,
            green: pins::LED_GREEN_GPIO,
            buzzer: pins::BUZZER_GPIO,
        }
    }
}

impl ActuatorPort for IndicatorPanel {
    fn set_indicator(&mut self, on: bool) {
        hw_init::gpio_write(self.red, on);
        hw_init::gpio_write(self.green, !on);
    }

    fn set_alarm(&mut self, on: bool) {
        hw_init::gpio_write(self.buzzer, on);
    }
}

/// LDR divider on one ADC1 channel.
pub struct AnalogLight {
    channel: u32,
}

impl AnalogLight {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl LightSensorPort for AnalogLight {
    fn read_light_raw(&mut self) -> u16 {
        hw_init::adc1_read(self.channel)
    }
}

#[cfg(all(test, not(target_os = "espidf")))]
mod tests {
    use super::*;

    #[test]
    fn indicator_is_complementary() {
        let mut panel = IndicatorPanel::new();
        panel.set_indicator(true);
        assert!(hw_init::gpio_read(pins::LED_RED_GPIO));
        assert!(!hw_init::gpio_read(pins::LED_GREEN_GPIO));
        panel.set_indicator(false);
        assert!(!hw_init::gpio_read(pins::LED_RED_GPIO));
        assert!(hw_init::gpio_read(pins::LED_GREEN_GPIO));
    }

    #[test]
    fn light_reads_sim_channel() {
        hw_init::sim_set_light_raw(1234);
        assert_eq!(AnalogLight::new(pins::LDR_ADC_CHANNEL).read_light_raw(), 1234);
    }
}
