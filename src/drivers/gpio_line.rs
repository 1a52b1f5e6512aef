//! embedded-hal view of a configured open-drain GPIO.
//!
//! The DHT11 driver is generic over `InputPin + OutputPin`; this is the
//! device implementation, a thin layer over [`hw_init::gpio_read`] and
//! [`hw_init::gpio_write`]. Driving high releases the line to the pull-up.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use super::hw_init;

pub struct OpenDrainLine {
    pin: i32,
}

impl OpenDrainLine {
    /// `pin` must already be configured open-drain by
    /// [`hw_init::init_peripherals`].
    pub fn new(pin: i32) -> Self {
        Self { pin }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}

impl ErrorType for OpenDrainLine {
    type Error = Infallible;
}

impl OutputPin for OpenDrainLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.pin, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        hw_init::gpio_write(self.pin, true);
        Ok(())
    }
}

impl InputPin for OpenDrainLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(hw_init::gpio_read(self.pin))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!hw_init::gpio_read(self.pin))
    }
}
