//! Output drivers, hardware initialisation, and platform helpers.

pub mod annunciator;
pub mod critical;
pub mod gpio_line;
pub mod hw_init;
pub mod task_pin;
