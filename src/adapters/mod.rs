//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                        | Connects to              |
//! |-------------|-----------------------------------|--------------------------|
//! | `hardware`  | ActuatorPort, LightSensorPort     | ESP32 GPIO, ADC1         |
//! | `log_sink`  | CloudMirror, NotificationSink,    | Serial log output        |
//! |             | DisplayPort                       |                          |
//! | `rng`       | `rand::RngCore`                   | ESP32 hardware RNG       |
//! | `time`      | Clock                             | ESP32 system timer       |
//!
//! The DHT11 line itself is [`crate::drivers::gpio_line::OpenDrainLine`],
//! consumed by the generic decoder in [`crate::sensors::dht11`].

pub mod hardware;
pub mod log_sink;
pub mod rng;
pub mod time;
