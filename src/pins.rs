//! GPIO / peripheral pin assignments for the EnvLogger board (ESP32-C3).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT11 single-wire data line. Open-drain with the internal pull-up.
pub const DHT11_GPIO: i32 = 4;

/// LDR voltage divider on ADC1. GPIO0 on the ESP32-C3 is ADC1 channel 0.
/// Used as the default of `SystemConfig::light_adc_channel`; initialisation
/// and reads both take the channel from the config, never from here.
pub const LDR_ADC_CHANNEL: u32 = 0;
/// ADC attenuation for the LDR (11 dB → 0 – 3.1 V range).
pub const LDR_ADC_ATTEN: u32 = 3;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Green status LED: lit while no alert is active.
pub const LED_GREEN_GPIO: i32 = 2;
/// Red status LED: lit while an alert is active.
pub const LED_RED_GPIO: i32 = 3;
/// Active buzzer (digital drive, HIGH = sounding).
pub const BUZZER_GPIO: i32 = 10;

/// All digital outputs, driven LOW at boot.
pub const OUTPUT_GPIOS: [i32; 3] = [LED_GREEN_GPIO, LED_RED_GPIO, BUZZER_GPIO];
