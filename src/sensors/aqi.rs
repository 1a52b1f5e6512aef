//! Composite air-quality index.
//!
//! There is no gas sensor on this board; the index is a heuristic built
//! from comfort bands of temperature and humidity plus a darkness penalty
//! (dark rooms tend to be closed, unventilated rooms). A small random term
//! keeps the published value from looking unnaturally flat.
//!
//! Each adjustment is truncated to an integer before it is added, and the
//! final value is clamped to `[0, 500]`.

use rand::{Rng, RngCore};

/// Upper bound of the index.
pub const AQI_MAX: u16 = 500;
/// Index with every input inside its comfort band.
pub const AQI_BASE: i32 = 50;
/// Amplitude of the uniform noise term, inclusive on both sides.
pub const NOISE_AMPLITUDE: i32 = 5;

/// Deterministic part of the index plus `perturbation` (clamped to
/// `±NOISE_AMPLITUDE`).
pub fn compute_aqi(temperature: f32, humidity: f32, light_level: u16, perturbation: i32) -> u16 {
    let mut aqi = AQI_BASE;

    if temperature > 30.0 {
        aqi = aqi.saturating_add(((temperature - 30.0) * 3.0) as i32);
    } else if temperature < 18.0 {
        aqi = aqi.saturating_add(((18.0 - temperature) * 2.0) as i32);
    }

    if humidity > 70.0 {
        aqi = aqi.saturating_add(((humidity - 70.0) * 2.0) as i32);
    } else if humidity < 30.0 {
        aqi = aqi.saturating_add(((30.0 - humidity) * 1.5) as i32);
    }

    if light_level < 1000 {
        aqi = aqi.saturating_add((1000 - i32::from(light_level)) / 20);
    }

    aqi = aqi.saturating_add(perturbation.clamp(-NOISE_AMPLITUDE, NOISE_AMPLITUDE));
    aqi.clamp(0, i32::from(AQI_MAX)) as u16
}

// ---------------------------------------------------------------------------
// Noise
// ---------------------------------------------------------------------------

/// Source of the per-sample perturbation.
pub trait NoiseSource {
    /// A value in `[-NOISE_AMPLITUDE, NOISE_AMPLITUDE]`.
    fn perturbation(&mut self) -> i32;
}

/// Uniform noise from any RNG.
pub struct RngNoise<R>(pub R);

impl<R: RngCore> NoiseSource for RngNoise<R> {
    fn perturbation(&mut self) -> i32 {
        self.0.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE)
    }
}

/// Constant perturbation, for reproducible runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedNoise(pub i32);

impl NoiseSource for FixedNoise {
    fn perturbation(&mut self) -> i32 {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// EPA-style band of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitive,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_index(aqi: u16) -> Self {
        match aqi {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitive,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    /// Label reported upstream.
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitive => "Unhealthy for Sensitive",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }

    /// Label that fits a 128 px display line.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitive => "Unhealthy*",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Bad",
            Self::Hazardous => "Hazardous",
        }
    }
}
