//! DHT11 temperature/humidity sensor: single-wire frame decoder.
//!
//! ## Wire protocol
//!
//! The host pulls the line low for ≥18 ms, releases it, and listens. The
//! sensor acknowledges with ~80 µs low, ~80 µs high, then sends 40 bits,
//! MSB first. Every bit starts with ~50 µs low; the following high pulse
//! is ~26 µs for a `0` and ~70 µs for a `1`. Sampling the line a fixed
//! 30 µs after the rising edge therefore reads the bit value directly.
//!
//! ```text
//! byte 0  humidity integer part
//! byte 1  humidity tenths
//! byte 2  temperature integer part
//! byte 3  temperature tenths
//! byte 4  checksum = (b0 + b1 + b2 + b3) mod 256
//! ```
//!
//! Everything from the release of the start signal to the last bit runs
//! inside [`uninterruptible`]; the 18 ms start pulse does not, since
//! stretching it is harmless.

use core::ops::RangeInclusive;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{trace, warn};

use super::SensorReading;
use crate::app::ports::ClimateSensor;
use crate::drivers::critical::uninterruptible;
use crate::error::DecodeError;

/// Bits per frame.
pub const FRAME_BITS: u8 = 40;

/// Documented operating envelope.
pub const TEMPERATURE_RANGE_C: RangeInclusive<f32> = -40.0..=80.0;
pub const HUMIDITY_RANGE_PCT: RangeInclusive<f32> = 0.0..=100.0;

/// Per-phase timing of one decode attempt, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingBudget {
    /// Host start signal (line held low).
    pub start_low_us: u32,
    /// Released-high time before listening.
    pub start_high_us: u32,
    /// Bound on each of the three acknowledgement edges.
    pub response_timeout_us: u32,
    /// Bound on each edge inside a bit.
    pub bit_timeout_us: u32,
    /// Delay from a bit's rising edge to the sampling instant.
    /// Must sit between the `0` and `1` high-pulse widths.
    pub sample_delay_us: u32,
}

impl TimingBudget {
    pub const DHT11: Self = Self {
        start_low_us: 18_000,
        start_high_us: 40,
        response_timeout_us: 100,
        bit_timeout_us: 100,
        sample_delay_us: 30,
    };
}

impl Default for TimingBudget {
    fn default() -> Self {
        Self::DHT11
    }
}

// ---------------------------------------------------------------------------
// Raw frame
// ---------------------------------------------------------------------------

/// The 5 bytes read off the wire in one attempt, not yet validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame([u8; 5]);

impl RawFrame {
    pub const fn from_bytes(bytes: [u8; 5]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 5] {
        self.0
    }

    /// Wrapping sum of the four payload bytes.
    pub fn expected_checksum(&self) -> u8 {
        self.0[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
    }

    pub fn checksum_ok(&self) -> bool {
        self.0[4] == self.expected_checksum()
    }

    /// Validate the checksum and the operating envelope.
    pub fn into_reading(self) -> Result<SensorReading, DecodeError> {
        if !self.checksum_ok() {
            return Err(DecodeError::ChecksumMismatch);
        }
        let [hum_int, hum_dec, temp_int, temp_dec, _] = self.0;
        let reading = SensorReading {
            humidity: hum_int as f32 + hum_dec as f32 / 10.0,
            temperature: temp_int as f32 + temp_dec as f32 / 10.0,
        };
        if !HUMIDITY_RANGE_PCT.contains(&reading.humidity)
            || !TEMPERATURE_RANGE_C.contains(&reading.temperature)
        {
            return Err(DecodeError::OutOfRange);
        }
        Ok(reading)
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

enum Wait {
    TimedOut,
    Bus,
}

/// DHT11 on an open-drain line: `set_high` releases the line to the
/// pull-up, `is_high` reads the actual bus level.
pub struct Dht11<P, D> {
    line: P,
    delay: D,
}

impl<P, D> Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(mut line: P, delay: D) -> Self {
        // Idle state is released. A failure here shows up again as
        // `DecodeError::Bus` on the first decode.
        if line.set_high().is_err() {
            warn!("DHT11: could not release the data line");
        }
        Self { line, delay }
    }

    /// Run one complete handshake and frame read.
    pub fn decode(&mut self, budget: &TimingBudget) -> Result<SensorReading, DecodeError> {
        self.line.set_low().map_err(|_| DecodeError::Bus)?;
        self.delay.delay_us(budget.start_low_us);

        let frame = uninterruptible(|| self.read_frame(budget))?;
        trace!("DHT11: raw frame {:02x?}", frame.bytes());
        frame.into_reading()
    }

    fn read_frame(&mut self, budget: &TimingBudget) -> Result<RawFrame, DecodeError> {
        self.line.set_high().map_err(|_| DecodeError::Bus)?;
        self.delay.delay_us(budget.start_high_us);

        // Acknowledge: low, high, then low again at the start of bit 0.
        for level in [false, true, false] {
            self.wait_for_level(level, budget.response_timeout_us)
                .map_err(|w| match w {
                    Wait::TimedOut => DecodeError::NoResponse,
                    Wait::Bus => DecodeError::Bus,
                })?;
        }

        let mut bytes = [0u8; 5];
        for index in 0..FRAME_BITS {
            let bit_err = |w: Wait| match w {
                Wait::TimedOut => DecodeError::BitTimeout(index),
                Wait::Bus => DecodeError::Bus,
            };
            self.wait_for_level(true, budget.bit_timeout_us)
                .map_err(bit_err)?;
            self.delay.delay_us(budget.sample_delay_us);
            let bit = self.line.is_high().map_err(|_| DecodeError::Bus)?;
            self.wait_for_level(false, budget.bit_timeout_us)
                .map_err(bit_err)?;

            let byte = &mut bytes[usize::from(index / 8)];
            *byte = (*byte << 1) | u8::from(bit);
        }
        Ok(RawFrame(bytes))
    }

    /// Poll in 1 µs steps until the line reads `high`, for at most
    /// `timeout_us`.
    fn wait_for_level(&mut self, high: bool, timeout_us: u32) -> Result<(), Wait> {
        let mut elapsed = 0u32;
        while self.line.is_high().map_err(|_| Wait::Bus)? != high {
            if elapsed >= timeout_us {
                return Err(Wait::TimedOut);
            }
            self.delay.delay_us(1);
            elapsed += 1;
        }
        Ok(())
    }
}

impl<P, D> ClimateSensor for Dht11<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn decode(&mut self, budget: &TimingBudget) -> Result<SensorReading, DecodeError> {
        Dht11::decode(self, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::dht11_sim::{SimBehaviour, SimDelay, SimDht11, SimLine};

    fn frame(b0: u8, b1: u8, b2: u8, b3: u8) -> [u8; 5] {
        let sum = b0.wrapping_add(b1).wrapping_add(b2).wrapping_add(b3);
        [b0, b1, b2, b3, sum]
    }

    fn decoder(sim: &SimDht11) -> Dht11<SimLine, SimDelay> {
        Dht11::new(sim.line(), sim.delay())
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        let f = RawFrame::from_bytes([200, 0, 100, 0, 44]);
        assert_eq!(f.expected_checksum(), 44);
        assert!(f.checksum_ok());
    }

    #[test]
    fn frame_with_bad_checksum_is_rejected() {
        let f = RawFrame::from_bytes([45, 0, 23, 0, 69]);
        assert_eq!(f.into_reading(), Err(DecodeError::ChecksumMismatch));
    }

    #[test]
    fn humidity_above_100_is_out_of_range() {
        let f = RawFrame::from_bytes(frame(120, 0, 20, 0));
        assert_eq!(f.into_reading(), Err(DecodeError::OutOfRange));
    }

    #[test]
    fn temperature_above_80_is_out_of_range() {
        let f = RawFrame::from_bytes(frame(40, 0, 81, 0));
        assert_eq!(f.into_reading(), Err(DecodeError::OutOfRange));
    }

    #[test]
    fn decodes_simulated_frame() {
        let sim = SimDht11::new(frame(45, 3, 23, 7));
        let mut dht = decoder(&sim);

        let reading = dht.decode(&TimingBudget::DHT11).unwrap();
        assert_eq!(reading.humidity, 45.0 + 3.0 / 10.0);
        assert_eq!(reading.temperature, 23.0 + 7.0 / 10.0);
        assert_eq!(sim.start_signals(), 1);
    }

    #[test]
    fn start_pulse_holds_line_low_for_budget() {
        let sim = SimDht11::new(frame(50, 0, 25, 0));
        let mut dht = decoder(&sim);
        dht.decode(&TimingBudget::DHT11).unwrap();
        assert!(sim.elapsed_us() >= u64::from(TimingBudget::DHT11.start_low_us));
        // Whole frame is a few milliseconds after the start pulse.
        assert!(sim.elapsed_us() < 18_000 + 6_000);
    }

    #[test]
    fn silent_sensor_reports_no_response() {
        let sim = SimDht11::new(frame(50, 0, 25, 0)).with_behaviour(SimBehaviour::Silent);
        let mut dht = decoder(&sim);
        assert_eq!(
            dht.decode(&TimingBudget::DHT11),
            Err(DecodeError::NoResponse)
        );
    }

    #[test]
    fn stall_mid_frame_reports_bit_index() {
        let sim =
            SimDht11::new(frame(50, 0, 25, 0)).with_behaviour(SimBehaviour::StallsAtBit(17));
        let mut dht = decoder(&sim);
        assert_eq!(
            dht.decode(&TimingBudget::DHT11),
            Err(DecodeError::BitTimeout(17))
        );
    }

    #[test]
    fn corrupted_checksum_on_the_wire() {
        let mut bytes = frame(50, 0, 25, 0);
        bytes[4] ^= 0x01;
        let sim = SimDht11::new(bytes);
        let mut dht = decoder(&sim);
        assert_eq!(
            dht.decode(&TimingBudget::DHT11),
            Err(DecodeError::ChecksumMismatch)
        );
    }

    #[test]
    fn consecutive_decodes_reuse_the_line() {
        let sim = SimDht11::new(frame(40, 0, 20, 0));
        let mut dht = decoder(&sim);
        assert!(dht.decode(&TimingBudget::DHT11).is_ok());

        sim.set_frame(frame(60, 5, 30, 1));
        let reading = dht.decode(&TimingBudget::DHT11).unwrap();
        assert_eq!(reading.humidity, 60.0 + 5.0 / 10.0);
        assert_eq!(sim.start_signals(), 2);
    }

    /// Line whose every operation fails.
    struct DeadLine;

    impl embedded_hal::digital::ErrorType for DeadLine {
        type Error = embedded_hal::digital::ErrorKind;
    }

    impl InputPin for DeadLine {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }
    }

    impl OutputPin for DeadLine {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(embedded_hal::digital::ErrorKind::Other)
        }
    }

    #[test]
    fn unusable_line_fails_as_bus_error() {
        let sim = SimDht11::new(frame(50, 0, 25, 0));
        let mut dht = Dht11::new(DeadLine, sim.delay());
        assert_eq!(dht.decode(&TimingBudget::DHT11), Err(DecodeError::Bus));
        assert_eq!(sim.start_signals(), 0);
    }
}
