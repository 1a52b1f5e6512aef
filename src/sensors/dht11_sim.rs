//! Host-side DHT11 line simulator.
//!
//! Drives the real [`Dht11`](super::dht11::Dht11) decoder through its
//! `embedded-hal` traits on a virtual clock: [`SimLine`] reports the bus
//! level the sensor would produce at the current virtual time, and
//! [`SimDelay`] advances that time instead of sleeping. A whole decode
//! therefore runs in microseconds of wall time and is fully deterministic.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// Sensor response timings (µs), nominal datasheet values.
const ACK_DELAY_US: u64 = 20;
const ACK_LOW_US: u64 = 80;
const ACK_HIGH_US: u64 = 80;
const BIT_LOW_US: u64 = 50;
const ZERO_HIGH_US: u64 = 26;
const ONE_HIGH_US: u64 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimBehaviour {
    /// Answers every start signal with the configured frame.
    Responding,
    /// Never pulls the line low.
    Silent,
    /// Holds the line low forever once bit `n` begins.
    StallsAtBit(u8),
}

struct Bus {
    now_ns: Cell<u64>,
    host_low: Cell<bool>,
    released_at_ns: Cell<Option<u64>>,
    frame: Cell<[u8; 5]>,
    behaviour: Cell<SimBehaviour>,
    start_signals: Cell<u32>,
}

impl Bus {
    fn level(&self) -> bool {
        if self.host_low.get() {
            return false;
        }
        let Some(released) = self.released_at_ns.get() else {
            return true;
        };
        let since_release_us = (self.now_ns.get() - released) / 1_000;
        sensor_level(since_release_us, self.frame.get(), self.behaviour.get())
    }
}

/// Bus level `t_us` after the host released the start signal.
fn sensor_level(t_us: u64, frame: [u8; 5], behaviour: SimBehaviour) -> bool {
    if behaviour == SimBehaviour::Silent || t_us < ACK_DELAY_US {
        return true;
    }
    let mut edge = ACK_DELAY_US + ACK_LOW_US;
    if t_us < edge {
        return false;
    }
    edge += ACK_HIGH_US;
    if t_us < edge {
        return true;
    }
    for index in 0..40u8 {
        if behaviour == SimBehaviour::StallsAtBit(index) {
            return false;
        }
        edge += BIT_LOW_US;
        if t_us < edge {
            return false;
        }
        let one = frame[usize::from(index / 8)] & (0x80 >> (index % 8)) != 0;
        edge += if one { ONE_HIGH_US } else { ZERO_HIGH_US };
        if t_us < edge {
            return true;
        }
    }
    // Trailing low, then the pull-up takes over.
    t_us >= edge + BIT_LOW_US
}

/// A simulated sensor plus the bus it sits on.
pub struct SimDht11 {
    bus: Rc<Bus>,
}

impl SimDht11 {
    pub fn new(frame: [u8; 5]) -> Self {
        Self {
            bus: Rc::new(Bus {
                now_ns: Cell::new(0),
                host_low: Cell::new(false),
                released_at_ns: Cell::new(None),
                frame: Cell::new(frame),
                behaviour: Cell::new(SimBehaviour::Responding),
                start_signals: Cell::new(0),
            }),
        }
    }

    pub fn with_behaviour(self, behaviour: SimBehaviour) -> Self {
        self.bus.behaviour.set(behaviour);
        self
    }

    pub fn set_frame(&self, frame: [u8; 5]) {
        self.bus.frame.set(frame);
    }

    pub fn set_behaviour(&self, behaviour: SimBehaviour) {
        self.bus.behaviour.set(behaviour);
    }

    pub fn line(&self) -> SimLine {
        SimLine {
            bus: Rc::clone(&self.bus),
        }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay {
            bus: Rc::clone(&self.bus),
        }
    }

    /// Virtual time since the simulator was created.
    pub fn elapsed_us(&self) -> u64 {
        self.bus.now_ns.get() / 1_000
    }

    /// Number of host start signals seen.
    pub fn start_signals(&self) -> u32 {
        self.bus.start_signals.get()
    }
}

/// Host side of the open-drain line.
pub struct SimLine {
    bus: Rc<Bus>,
}

impl ErrorType for SimLine {
    type Error = Infallible;
}

impl OutputPin for SimLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if !self.bus.host_low.get() {
            self.bus.start_signals.set(self.bus.start_signals.get() + 1);
        }
        self.bus.host_low.set(true);
        self.bus.released_at_ns.set(None);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.bus.host_low.replace(false) {
            self.bus.released_at_ns.set(Some(self.bus.now_ns.get()));
        }
        Ok(())
    }
}

impl InputPin for SimLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bus.level())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bus.level())
    }
}

/// Delay that advances the virtual clock.
pub struct SimDelay {
    bus: Rc<Bus>,
}

impl SimDelay {
    fn advance(&mut self, ns: u64) {
        self.bus.now_ns.set(self.bus.now_ns.get() + ns);
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1_000_000);
    }
}
