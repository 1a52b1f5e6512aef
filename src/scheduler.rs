//! Periodic task cadence.
//!
//! Every task loop in the firmware wakes on a fixed period. Sleeping a
//! fixed delay after the work accumulates the work time into the period
//! (a 10 s loop whose cycle takes 300 ms runs every 10.3 s). [`Cadence`]
//! instead anchors a grid at the first wake and sleeps until the next grid
//! point, like FreeRTOS `vTaskDelayUntil`.
//!
//! ```text
//!   anchor        +P            +2P           +3P
//!     │─work─┐     │─work──┐     │─work─┐      │
//!     └sleep─┴────▶└─sleep─┴────▶└sleep─┴─────▶│
//! ```
//!
//! When a cycle overruns one or more grid points, the next cycle starts
//! immediately and the grid realigns to the latest missed point, so a long
//! stall produces one late cycle rather than a burst of catch-up cycles.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::ports::Clock;

// ═══════════════════════════════════════════════════════════════
//  Cadence
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Cadence {
    period_ms: u64,
    /// Grid point of the current cycle; `None` until the first wake.
    last_wake_ms: Option<u64>,
    overruns: u32,
}

impl Cadence {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            last_wake_ms: None,
            overruns: 0,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Cycles that started late because the previous one overran.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Milliseconds to sleep from `now_ms` to the next grid point. The
    /// first call anchors the grid at `now_ms` and returns one full period.
    pub fn delay_until_next(&mut self, now_ms: u64) -> u64 {
        let Some(last) = self.last_wake_ms else {
            self.last_wake_ms = Some(now_ms + self.period_ms);
            return self.period_ms;
        };

        let next = last + self.period_ms;
        if next > now_ms {
            self.last_wake_ms = Some(next);
            return next - now_ms;
        }

        // Overrun: realign to the latest grid point not after `now_ms`.
        let missed = (now_ms - next) / self.period_ms;
        self.last_wake_ms = Some(next + missed * self.period_ms);
        self.overruns = self.overruns.saturating_add(1);
        debug!(
            "Cadence overrun: {}ms late, {} slot(s) skipped",
            now_ms - next,
            missed
        );
        0
    }

    /// Block until the next grid point.
    pub fn wait(&mut self, clock: &impl Clock, delay: &mut impl DelayNs) {
        let ms = self.delay_until_next(clock.now_ms());
        if ms > 0 {
            delay.delay_ms(ms.min(u64::from(u32::MAX)) as u32);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: u64 = 10_000;

    #[test]
    fn first_call_anchors_grid() {
        let mut c = Cadence::new(PERIOD);
        assert_eq!(c.delay_until_next(500), PERIOD);
        // Grid is now 10_500, 20_500, ...
        assert_eq!(c.delay_until_next(10_800), 9_700);
    }

    #[test]
    fn work_time_does_not_accumulate() {
        let mut c = Cadence::new(PERIOD);
        let mut now = 0;
        now += c.delay_until_next(now);
        for work in [300, 450, 120, 9_000, 10] {
            now += work;
            now += c.delay_until_next(now);
            assert_eq!(now % PERIOD, 0, "woke off-grid at {now}");
        }
        assert_eq!(now, 6 * PERIOD);
        assert_eq!(c.overruns(), 0);
    }

    #[test]
    fn overrun_runs_immediately_then_realigns() {
        let mut c = Cadence::new(PERIOD);
        c.delay_until_next(0); // grid point 10_000
        // Cycle at 10_000 stalls until 35_000, past 20_000 and 30_000.
        assert_eq!(c.delay_until_next(35_000), 0);
        assert_eq!(c.overruns(), 1);
        // Realigned to 30_000; next point is 40_000.
        assert_eq!(c.delay_until_next(35_100), 4_900);
    }

    #[test]
    fn landing_on_grid_point_needs_no_sleep() {
        let mut c = Cadence::new(PERIOD);
        c.delay_until_next(0);
        assert_eq!(c.delay_until_next(20_000), 0);
        assert_eq!(c.delay_until_next(20_000), PERIOD);
    }

    #[test]
    fn zero_period_is_clamped() {
        let c = Cadence::new(0);
        assert_eq!(c.period_ms(), 1);
    }
}
