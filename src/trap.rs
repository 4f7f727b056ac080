//! Trap timing: a global square wave driven by wall-clock milliseconds.

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{GameError, Result};

pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the Unix epoch, so every trap shares one phase.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now: Cell::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// 50% duty cycle: dangerous for the first half of every period.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrapOscillator {
    period_ms: u64,
}

impl TrapOscillator {
    pub fn new(period_ms: u64) -> Result<Self> {
        if period_ms == 0 {
            return Err(GameError::InvalidTrapPeriod);
        }
        Ok(Self { period_ms })
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// `now mod P < P / 2`, kept in integers.
    pub fn is_active(&self, now_ms: u64) -> bool {
        (now_ms % self.period_ms) * 2 < self.period_ms
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn reference_period() {
        let osc = TrapOscillator::new(2000).unwrap();
        assert!(osc.is_active(0));
        assert!(osc.is_active(999));
        assert!(!osc.is_active(1000));
        assert!(!osc.is_active(1999));
        assert!(osc.is_active(2000));
    }

    #[test]
    fn odd_period_splits_like_real_division() {
        // 3 / 2 = 1.5: offsets 0 and 1 are active, 2 is not
        let osc = TrapOscillator::new(3).unwrap();
        assert!(osc.is_active(0));
        assert!(osc.is_active(1));
        assert!(!osc.is_active(2));
    }

    #[test]
    fn zero_period_rejected() {
        assert_eq!(TrapOscillator::new(0), Err(GameError::InvalidTrapPeriod));
    }

    #[test]
    fn manual_clock_moves() {
        let clock = ManualClock::new(10);
        clock.advance(5);
        assert_eq!(clock.now_ms(), 15);
        clock.set(1);
        assert_eq!((&clock).now_ms(), 1);
    }

    proptest! {
        #[test]
        fn active_exactly_first_half(period in 1u64..10_000, window in 0u64..1_000_000, offset in 0u64..10_000) {
            let offset = offset % period;
            let osc = TrapOscillator::new(period).unwrap();
            let now = window * period + offset;
            prop_assert_eq!(osc.is_active(now), (offset as f64) < period as f64 / 2.0);
        }
    }
}
