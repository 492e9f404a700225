//! The system clock (C5): a monotonic tick counter with half-phase state.
//! Exposed behind the [`Clock`] trait per the design notes so tests can
//! inject an isolated instance instead of reaching for the process-wide
//! singleton.

use std::sync::Mutex;

use lazy_static::lazy_static;

/// Which half of a clock cycle the clock currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Low,
    High,
}

/// A source of clock edges. Sequential gate instances consult this (via
/// whatever drives them, typically the evaluator) to know which half-phase
/// handler to call.
pub trait Clock {
    fn rate(&self) -> f64;
    fn set_rate(&mut self, hz: f64);
    /// -1 before the first tick; increments on each completed Low-High-Low
    /// cycle.
    fn value(&self) -> i64;
    fn half(&self) -> Half;
    /// Advances one half-phase, returning the edge that was just crossed
    /// (`High` on Low→High, `Low` on High→Low). A full cycle increments
    /// [`Clock::value`] on the High→Low edge.
    fn tick(&mut self) -> Half;
    fn reset(&mut self);
}

/// The default, process-wide clock implementation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    rate: f64,
    value: i64,
    half: Half,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self { rate: 1.0, value: -1, half: Half::Low }
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle onto the process-wide shared clock instance.
    pub fn shared() -> SharedSystemClock {
        SharedSystemClock
    }
}

impl Clock for SystemClock {
    fn rate(&self) -> f64 {
        self.rate
    }

    fn set_rate(&mut self, hz: f64) {
        debug_assert!(hz > 0.0, "clock rate must be positive");
        self.rate = hz;
    }

    fn value(&self) -> i64 {
        self.value
    }

    fn half(&self) -> Half {
        self.half
    }

    fn tick(&mut self) -> Half {
        match self.half {
            Half::Low => {
                self.half = Half::High;
                log::trace!("clock tick {} -> High (clockUp)", self.value);
                Half::High
            },
            Half::High => {
                self.half = Half::Low;
                self.value += 1;
                log::trace!("clock tick -> Low (clockDown), value now {}", self.value);
                Half::Low
            },
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

lazy_static! {
    static ref SHARED_CLOCK: Mutex<SystemClock> = Mutex::new(SystemClock::new());
}

/// A zero-sized handle onto the process-wide [`SystemClock`] singleton.
/// Reads acquire and immediately release the lock; no operation blocks in
/// single-threaded use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedSystemClock;

impl Clock for SharedSystemClock {
    fn rate(&self) -> f64 {
        SHARED_CLOCK.lock().unwrap().rate()
    }

    fn set_rate(&mut self, hz: f64) {
        SHARED_CLOCK.lock().unwrap().set_rate(hz);
    }

    fn value(&self) -> i64 {
        SHARED_CLOCK.lock().unwrap().value()
    }

    fn half(&self) -> Half {
        SHARED_CLOCK.lock().unwrap().half()
    }

    fn tick(&mut self) -> Half {
        SHARED_CLOCK.lock().unwrap().tick()
    }

    fn reset(&mut self) {
        SHARED_CLOCK.lock().unwrap().reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_before_first_tick() {
        let clock = SystemClock::new();
        assert_eq!(clock.value(), -1);
        assert_eq!(clock.half(), Half::Low);
    }

    #[test]
    fn full_cycle_increments_value_on_falling_edge() {
        let mut clock = SystemClock::new();
        assert_eq!(clock.tick(), Half::High);
        assert_eq!(clock.value(), -1);
        assert_eq!(clock.tick(), Half::Low);
        assert_eq!(clock.value(), 0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut clock = SystemClock::new();
        clock.tick();
        clock.tick();
        clock.set_rate(4.0);
        clock.reset();
        assert_eq!(clock.value(), -1);
        assert_eq!(clock.rate(), 1.0);
    }
}
