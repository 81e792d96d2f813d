//! # Tic Clock
//!
//! Wall-clock time measured in tics.
//!
//! ## Design
//!
//! The scheduler never reads `Instant` directly. It asks a [`TicClock`] how
//! many tics have elapsed and asks it to sleep while waiting for peers, so
//! tests can drive time by hand with [`ManualClock`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use lockstep_math::{Fixed, FRACBITS};
use parking_lot::Mutex;

/// Default simulation rate.
pub const TICRATE: u32 = 35;

/// Source of wall-clock tics.
pub trait TicClock {
    /// Tics elapsed since the clock started.
    fn now_tics(&self) -> i32;

    /// Yields to the OS for roughly `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);

    /// Records the wall-clock start of a simulation tic, for interpolation.
    fn mark_tic(&mut self) {}

    /// How far wall-clock time is past the last marked tic, from zero to
    /// one tic.
    fn tic_fraction(&self) -> Fixed {
        Fixed::ONE
    }
}

/// Real-time clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    /// When the clock started.
    start: Instant,
    /// Start of the last marked simulation tic.
    last_mark: Instant,
    /// Tics per second.
    tic_rate: u32,
    /// Length of one tic.
    tic_duration: Duration,
}

impl SystemClock {
    /// Creates a clock running at `tic_rate` tics per second.
    ///
    /// A rate of zero is treated as one.
    #[must_use]
    pub fn new(tic_rate: u32) -> Self {
        let tic_rate = tic_rate.max(1);
        let now = Instant::now();
        Self {
            start: now,
            last_mark: now,
            tic_rate,
            tic_duration: Duration::from_micros(1_000_000 / u64::from(tic_rate)),
        }
    }

    /// Length of one tic.
    #[must_use]
    pub const fn tic_duration(&self) -> Duration {
        self.tic_duration
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(TICRATE)
    }
}

impl TicClock for SystemClock {
    fn now_tics(&self) -> i32 {
        let micros = self.start.elapsed().as_micros();
        (micros * u128::from(self.tic_rate) / 1_000_000) as i32
    }

    fn sleep_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }

    fn mark_tic(&mut self) {
        self.last_mark = Instant::now();
    }

    fn tic_fraction(&self) -> Fixed {
        let since = self.last_mark.elapsed().as_micros();
        let tic = self.tic_duration.as_micros().max(1);
        let frac = (since << FRACBITS) / tic;
        Fixed::from_raw(frac.min(Fixed::ONE.raw() as u128) as i32)
    }
}

#[derive(Debug)]
struct ManualTime {
    micros: u64,
    tic_rate: u32,
    sleeps: u64,
    marks: u64,
}

/// Hand-driven clock for tests and headless runs.
///
/// Clones share the same time, so a test can keep a handle while the
/// scheduler owns another. Sleeping advances virtual time by the requested
/// amount, so a waiting scheduler always makes progress.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualTime>>,
}

impl ManualClock {
    /// Creates a clock at tic zero.
    #[must_use]
    pub fn new(tic_rate: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualTime {
                micros: 0,
                tic_rate: tic_rate.max(1),
                sleeps: 0,
                marks: 0,
            })),
        }
    }

    /// Moves time forward to the start of the tic `tics` from now.
    pub fn advance_tics(&self, tics: u32) {
        let mut time = self.inner.lock();
        let rate = u64::from(time.tic_rate);
        let now = time.micros * rate / 1_000_000;
        let target = now + u64::from(tics);
        time.micros = (target * 1_000_000).div_ceil(rate);
    }

    /// Moves time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.inner.lock().micros += ms * 1000;
    }

    /// Number of `sleep_ms` calls so far.
    #[must_use]
    pub fn sleeps(&self) -> u64 {
        self.inner.lock().sleeps
    }

    /// Number of `mark_tic` calls so far.
    #[must_use]
    pub fn marks(&self) -> u64 {
        self.inner.lock().marks
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(TICRATE)
    }
}

impl TicClock for ManualClock {
    fn now_tics(&self) -> i32 {
        let time = self.inner.lock();
        (time.micros * u64::from(time.tic_rate) / 1_000_000) as i32
    }

    fn sleep_ms(&mut self, ms: u32) {
        let mut time = self.inner.lock();
        time.micros += u64::from(ms) * 1000;
        time.sleeps += 1;
    }

    fn mark_tic(&mut self) {
        self.inner.lock().marks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(TICRATE);
        assert_eq!(clock.now_tics(), 0);
        clock.advance_tics(1);
        assert_eq!(clock.now_tics(), 1);
        clock.advance_tics(34);
        assert_eq!(clock.now_tics(), 35);
        clock.advance_ms(1000);
        assert_eq!(clock.now_tics(), 70);
    }

    #[test]
    fn test_manual_clock_sleep_moves_time() {
        let mut clock = ManualClock::new(TICRATE);
        let shared = clock.clone();
        for _ in 0..29 {
            clock.sleep_ms(1);
        }
        assert_eq!(shared.now_tics(), 1);
        assert_eq!(shared.sleeps(), 29);
    }

    #[test]
    fn test_system_clock_starts_near_zero() {
        let clock = SystemClock::new(TICRATE);
        assert!(clock.now_tics() <= 1);
        assert_eq!(clock.tic_duration(), Duration::from_micros(28_571));
        assert!(clock.tic_fraction() <= Fixed::ONE);
    }
}
