use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock abstraction for run timing across the stack.
///
/// - now(): returns a monotonic Instant
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - ms_since(): helper to compute elapsed milliseconds from an epoch Instant
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        dur.as_millis() as u64
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Largest offset a `ManualClock` will report; `Instant` cannot represent
/// arbitrary spans past its origin on every platform.
pub const MAX_MANUAL_OFFSET: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Deterministic clock whose time only moves when told to.
///
/// now() = origin + offset, with offset saturating at `MAX_MANUAL_OFFSET`
/// sleep(d) advances internal time by d without actually sleeping, so a
/// polling loop driven by this clock runs at full speed. Clones share the
/// same offset.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// The instant this clock reads at offset zero.
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = off.saturating_add(d).min(MAX_MANUAL_OFFSET);
        }
    }

    /// Set the absolute offset relative to origin.
    pub fn set_offset(&self, d: Duration) {
        if let Ok(mut off) = self.offset.lock() {
            *off = d.min(MAX_MANUAL_OFFSET);
        }
    }

    /// Instant at `secs` seconds past the origin; handy for scripted timelines.
    pub fn at_secs(&self, secs: u64) -> Instant {
        self.at_offset(Duration::from_secs(secs))
    }

    fn at_offset(&self, off: Duration) -> Instant {
        let off = off.min(MAX_MANUAL_OFFSET);
        self.origin
            .checked_add(off)
            .or_else(|| self.origin.checked_add(MAX_MANUAL_OFFSET))
            .unwrap_or(self.origin)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
        self.at_offset(off)
    }

    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);
        clock.sleep(Duration::from_millis(1500));
        assert_eq!(clock.ms_since(t0), 1500);
    }

    #[test]
    fn manual_clock_saturates_huge_advances() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_secs(u64::MAX));
        clock.advance(Duration::MAX);
        assert_eq!(clock.now().duration_since(clock.origin()), MAX_MANUAL_OFFSET);
        clock.set_offset(Duration::MAX);
        assert_eq!(clock.now().duration_since(clock.origin()), MAX_MANUAL_OFFSET);
        assert_eq!(clock.at_secs(u64::MAX), clock.now());
    }

    #[test]
    fn clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(Duration::from_secs(3));
        assert_eq!(b.now(), b.at_secs(3));
        b.set_offset(Duration::from_secs(1));
        assert_eq!(a.now(), a.at_secs(1));
    }

    #[test]
    fn ms_since_saturates_for_future_epoch() {
        let clock = ManualClock::new();
        let future = clock.at_secs(10);
        assert_eq!(clock.ms_since(future), 0);
    }
}
