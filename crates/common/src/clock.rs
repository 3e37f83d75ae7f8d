//! Time source abstraction.
//!
//! Instruments never read system time directly: the registry injects a
//! `Clock`, which lets tests substitute [`ZeroTimeClock`] and assert on
//! deterministic output.

use crate::timestamp::Timestamp;
use std::fmt;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of wall-clock timestamps and a monotonic nanosecond counter.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current wall-clock time.
    fn now(&self) -> Timestamp;

    /// Monotonic nanosecond reading. Only differences between readings are meaningful.
    fn now_nanos(&self) -> i64;
}

/// Clock backed by the operating system.
///
/// The wall-clock epoch offset is sampled once at construction; afterwards
/// both `now()` and `now_nanos()` are derived from a single `Instant` sample,
/// so the two readings agree and `now()` never steps backwards.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    anchor: Instant,
    anchor_epoch_nanos: i64,
}

impl SystemClock {
    /// Create a clock anchored at the current system time.
    #[must_use]
    pub fn new() -> Self {
        let anchor = Instant::now();
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            anchor,
            anchor_epoch_nanos: i64::try_from(since_epoch.as_nanos()).unwrap_or(i64::MAX),
        }
    }

    fn elapsed_nanos(&self) -> i64 {
        i64::try_from(self.anchor.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.now_nanos())
    }

    fn now_nanos(&self) -> i64 {
        self.anchor_epoch_nanos.saturating_add(self.elapsed_nanos())
    }
}

/// A clock that is permanently stopped at the epoch.
///
/// Stateless: every instance is interchangeable with every other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroTimeClock;

impl ZeroTimeClock {
    /// Create a zero clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for ZeroTimeClock {
    fn now(&self) -> Timestamp {
        Timestamp::ZERO
    }

    fn now_nanos(&self) -> i64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn zero_clock_is_always_zero() {
        let clock = ZeroTimeClock::new();
        for _ in 0..1_000 {
            assert_eq!(clock.now(), Timestamp::ZERO);
            assert_eq!(clock.now_nanos(), 0);
        }
    }

    #[test]
    fn zero_clock_is_zero_from_any_thread() {
        let clock: Arc<dyn Clock> = Arc::new(ZeroTimeClock);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let clock = Arc::clone(&clock);
                thread::spawn(move || (clock.now(), clock.now_nanos()))
            })
            .collect();

        for handle in handles {
            let joined = handle.join();
            assert!(matches!(joined, Ok((Timestamp::ZERO, 0))));
        }
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let mut previous = clock.now_nanos();
        for _ in 0..100 {
            let next = clock.now_nanos();
            assert!(next >= previous);
            previous = next;
        }
    }

    #[test]
    fn system_clock_readings_agree() {
        let clock = SystemClock::new();
        let before = clock.now_nanos();
        let ts = clock.now();
        let after = clock.now_nanos();
        assert!(ts.as_nanos() >= before);
        assert!(ts.as_nanos() <= after);
        assert!(ts.seconds() > 1_500_000_000, "anchored to the Unix epoch");
    }
}
