//! Wall-clock timestamps with nanosecond resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Nanoseconds in one second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_SECOND_U32: u32 = 1_000_000_000;

/// A point in time: seconds since the Unix epoch plus a nanosecond remainder.
///
/// `nanos` is always in `0..NANOS_PER_SECOND`; negative instants carry the
/// sign in `seconds` (e.g. -0.5s is `{ seconds: -1, nanos: 500_000_000 }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp {
    seconds: i64,
    nanos: u32,
}

impl Timestamp {
    /// The Unix epoch.
    pub const ZERO: Self = Self {
        seconds: 0,
        nanos: 0,
    };

    /// Build a timestamp from seconds and a nanosecond remainder.
    ///
    /// Returns `None` when `nanos` is out of `0..1_000_000_000`.
    #[must_use]
    pub const fn new(seconds: i64, nanos: u32) -> Option<Self> {
        if nanos >= NANOS_PER_SECOND_U32 {
            return None;
        }
        Some(Self { seconds, nanos })
    }

    /// Build a timestamp from a signed nanosecond count since the epoch.
    #[must_use]
    pub fn from_nanos(total: i64) -> Self {
        let seconds = total.div_euclid(NANOS_PER_SECOND);
        // rem_euclid is within 0..1e9, so the conversion cannot fail.
        let nanos = u32::try_from(total.rem_euclid(NANOS_PER_SECOND)).unwrap_or(0);
        Self { seconds, nanos }
    }

    /// Build a timestamp from a duration since the epoch, saturating at `i64::MAX` seconds.
    #[must_use]
    pub fn from_unix_duration(duration: Duration) -> Self {
        Self {
            seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
            nanos: duration.subsec_nanos(),
        }
    }

    /// Seconds since the epoch.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.seconds
    }

    /// Nanosecond remainder in `0..1_000_000_000`.
    #[must_use]
    pub const fn nanos(self) -> u32 {
        self.nanos
    }

    /// Total nanoseconds since the epoch, saturating on overflow.
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.seconds
            .saturating_mul(NANOS_PER_SECOND)
            .saturating_add(self.nanos as i64)
    }

    /// Return a timestamp shifted by `delta` nanoseconds (saturating).
    #[must_use]
    pub fn add_nanos(self, delta: i64) -> Self {
        Self::from_nanos(self.as_nanos().saturating_add(delta))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}.{:09}", self.seconds, self.nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_epoch() {
        assert_eq!(Timestamp::ZERO.seconds(), 0);
        assert_eq!(Timestamp::ZERO.nanos(), 0);
        assert_eq!(Timestamp::ZERO, Timestamp::default());
        assert_eq!(Timestamp::ZERO.to_string(), "0.000000000");
    }

    #[test]
    fn new_rejects_overflowing_nanos() {
        assert!(Timestamp::new(1, 999_999_999).is_some());
        assert!(Timestamp::new(1, 1_000_000_000).is_none());
    }

    #[test]
    fn negative_nanos_borrow_from_seconds() {
        let ts = Timestamp::from_nanos(-500_000_000);
        assert_eq!(ts.seconds(), -1);
        assert_eq!(ts.nanos(), 500_000_000);
    }

    #[test]
    fn add_nanos_carries_into_seconds() {
        let ts = Timestamp::from_nanos(999_999_999).add_nanos(2);
        assert_eq!(ts.seconds(), 1);
        assert_eq!(ts.nanos(), 1);
    }

    #[test]
    fn extreme_nanos_stay_in_range() {
        let low = Timestamp::from_nanos(i64::MIN);
        assert_eq!(low.seconds(), -9_223_372_037);
        assert_eq!(low.nanos(), 145_224_192);

        let high = Timestamp::from_nanos(i64::MAX);
        assert_eq!(high.nanos(), 854_775_807);
        assert_eq!(high.as_nanos(), i64::MAX);
    }

    proptest! {
        #[test]
        fn nanos_survive_conversion(total in -1_000_000_000_000_000_000i64..1_000_000_000_000_000_000i64) {
            let ts = Timestamp::from_nanos(total);
            prop_assert!(i64::from(ts.nanos()) < NANOS_PER_SECOND);
            prop_assert_eq!(ts.as_nanos(), total);
        }
    }
}
