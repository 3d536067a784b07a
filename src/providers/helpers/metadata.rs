//! Metadata stamping helper trait.
//!
//! Stamps are what fingerprints are built from and what conditional writes compare
//! on, so they are issued by one clock with two guarantees:
//!
//! - whole seconds, so that a stamp echoed through `Last-Modified` and back through
//!   `If-Unmodified-Since` compares equal to the stored one;
//! - strictly increasing per document, so that two writes in the same second still
//!   produce distinguishable stamps.
//!
//! The second guarantee wins over the first: a burst of writes to one document
//! faster than one per second pushes its stamps ahead of the wall clock, one
//! second per write. The lead is kept until the clock passes the last stamp.
//!
//! ```rust
//! use chrono::{DateTime, TimeZone, Utc};
//! use movie_catalog::providers::helpers::MetadataManager;
//!
//! struct FrozenClock;
//!
//! impl MetadataManager for FrozenClock {
//!     fn clock_now(&self) -> DateTime<Utc> {
//!         Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, 9).unwrap()
//!     }
//! }
//!
//! let first = FrozenClock.next_stamp(None);
//! let second = FrozenClock.next_stamp(Some(first));
//! assert!(second > first);
//! ```

use crate::providers::ProviderResult;
use crate::resource::Meta;
use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Metadata management with overridable clock.
pub trait MetadataManager {
    /// Wall-clock time. Override for deterministic tests.
    fn clock_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Next stamp for a document whose current stamp is `previous`.
    ///
    /// Never earlier than `previous + 1s`, so under sustained writes the stamp can
    /// run ahead of `clock_now`.
    fn next_stamp(&self, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = self.clock_now().trunc_subsecs(0);
        match previous {
            Some(previous) if now <= previous => previous.trunc_subsecs(0) + Duration::seconds(1),
            _ => now,
        }
    }

    /// Metadata for a resource created now.
    fn creation_meta(&self, resource_type: &str) -> ProviderResult<Meta> {
        Ok(Meta::created_at(resource_type, self.next_stamp(None))?)
    }

    /// Metadata of `meta` touched at `stamp`.
    fn touch_meta(&self, meta: &Meta, stamp: DateTime<Utc>) -> ProviderResult<Meta> {
        Ok(meta.touched(stamp)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct FixedClock(DateTime<Utc>);

    impl MetadataManager for FixedClock {
        fn clock_now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn at(second: u32, millis: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 1, 6, 6, 13, second).unwrap() + Duration::milliseconds(millis)
    }

    #[test]
    fn test_stamps_are_whole_seconds() {
        let clock = FixedClock(at(9, 750));
        assert_eq!(clock.next_stamp(None), at(9, 0));
    }

    #[test]
    fn test_stamps_strictly_increase_within_a_second() {
        let clock = FixedClock(at(9, 100));
        let first = clock.next_stamp(None);
        let second = clock.next_stamp(Some(first));
        let third = clock.next_stamp(Some(second));

        assert_eq!(second, at(10, 0));
        assert_eq!(third, at(11, 0));
    }

    #[test]
    fn test_burst_runs_ahead_of_clock_by_one_second_per_write() {
        let clock = FixedClock(at(9, 0));
        let mut stamp = clock.next_stamp(None);

        for _ in 0..100 {
            let next = clock.next_stamp(Some(stamp));
            assert!(next > stamp);
            stamp = next;
        }

        assert_eq!(stamp, at(9, 0) + Duration::seconds(100));
        assert_eq!(stamp, Utc.with_ymd_and_hms(2016, 1, 6, 6, 14, 49).unwrap());
    }

    #[test]
    fn test_clock_wins_once_it_catches_up() {
        let clock = FixedClock(at(30, 0));
        assert_eq!(clock.next_stamp(Some(at(12, 0))), at(30, 0));
    }

    #[test]
    fn test_touch_preserves_creation() {
        let clock = FixedClock(at(9, 0));
        let meta = clock.creation_meta("Movie").unwrap();
        let touched = clock.touch_meta(&meta, at(20, 0)).unwrap();

        assert_eq!(touched.created(), at(9, 0));
        assert_eq!(touched.last_modified(), at(20, 0));
        assert_eq!(touched.resource_type(), "Movie");
    }
}
