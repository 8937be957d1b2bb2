//! Entry lifetime.

use std::time::{Duration, Instant};

/// How long an entry stays live.
///
/// `After(Duration::ZERO)` is an already-expired entry, not "forever".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Expiration {
    #[default]
    Never,
    After(Duration),
}

impl Expiration {
    pub fn from_secs(secs: u64) -> Self {
        Expiration::After(Duration::from_secs(secs))
    }

    pub fn from_millis(millis: u64) -> Self {
        Expiration::After(Duration::from_millis(millis))
    }

    /// True for a zero-length lifetime: the entry is dead on arrival.
    pub fn is_expired(&self) -> bool {
        matches!(self, Expiration::After(d) if d.is_zero())
    }

    /// Absolute deadline relative to `now`, `None` when the entry never expires.
    ///
    /// A lifetime that overflows the clock is treated as never expiring.
    pub fn deadline_from(&self, now: Instant) -> Option<Instant> {
        match self {
            Expiration::Never => None,
            Expiration::After(d) => now.checked_add(*d),
        }
    }

    /// Millisecond TTL for `PX`-style commands, rounded up so sub-millisecond
    /// lifetimes are not silently turned into "no expiry".
    pub fn as_millis(&self) -> Option<u64> {
        match self {
            Expiration::Never => None,
            Expiration::After(d) => {
                let ms = d.as_millis().min(u64::MAX as u128) as u64;
                if d.subsec_nanos() % 1_000_000 != 0 {
                    Some(ms.saturating_add(1))
                } else {
                    Some(ms)
                }
            }
        }
    }
}

impl From<Duration> for Expiration {
    fn from(d: Duration) -> Self {
        Expiration::After(d)
    }
}

impl From<Option<Duration>> for Expiration {
    fn from(d: Option<Duration>) -> Self {
        d.map_or(Expiration::Never, Expiration::After)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_has_no_deadline() {
        assert_eq!(Expiration::Never.deadline_from(Instant::now()), None);
        assert_eq!(Expiration::Never.as_millis(), None);
        assert!(!Expiration::Never.is_expired());
    }

    #[test]
    fn test_zero_duration_is_expired_not_forever() {
        let ttl = Expiration::After(Duration::ZERO);
        assert!(ttl.is_expired());
        assert_eq!(ttl.as_millis(), Some(0));
    }

    #[test]
    fn test_millis_round_up() {
        assert_eq!(Expiration::After(Duration::from_micros(1)).as_millis(), Some(1));
        assert_eq!(Expiration::After(Duration::from_micros(1500)).as_millis(), Some(2));
        assert_eq!(Expiration::from_secs(2).as_millis(), Some(2000));
    }

    #[test]
    fn test_overflowing_lifetime_has_no_deadline() {
        let now = Instant::now();
        assert_eq!(Expiration::After(Duration::MAX).deadline_from(now), None);
        assert_eq!(Expiration::from_secs(u64::MAX).deadline_from(now), None);
        assert!(Expiration::from_secs(5).deadline_from(now).is_some());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Expiration::from(None), Expiration::Never);
        assert_eq!(
            Expiration::from(Some(Duration::from_secs(3))),
            Expiration::from_secs(3)
        );
    }
}
