use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

/// Reference instant for every timestamp: Thursday, November 4, 2010
/// 1:42:54.657 UTC. 41 bits of milliseconds from here last roughly 69 years.
pub const EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// A source of millisecond timestamps relative to some epoch.
///
/// This abstraction lets the generator run against the wall clock in
/// production and against a scripted clock in tests.
///
/// # Example
///
/// ```
/// use snowgen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// Wall-clock time source: `SystemTime::now()` minus an epoch.
///
/// Every call reads the system clock, so NTP steps and manual adjustments are
/// visible to the generator. Readings before the epoch clamp to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// A clock aligned to [`EPOCH`].
    fn default() -> Self {
        Self::with_epoch(EPOCH)
    }
}

impl SystemClock {
    /// Creates a clock whose zero point is `epoch`, given as a duration since
    /// 1970-01-01 UTC.
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self { epoch }
    }

    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let since_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        since_unix.saturating_sub(self.epoch).as_millis() as u64
    }
}

/// Milliseconds elapsed since [`EPOCH`] according to the wall clock.
pub fn current_relative_timestamp() -> u64 {
    SystemClock::default().current_millis()
}
