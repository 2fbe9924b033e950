use core::{cmp::Ordering, hint, time::Duration};
use std::time::Instant;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    id::{MAX_WORKER_ID, SEQUENCE_SPACE, SnowflakeId, encode},
    time::{SystemClock, TimeSource},
};

/// Mutable generation state, only ever touched under the generator's lock.
#[derive(Debug, Clone, Copy)]
struct State {
    last_timestamp: u64,
    sequence: u64,
}

impl State {
    fn next_sequence(&self) -> u64 {
        (self.sequence + 1) % SEQUENCE_SPACE
    }

    fn commit(&mut self, timestamp: u64, sequence: u64) {
        self.last_timestamp = timestamp;
        self.sequence = sequence;
    }
}

/// A lock-based Snowflake ID generator, safe to share across threads.
///
/// Each call increments the sequence modulo [`SEQUENCE_SPACE`] and stamps the
/// current tick. When the sequence wraps to zero inside the tick that already
/// produced IDs, the caller spins on the clock until the next millisecond
/// while still holding the lock. This caps throughput at 4095 IDs per
/// millisecond per generator and makes every other caller wait behind the
/// spinning one.
///
/// Successive IDs from one generator are strictly increasing as long as the
/// clock does not move backwards. Timestamps wider than 41 bits are packed
/// unchecked, as [`encode`] does.
///
/// ## Clock failure
/// [`next_id`](Self::next_id) never fails. A frozen clock makes it spin
/// forever, and a clock that steps backwards makes it emit IDs smaller than
/// ones already handed out. Deployments that cannot accept either should call
/// [`try_next_id`](Self::try_next_id) on a generator configured with
/// [`with_max_spin`](Self::with_max_spin).
///
/// # Example
/// ```
/// use snowgen::SnowflakeGenerator;
///
/// let generator = SnowflakeGenerator::new(1)?;
/// let a = generator.next_id();
/// let b = generator.next_id();
/// assert!(a < b);
/// assert_eq!(a.worker_id(), 1);
/// # Ok::<(), snowgen::Error>(())
/// ```
pub struct SnowflakeGenerator<T = SystemClock>
where
    T: TimeSource,
{
    state: Mutex<State>,
    worker_id: u64,
    max_spin: Option<Duration>,
    time: T,
}

impl SnowflakeGenerator<SystemClock> {
    /// Creates a generator stamping IDs with the wall clock relative to
    /// [`EPOCH`](crate::EPOCH).
    ///
    /// # Errors
    /// Returns [`Error::InvalidWorkerId`] unless `0 < worker_id <= 1023`.
    pub fn new(worker_id: impl Into<i64>) -> Result<Self> {
        Self::with_time(worker_id, SystemClock::default())
    }
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator reading timestamps from `time`.
    ///
    /// The sequence starts one below its wrap point so the first ID lands on
    /// sequence 0 at the current tick.
    ///
    /// # Errors
    /// Returns [`Error::InvalidWorkerId`] unless `0 < worker_id <= 1023`.
    pub fn with_time(worker_id: impl Into<i64>, time: T) -> Result<Self> {
        Self::from_components(0, worker_id, SEQUENCE_SPACE - 1, time)
    }

    /// Creates a generator preloaded with an explicit last timestamp and
    /// sequence.
    ///
    /// Mostly useful in tests, or to resume past a known high-water mark after
    /// a restart. `sequence` is reduced modulo [`SEQUENCE_SPACE`].
    ///
    /// # Errors
    /// Returns [`Error::InvalidWorkerId`] unless `0 < worker_id <= 1023`.
    pub fn from_components(
        timestamp: u64,
        worker_id: impl Into<i64>,
        sequence: u64,
        time: T,
    ) -> Result<Self> {
        let worker_id = validate_worker_id(worker_id.into())?;
        Ok(Self {
            state: Mutex::new(State {
                last_timestamp: timestamp,
                sequence: sequence % SEQUENCE_SPACE,
            }),
            worker_id,
            max_spin: None,
            time,
        })
    }

    /// Bounds how long [`try_next_id`](Self::try_next_id) may spin waiting for
    /// the next tick before giving up with [`Error::SpinTimeout`].
    ///
    /// Has no effect on [`next_id`](Self::next_id).
    #[must_use]
    pub fn with_max_spin(mut self, max_spin: Duration) -> Self {
        self.max_spin = Some(max_spin);
        self
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id as u16
    }

    pub fn max_spin(&self) -> Option<Duration> {
        self.max_spin
    }

    /// Generates the next ID, spinning on the clock if this tick's sequence
    /// space is exhausted.
    ///
    /// This never fails but does not return while the clock is frozen. See
    /// the type-level docs for the behavior on a backwards clock.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> SnowflakeId {
        let mut state = self.state.lock();

        let sequence = state.next_sequence();
        let mut now = self.time.current_millis();
        while sequence == 0 && now == state.last_timestamp {
            hint::spin_loop();
            now = self.time.current_millis();
        }

        #[cfg(feature = "tracing")]
        {
            if now < state.last_timestamp {
                tracing::warn!(
                    last = state.last_timestamp,
                    now,
                    "clock moved backwards, emitting out-of-order id"
                );
            }
        }

        state.commit(now, sequence);
        SnowflakeId::from_raw(encode(now, self.worker_id, sequence))
    }

    /// Generates the next ID, refusing to emit one that could break ordering.
    ///
    /// State is only updated when an ID is returned, so a failed call can be
    /// retried once the clock recovers.
    ///
    /// # Errors
    /// - [`Error::ClockMovedBackwards`] if the clock reads earlier than the
    ///   last emitted timestamp, either on entry or while spinning.
    /// - [`Error::SpinTimeout`] if the sequence space is exhausted and the
    ///   clock does not tick within [`max_spin`](Self::max_spin). Without a
    ///   limit this spins like [`next_id`](Self::next_id).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.state.lock();

        let last = state.last_timestamp;
        let sequence = state.next_sequence();
        let mut now = self.time.current_millis();
        match now.cmp(&last) {
            Ordering::Less => return Err(Self::cold_clock_behind(last, now)),
            Ordering::Equal if sequence == 0 => now = self.wait_for_tick(last)?,
            _ => {}
        }

        state.commit(now, sequence);
        Ok(SnowflakeId::from_raw(encode(now, self.worker_id, sequence)))
    }

    fn wait_for_tick(&self, last: u64) -> Result<u64> {
        let started = Instant::now();
        loop {
            hint::spin_loop();
            let now = self.time.current_millis();
            match now.cmp(&last) {
                Ordering::Greater => return Ok(now),
                Ordering::Less => return Err(Self::cold_clock_behind(last, now)),
                Ordering::Equal => {}
            }

            if let Some(max_spin) = self.max_spin {
                let waited = started.elapsed();
                if waited >= max_spin {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(?waited, last, "clock did not tick within spin budget");
                    return Err(Error::SpinTimeout { waited });
                }
            }
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last: u64, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(last, now, "clock moved backwards, refusing to generate");
        Error::ClockMovedBackwards { last, now }
    }
}

impl<T> core::fmt::Debug for SnowflakeGenerator<T>
where
    T: TimeSource,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SnowflakeGenerator")
            .field("worker_id", &self.worker_id)
            .field("last_timestamp", &state.last_timestamp)
            .field("sequence", &state.sequence)
            .field("max_spin", &self.max_spin)
            .finish_non_exhaustive()
    }
}

/// Checks that `worker_id` lies in `1..=1023`.
///
/// Zero is reserved. An address-derived id that masks down to zero is rejected
/// here rather than remapped.
pub fn validate_worker_id(worker_id: i64) -> Result<u64> {
    match u64::try_from(worker_id) {
        Ok(id @ 1..=MAX_WORKER_ID) => Ok(id),
        _ => Err(Error::InvalidWorkerId { worker_id }),
    }
}
