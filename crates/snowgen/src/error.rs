use core::time::Duration;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `snowgen` can emit.
///
/// The resolver and constructor errors are startup failures: a process that
/// hits them has no usable worker identity and should abort. The clock
/// variants are only produced by [`SnowflakeGenerator::try_next_id`]; the
/// plain [`SnowflakeGenerator::next_id`] path never fails.
///
/// [`SnowflakeGenerator::try_next_id`]: crate::SnowflakeGenerator::try_next_id
/// [`SnowflakeGenerator::next_id`]: crate::SnowflakeGenerator::next_id
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The host's network interfaces could not be listed.
    #[error("failed to enumerate network interface addresses")]
    AddressEnumerationFailed(#[source] std::io::Error),

    /// No interface carries a private or link-local IPv4 address.
    #[error("no private ipv4 address found on any network interface")]
    NoPrivateAddressFound,

    /// The worker id is outside `1..=1023`.
    #[error("worker id {worker_id} invalid, expected 1..={max}", max = crate::MAX_WORKER_ID)]
    InvalidWorkerId {
        /// The rejected value, widened so negative inputs survive.
        worker_id: i64,
    },

    /// The clock reported a timestamp earlier than the last emitted one.
    #[error("clock moved backwards: last timestamp {last}, now {now}")]
    ClockMovedBackwards {
        /// Last timestamp recorded by the generator.
        last: u64,
        /// The earlier timestamp the clock just returned.
        now: u64,
    },

    /// The sequence space was exhausted and the clock did not tick within the
    /// configured spin budget.
    #[error("clock did not advance within {waited:?}")]
    SpinTimeout {
        /// How long the generator spun before giving up.
        waited: Duration,
    },
}
