use core::{fmt, num::ParseIntError, str::FromStr};

/// Width of the timestamp field in bits.
pub const TIMESTAMP_BITS: u32 = 41;

/// Width of the worker id field in bits.
pub const WORKER_ID_BITS: u32 = 10;

/// Width of the sequence field in bits.
pub const SEQUENCE_BITS: u32 = 12;

/// Bitmask for the 41-bit timestamp field once shifted down.
pub const TIMESTAMP_MASK: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Bitmask for the 10-bit worker id field once shifted down.
pub const WORKER_ID_MASK: u64 = (1 << WORKER_ID_BITS) - 1;

/// Bitmask for the 12-bit sequence field.
pub const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// Number of bits to shift the timestamp to its position (bit 22).
pub const TIMESTAMP_SHIFT: u32 = WORKER_ID_BITS + SEQUENCE_BITS;

/// Number of bits to shift the worker id to its position (bit 12).
pub const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;

/// Largest worker id accepted by the generator. Zero is reserved.
pub const MAX_WORKER_ID: u64 = WORKER_ID_MASK;

/// Number of distinct sequence values used per millisecond.
///
/// The sequence counter wraps modulo the mask rather than `1 << 12`, so only
/// `0..=4094` is ever emitted and 4095 never appears in a generated ID.
pub const SEQUENCE_SPACE: u64 = SEQUENCE_MASK;

/// Packs the three fields into a raw 64-bit ID.
///
/// No range checks are performed. A field wider than its slot bleeds into its
/// neighbour; callers validate before encoding.
///
/// ```
/// assert_eq!(snowgen::encode(1, 1, 1), 0x401001);
/// ```
#[inline]
pub const fn encode(timestamp: u64, worker_id: u64, sequence: u64) -> u64 {
    (timestamp << TIMESTAMP_SHIFT) | (worker_id << WORKER_ID_SHIFT) | sequence
}

/// Splits a raw ID into its fields. Every bit pattern decodes to something.
///
/// ```
/// use snowgen::{DecodedId, decode};
///
/// assert_eq!(
///     decode(0x1001),
///     DecodedId { id: 0x1001, timestamp: 0, worker_id: 1, sequence: 1 }
/// );
/// ```
#[inline]
pub const fn decode(id: u64) -> DecodedId {
    DecodedId {
        id,
        timestamp: id >> TIMESTAMP_SHIFT,
        worker_id: ((id >> WORKER_ID_SHIFT) & WORKER_ID_MASK) as u16,
        sequence: (id & SEQUENCE_MASK) as u16,
    }
}

/// The logical fields of an ID, reconstructed for inspection and logging.
///
/// With the `serde` feature this serializes as
/// `{"id": .., "ts": .., "worker": .., "seq": ..}`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DecodedId {
    /// The raw packed value.
    pub id: u64,
    /// Milliseconds since [`EPOCH`](crate::EPOCH).
    #[cfg_attr(feature = "serde", serde(rename = "ts"))]
    pub timestamp: u64,
    #[cfg_attr(feature = "serde", serde(rename = "worker"))]
    pub worker_id: u16,
    #[cfg_attr(feature = "serde", serde(rename = "seq"))]
    pub sequence: u16,
}

/// A 64-bit Snowflake ID.
///
/// ```text
///  Bit Index:  63           63 62            22 21             12 11             0
///              +--------------+----------------+-----------------+---------------+
///  Field:      | reserved (1) | timestamp (41) |  worker ID (10) | sequence (12) |
///              +--------------+----------------+-----------------+---------------+
///              |<----------- MSB ---------- 64 bits ----------- LSB ------------>|
/// ```
///
/// Ordering follows the raw value, so IDs sort by timestamp first, then worker
/// id, then sequence.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Builds an ID from its fields. See [`encode`] for the overflow caveat.
    pub const fn from_components(timestamp: u64, worker_id: u64, sequence: u64) -> Self {
        debug_assert!(timestamp <= TIMESTAMP_MASK, "timestamp overflow");
        debug_assert!(worker_id <= WORKER_ID_MASK, "worker_id overflow");
        debug_assert!(sequence <= SEQUENCE_MASK, "sequence overflow");
        Self {
            id: encode(timestamp, worker_id, sequence),
        }
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Milliseconds since [`EPOCH`](crate::EPOCH).
    pub const fn timestamp(&self) -> u64 {
        self.id >> TIMESTAMP_SHIFT
    }

    pub const fn worker_id(&self) -> u64 {
        (self.id >> WORKER_ID_SHIFT) & WORKER_ID_MASK
    }

    pub const fn sequence(&self) -> u64 {
        self.id & SEQUENCE_MASK
    }

    pub const fn decode(&self) -> DecodedId {
        decode(self.id)
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts the same
    /// lexicographically as numerically.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<SnowflakeId> for DecodedId {
    fn from(id: SnowflakeId) -> Self {
        id.decode()
    }
}

impl FromStr for SnowflakeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self::from_raw)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeId")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
