//! Coordinator-free, time-ordered 64-bit Snowflake IDs.
//!
//! Every ID packs a millisecond timestamp (relative to [`EPOCH`]), a 10-bit
//! worker id and a 12-bit sequence:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21             12 11             0
//!              +--------------+----------------+-----------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) |  worker ID (10) | sequence (12) |
//!              +--------------+----------------+-----------------+---------------+
//! ```
//!
//! A typical composition root resolves a worker id once, builds a single
//! [`SnowflakeGenerator`] and shares it:
//!
//! ```no_run
//! use snowgen::SnowflakeGenerator;
//!
//! let worker_id = snowgen::resolve()?;
//! let generator = SnowflakeGenerator::new(worker_id)?;
//!
//! let id = generator.next_id();
//! println!("{:?}", id.decode());
//! # Ok::<(), snowgen::Error>(())
//! ```

mod error;
mod generator;
mod id;
mod time;
mod worker;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
pub use crate::worker::*;
