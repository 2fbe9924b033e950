//! Worker identity: how a process picks the 10-bit id stamped into its IDs.
//!
//! [`WorkerIdProvider`] is the seam. [`PrivateIpv4Provider`] derives an id
//! from the host's private address and [`StaticWorkerId`] passes a configured
//! one through, so a coordinator-assigned strategy can slot in beside them
//! without touching the generator.

mod interface;
mod private_ipv4;

pub use interface::*;
pub use private_ipv4::*;
