use std::{
    io,
    net::{IpAddr, Ipv4Addr},
};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    id::WORKER_ID_MASK,
    worker::WorkerIdProvider,
};

/// Lists the addresses assigned to the host's network interfaces.
pub trait AddressSource {
    /// # Errors
    /// Returns the underlying I/O error if the interfaces cannot be listed.
    fn addresses(&self) -> io::Result<Vec<IpAddr>>;
}

/// Reads interface addresses from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAddresses;

impl AddressSource for SystemAddresses {
    fn addresses(&self) -> io::Result<Vec<IpAddr>> {
        Ok(if_addrs::get_if_addrs()?
            .into_iter()
            .map(|iface| iface.ip())
            .collect())
    }
}

impl AddressSource for Vec<IpAddr> {
    fn addresses(&self) -> io::Result<Vec<IpAddr>> {
        Ok(self.clone())
    }
}

/// Derives the worker id from the first private IPv4 address on the host.
///
/// Addresses are scanned in the order the source reports them. Loopback is
/// skipped; the first address inside `10.0.0.0/8`, `172.16.0.0/12`,
/// `192.168.0.0/16` or the link-local `169.254.0.0/16` wins, and its last two
/// octets masked to 10 bits become the id. Different hosts usually get
/// different ids, but two addresses equal modulo 1024 collide.
///
/// # Example
/// ```
/// use snowgen::{PrivateIpv4Provider, WorkerIdProvider};
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let addrs = vec![
///     IpAddr::V4(Ipv4Addr::LOCALHOST),
///     IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
/// ];
/// let provider = PrivateIpv4Provider::with_source(addrs);
/// assert_eq!(provider.worker_id().unwrap(), (1 << 8 | 10) & 1023);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrivateIpv4Provider<S = SystemAddresses> {
    source: S,
}

impl<S> PrivateIpv4Provider<S>
where
    S: AddressSource,
{
    pub fn with_source(source: S) -> Self {
        Self { source }
    }
}

impl<S> WorkerIdProvider for PrivateIpv4Provider<S>
where
    S: AddressSource,
{
    /// # Errors
    /// - [`Error::AddressEnumerationFailed`] if the address source fails.
    /// - [`Error::NoPrivateAddressFound`] if no address qualifies.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self), err))]
    fn worker_id(&self) -> Result<u16> {
        let addresses = self
            .source
            .addresses()
            .map_err(Error::AddressEnumerationFailed)?;

        let ip = addresses
            .into_iter()
            .filter(|ip| !ip.is_loopback())
            .filter_map(as_ipv4)
            .find(|ip| is_private_ipv4(*ip))
            .ok_or(Error::NoPrivateAddressFound)?;

        let worker_id = derive_worker_id(ip);
        #[cfg(feature = "tracing")]
        tracing::debug!(%ip, worker_id, "derived worker id from private address");
        Ok(worker_id)
    }
}

/// Resolves the worker id from the host's interfaces with
/// [`PrivateIpv4Provider`].
///
/// # Errors
/// See [`PrivateIpv4Provider`].
pub fn resolve() -> Result<u16> {
    PrivateIpv4Provider::<SystemAddresses>::default().worker_id()
}

/// True for RFC 1918 private and RFC 3927 link-local addresses.
pub fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_link_local()
}

/// Folds the last two octets into a 10-bit worker id.
pub fn derive_worker_id(ip: Ipv4Addr) -> u16 {
    let [_, _, hi, lo] = ip.octets();
    u16::from_be_bytes([hi, lo]) & WORKER_ID_MASK as u16
}

// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) count as IPv4.
fn as_ipv4(ip: IpAddr) -> Option<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}
