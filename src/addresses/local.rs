//! Local interface address source
//!
//! Interface enumeration is an external collaborator, kept behind a
//! trait.

use std::net::{IpAddr, UdpSocket};

use crate::errors::{IpLocatorError, Result};

pub trait LocalAddressSource: Send + Sync {
    /// Enumerate addresses bound to this host's interfaces
    fn local_addresses(&self) -> Result<Vec<IpAddr>>;
}

/// Probes the host's egress addresses via connected UDP sockets
///
/// connect() only fixes the route, no packets are sent; v4 and v6 are
/// probed independently.
pub struct UdpProbeSource;

impl UdpProbeSource {
    fn probe(bind: &str, target: &str) -> Option<IpAddr> {
        let socket = UdpSocket::bind(bind).ok()?;
        socket.connect(target).ok()?;
        socket.local_addr().ok().map(|addr| addr.ip())
    }
}

impl LocalAddressSource for UdpProbeSource {
    fn local_addresses(&self) -> Result<Vec<IpAddr>> {
        let mut addresses = Vec::new();

        if let Some(address) = Self::probe("0.0.0.0:0", "8.8.8.8:80") {
            addresses.push(address);
        }
        if let Some(address) = Self::probe("[::]:0", "[2001:4860:4860::8888]:80") {
            addresses.push(address);
        }

        if addresses.is_empty() {
            Err(IpLocatorError::no_address_available(
                "no local interface address could be determined",
            ))
        } else {
            Ok(addresses)
        }
    }
}
