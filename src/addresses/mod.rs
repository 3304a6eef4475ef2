//! Instance address book
//!
//! Two process-wide address sets: local (bound to this host's
//! interfaces) and public (visible from the internet). Discovered once
//! at startup, read-only afterwards.

use std::net::IpAddr;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::errors::{IpLocatorError, Result};
use crate::fetch::HttpFetcher;

pub mod classifier;
pub mod echo;
pub mod local;

pub use classifier::SameLocationClassifier;
pub use local::{LocalAddressSource, UdpProbeSource};

/// Local and public address sets, ordered and deduplicated
#[derive(Default)]
pub struct AddressBook {
    local: RwLock<Vec<IpAddr>>,
    public: RwLock<Vec<IpAddr>>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add-if-absent; returns whether the address was inserted
    pub fn add_local(&self, address: IpAddr) -> bool {
        let mut local = self.local.write();
        if local.contains(&address) {
            return false;
        }
        local.push(address);
        true
    }

    /// Add-if-absent; returns whether the address was inserted.
    /// Late echo results are merged through the same path.
    pub fn add_public(&self, address: IpAddr) -> bool {
        let mut public = self.public.write();
        if public.contains(&address) {
            return false;
        }
        public.push(address);
        true
    }

    pub fn local_addresses(&self) -> Vec<IpAddr> {
        self.local.read().clone()
    }

    pub fn public_addresses(&self) -> Vec<IpAddr> {
        self.public.read().clone()
    }

    /// First public address whose textual form contains a separator
    /// (i.e. a syntactically complete address), falling back to the
    /// first element; `NoAddressAvailable` when the set is empty
    pub fn first_public_address(&self) -> Result<IpAddr> {
        let public = self.public.read();

        for address in public.iter() {
            let text = address.to_string();
            if text.contains('.') || text.contains(':') {
                return Ok(*address);
            }
        }

        public.first().copied().ok_or_else(|| {
            IpLocatorError::no_address_available("no public address has been discovered")
        })
    }

    /// One-shot address discovery at startup
    ///
    /// A failed local enumeration is logged and leaves the local set
    /// empty. The two public echo probes race; the slower one keeps
    /// running in the background and its late result is added if absent.
    pub async fn discover(
        self: Arc<Self>,
        fetcher: Arc<dyn HttpFetcher>,
        source: &dyn LocalAddressSource,
        cancel: &CancellationToken,
    ) {
        match source.local_addresses() {
            Ok(addresses) => {
                for address in addresses {
                    self.add_local(address);
                }
                info!("Local addresses: {:?}", self.local_addresses());
            }
            Err(e) => {
                error!("Error occurred while preparing local IP addresses: {}", e);
            }
        }

        let dyndns = tokio::spawn(echo::probe(
            Arc::clone(&self),
            Arc::clone(&fetcher),
            echo::DYNDNS_ENDPOINT,
            cancel.clone(),
        ));
        let ipify = tokio::spawn(echo::probe(
            Arc::clone(&self),
            Arc::clone(&fetcher),
            echo::IPIFY_ENDPOINT,
            cancel.clone(),
        ));

        // Wait for the first probe only; dropping the other JoinHandle
        // leaves its task running
        tokio::select! {
            _ = dyndns => {}
            _ = ipify => {}
        }
    }
}
