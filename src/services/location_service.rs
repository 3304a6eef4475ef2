//! Location resolution service
//!
//! The per-request state machine: same-location short-circuit, store
//! lookup with cache fallback, staleness check, provider-chain refresh,
//! persistence. Every normal path terminates in a `Location` (possibly
//! a sentinel); only invalid input, cancellation, and a missing public
//! address (for the current-location variant) surface as errors.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::addresses::{AddressBook, SameLocationClassifier};
use crate::cache::LocationCache;
use crate::errors::{IpLocatorError, Result};
use crate::providers::ProviderChain;
use crate::repository::{Location, LocationRepository};
use crate::utils::location_id;

pub struct LocationService {
    repository: Arc<dyn LocationRepository>,
    cache: Arc<dyn LocationCache>,
    providers: ProviderChain,
    classifier: SameLocationClassifier,
    addresses: Arc<AddressBook>,
    stale_after_days: i64,
}

/// Race one suspension point against the cancellation signal
async fn guard<T>(cancel: &CancellationToken, fut: impl Future<Output = T> + Send) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(IpLocatorError::cancelled("resolution aborted by caller")),
        out = fut => Ok(out),
    }
}

impl LocationService {
    pub fn new(
        repository: Arc<dyn LocationRepository>,
        cache: Arc<dyn LocationCache>,
        providers: ProviderChain,
        classifier: SameLocationClassifier,
        addresses: Arc<AddressBook>,
        stale_after_days: i64,
    ) -> Self {
        Self {
            repository,
            cache,
            providers,
            classifier,
            addresses,
            stale_after_days,
        }
    }

    pub fn address_book(&self) -> &Arc<AddressBook> {
        &self.addresses
    }

    pub fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    /// Resolve the geographic location of an arbitrary IP
    pub async fn resolve_location(
        &self,
        ip: &str,
        user_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Location> {
        if self.classifier.is_same_location(ip)? {
            // same-location sentinel, no storage or network I/O
            return Ok(Location::unknown(ip));
        }

        self.lookup_and_refresh(ip, user_id, cancel).await
    }

    /// Resolve where this instance appears to be from the outside
    pub async fn resolve_current_location(
        &self,
        user_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Location> {
        let address = self.addresses.first_public_address()?;
        self.resolve_location(&address.to_string(), user_id, cancel).await
    }

    async fn lookup_and_refresh(
        &self,
        ip: &str,
        user_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Location> {
        let id = location_id(ip);

        // A store failure does not abort resolution; fall back to the cache
        let found = match guard(cancel, self.repository.get_by_id(&id)).await? {
            Ok(found) => found,
            Err(e) => {
                error!(
                    "Error occurred while fetching location from store [\"{}\"]: {}",
                    ip, e
                );
                self.cache.get(&id).await
            }
        };

        // Found records refresh via update, missing ones via create
        let is_update = found.is_some();

        if let Some(location) = &found
            && !location.is_stale(self.stale_after_days)
        {
            // fresh hit, no network I/O
            return Ok(location.clone());
        }

        match self.providers.resolve_with_fallback(ip, cancel).await {
            Ok(mut location) => {
                location.last_updated = Some(Utc::now());
                guard(cancel, self.persist(&location, is_update, user_id)).await?;
                info!(
                    "Location resolved: {} -> {}, {}, {}",
                    location.ip, location.city, location.region, location.country
                );
                Ok(location)
            }
            Err(e @ IpLocatorError::Cancelled(_)) => Err(e),
            Err(e) => {
                // total provider failure: return a sentinel, never persist it
                warn!(
                    "All providers failed for \"{}\", returning unknown location: {}",
                    ip, e
                );
                Ok(Location::unknown(ip))
            }
        }
    }

    /// Persist a refreshed record and write through the cache
    ///
    /// A failed write gets one best-effort corrective update; further
    /// failures are swallowed.
    async fn persist(&self, location: &Location, is_update: bool, user_id: Option<&str>) {
        let result = if is_update {
            self.repository.update(location, user_id).await
        } else {
            self.repository.create(location).await
        };

        if let Err(e) = result {
            error!(
                "Error occurred while persisting location [\"{}\"]: {}",
                location.ip, e
            );
            if let Err(e) = self.repository.update(location, user_id).await {
                warn!("Corrective update failed for \"{}\": {}", location.ip, e);
            }
        }

        self.cache.set(location.clone()).await;
    }
}
