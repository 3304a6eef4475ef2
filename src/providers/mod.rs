//! External geolocation provider chain
//!
//! Each provider is described by a URL template and an access key; the
//! heterogeneous JSON shapes are normalized into `Location` by one
//! `ResponseParser` per provider. Fallback walks the configured order
//! (first, then second) strictly sequentially, never in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::config::ProviderConfig;
use crate::errors::{IpLocatorError, Result};
use crate::fetch::HttpFetcher;
use crate::repository::Location;

pub mod ipapi;
pub mod ipstack;
pub mod keycdn;

pub use ipapi::IpApiParser;
pub use ipstack::IpStackParser;
pub use keycdn::KeyCdnParser;

/// One external provider, immutable once loaded
#[derive(Debug, Clone)]
pub struct Provider {
    pub name: String,
    pub uri_pattern: String,
    pub access_key: String,
}

impl Provider {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            uri_pattern: config.uri_pattern.clone(),
            access_key: config.access_key.clone(),
        }
    }

    /// Substitute `{ip}` and `{accessKey}` into the URL template
    pub fn build_url(&self, ip: &str) -> String {
        self.uri_pattern
            .replace("{ip}", ip)
            .replace("{accessKey}", &self.access_key)
    }
}

/// Normalize one provider response body into a Location
pub trait ResponseParser: Send + Sync {
    fn parse(&self, body: &str) -> Result<Location>;
}

/// Fetch a JSON field as text
///
/// Numeric values are stringified, missing fields normalize to ""
pub(crate) fn json_text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub struct ProviderChain {
    providers: HashMap<String, Provider>,
    first: String,
    second: String,
    fetcher: Arc<dyn HttpFetcher>,
}

impl ProviderChain {
    pub fn new(
        configs: &[ProviderConfig],
        first: &str,
        second: &str,
        fetcher: Arc<dyn HttpFetcher>,
    ) -> Self {
        let providers = configs
            .iter()
            .filter(|c| !c.name.trim().is_empty() && !c.uri_pattern.trim().is_empty())
            .map(|c| (c.name.to_ascii_lowercase(), Provider::from_config(c)))
            .collect();

        Self {
            providers,
            first: first.to_string(),
            second: second.to_string(),
            fetcher,
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    pub fn first_provider(&self) -> &str {
        &self.first
    }

    pub fn second_provider(&self) -> &str {
        &self.second
    }

    /// Unknown names dispatch to the default provider (ipapi)
    fn canonical(name: &str) -> &'static str {
        match name.to_ascii_lowercase().as_str() {
            "ipstack" => "ipstack",
            "keycdn" => "keycdn",
            _ => "ipapi",
        }
    }

    fn parser_for(name: &str) -> &'static dyn ResponseParser {
        match name {
            "ipstack" => &IpStackParser,
            "keycdn" => &KeyCdnParser,
            _ => &IpApiParser,
        }
    }

    /// Query a single provider and normalize the response
    pub async fn resolve(
        &self,
        provider_name: &str,
        ip: &str,
        cancel: &CancellationToken,
    ) -> Result<Location> {
        let key = Self::canonical(provider_name);
        let provider = self.providers.get(key).ok_or_else(|| {
            IpLocatorError::provider_error(format!("provider {:?} is not configured", key))
        })?;

        let url = provider.build_url(ip);
        let body = self.fetcher.fetch(&url, cancel).await?;

        Self::parser_for(key).parse(&body)
    }

    /// Resolve in chain order: first, then second; both failing returns
    /// the last error
    ///
    /// A success with an empty city is a degraded success: the second
    /// provider is consulted immediately and its result preferred, with
    /// the degraded first result kept if the second fails. Cancellation
    /// propagates without triggering fallback.
    pub async fn resolve_with_fallback(
        &self,
        ip: &str,
        cancel: &CancellationToken,
    ) -> Result<Location> {
        match self.resolve(&self.first, ip, cancel).await {
            Ok(location) if location.city.trim().is_empty() => {
                warn!(
                    "Provider \"{}\" returned an empty city for {}, trying \"{}\"",
                    self.first, ip, self.second
                );
                match self.resolve(&self.second, ip, cancel).await {
                    Ok(second_location) => Ok(second_location),
                    Err(e @ IpLocatorError::Cancelled(_)) => Err(e),
                    Err(e) => {
                        error!(
                            "Error occurred while processing with \"{}\" provider: {}",
                            self.second, e
                        );
                        Ok(location)
                    }
                }
            }
            Ok(location) => Ok(location),
            Err(e @ IpLocatorError::Cancelled(_)) => Err(e),
            Err(first_error) => {
                error!(
                    "Error occurred while processing with \"{}\" provider: {}",
                    self.first, first_error
                );
                self.resolve(&self.second, ip, cancel).await.map_err(|e| {
                    if !matches!(e, IpLocatorError::Cancelled(_)) {
                        error!(
                            "Error occurred while processing with \"{}\" provider: {}",
                            self.second, e
                        );
                    }
                    e
                })
            }
        }
    }
}
