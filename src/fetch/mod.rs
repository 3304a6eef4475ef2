//! HTTP fetch collaborator
//!
//! One raw HTTP GET against the outside world: URL in, body text out.
//! Provider queries and public-address probes both go through this seam.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use ureq::Agent;

use crate::errors::{IpLocatorError, Result};

/// HTTP request timeout
const HTTP_TIMEOUT_SECS: u64 = 5;

/// Global HTTP Agent (ureq's Agent is Send + Sync)
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

/// Raw HTTP fetch trait
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Fetch the response body of `url` as text; `ProviderUnreachable`
    /// on transport failure, `Cancelled` when the caller aborts
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String>;
}

/// Default implementation backed by ureq
///
/// ureq is a synchronous client, so the request runs in spawn_blocking
pub struct UreqFetcher;

impl UreqFetcher {
    fn fetch_sync(url: String) -> Result<String> {
        let agent = get_agent();

        let resp = agent
            .get(&url)
            .call()
            .map_err(|e| IpLocatorError::provider_unreachable(format!("GET {}: {}", url, e)))?;

        resp.into_body()
            .read_to_string()
            .map_err(|e| IpLocatorError::provider_unreachable(format!("read body of {}: {}", url, e)))
    }
}

#[async_trait]
impl HttpFetcher for UreqFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        let url = url.to_string();
        let handle = tokio::task::spawn_blocking(move || Self::fetch_sync(url));

        // Cancelling stops the wait; the blocking request times out on its own
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(IpLocatorError::cancelled("fetch aborted by caller")),
            joined = handle => joined.unwrap_or_else(|e| {
                warn!("fetch task panicked: {}", e);
                Err(IpLocatorError::provider_unreachable(format!("fetch task failed: {}", e)))
            }),
        }
    }
}
