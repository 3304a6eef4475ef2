//! Public address probing
//!
//! GETs a fixed public echo endpoint; the response may be plain text or
//! HTML, and the IPv4 literal inside is extracted by pattern match.

use std::net::IpAddr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::addresses::AddressBook;
use crate::errors::{IpLocatorError, Result};
use crate::fetch::HttpFetcher;

pub(crate) const DYNDNS_ENDPOINT: &str = "http://checkip.dyndns.org/";
pub(crate) const IPIFY_ENDPOINT: &str = "http://api.ipify.org/";

static PUBLIC_ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").unwrap());

/// Extract the first parseable IPv4 literal from a response body
pub fn extract_address(body: &str) -> Option<IpAddr> {
    PUBLIC_ADDRESS_REGEX
        .find_iter(body)
        .find_map(|m| m.as_str().parse::<IpAddr>().ok())
}

/// Fetch one echo service and parse the public address out of it
pub async fn fetch_public_address(
    fetcher: &dyn HttpFetcher,
    url: &str,
    cancel: &CancellationToken,
) -> Result<IpAddr> {
    let body = fetcher.fetch(url, cancel).await?;

    extract_address(&body).ok_or_else(|| {
        IpLocatorError::no_address_available(format!("no IPv4 literal in response from {}", url))
    })
}

/// Probe one echo service and merge the result into the address book;
/// failures are logged only
pub(crate) async fn probe(
    book: Arc<AddressBook>,
    fetcher: Arc<dyn HttpFetcher>,
    endpoint: &'static str,
    cancel: CancellationToken,
) {
    match fetch_public_address(fetcher.as_ref(), endpoint, &cancel).await {
        Ok(address) => {
            if book.add_public(address) {
                info!("Public address discovered via {}: {}", endpoint, address);
            }
        }
        Err(e) => {
            error!(
                "Error occurred while getting public IP address from {}: {}",
                endpoint, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_address_plain() {
        // plain-text response from api.ipify.org
        assert_eq!(
            extract_address("93.184.216.34"),
            Some("93.184.216.34".parse().unwrap())
        );
    }

    #[test]
    fn test_extract_address_html() {
        // HTML response from checkip.dyndns.org
        let body = "<html><head><title>Current IP Check</title></head><body>Current IP Address: 93.184.216.34</body></html>";
        assert_eq!(
            extract_address(body),
            Some("93.184.216.34".parse().unwrap())
        );
    }

    #[test]
    fn test_extract_address_skips_unparseable() {
        // keeps scanning when the first match does not parse
        assert_eq!(
            extract_address("version 999.999.999.999 at 93.184.216.34"),
            Some("93.184.216.34".parse().unwrap())
        );
    }

    #[test]
    fn test_extract_address_none() {
        assert_eq!(extract_address("<html>no address here</html>"), None);
    }
}
