//! Startup address discovery tests

mod common;

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::MockFetcher;
use iplocator::addresses::{AddressBook, LocalAddressSource};
use iplocator::errors::{IpLocatorError, Result};
use iplocator::fetch::HttpFetcher;

struct FixedLocalSource(Vec<IpAddr>);

impl LocalAddressSource for FixedLocalSource {
    fn local_addresses(&self) -> Result<Vec<IpAddr>> {
        Ok(self.0.clone())
    }
}

struct FailingLocalSource;

impl LocalAddressSource for FailingLocalSource {
    fn local_addresses(&self) -> Result<Vec<IpAddr>> {
        Err(IpLocatorError::no_address_available("interface enumeration failed"))
    }
}

/// Let both background probes finish
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn discover_populates_local_and_public_sets() {
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(
        MockFetcher::new()
            .respond("checkip.dyndns.org", "Current IP Address: 93.184.216.34")
            .respond("api.ipify.org", "93.184.216.34"),
    );
    let book = Arc::new(AddressBook::new());
    let source = FixedLocalSource(vec!["192.168.1.10".parse().unwrap()]);

    Arc::clone(&book)
        .discover(fetcher, &source, &CancellationToken::new())
        .await;
    settle().await;

    assert_eq!(book.local_addresses(), vec!["192.168.1.10".parse::<IpAddr>().unwrap()]);
    // both echo services reported the same address, deduplicated to one
    assert_eq!(
        book.public_addresses(),
        vec!["93.184.216.34".parse::<IpAddr>().unwrap()]
    );
}

#[tokio::test]
async fn discover_tolerates_local_enumeration_failure() {
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(
        MockFetcher::new()
            .respond("checkip.dyndns.org", "Current IP Address: 93.184.216.34")
            .respond("api.ipify.org", "93.184.216.34"),
    );
    let book = Arc::new(AddressBook::new());

    Arc::clone(&book)
        .discover(fetcher, &FailingLocalSource, &CancellationToken::new())
        .await;
    settle().await;

    assert!(book.local_addresses().is_empty());
    assert!(!book.public_addresses().is_empty(), "public discovery still ran");
}

#[tokio::test]
async fn discover_survives_one_echo_service_failing() {
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(
        MockFetcher::new()
            .fail(
                "checkip.dyndns.org",
                IpLocatorError::provider_unreachable("connection refused"),
            )
            .respond("api.ipify.org", "93.184.216.34"),
    );
    let book = Arc::new(AddressBook::new());
    let source = FixedLocalSource(vec![]);

    Arc::clone(&book)
        .discover(fetcher, &source, &CancellationToken::new())
        .await;
    settle().await;

    assert_eq!(
        book.public_addresses(),
        vec!["93.184.216.34".parse::<IpAddr>().unwrap()]
    );
}

#[tokio::test]
async fn discover_keeps_both_distinct_public_addresses() {
    // each echo service sees a different egress address; the late one
    // is merged in as well
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(
        MockFetcher::new()
            .respond("checkip.dyndns.org", "Current IP Address: 93.184.216.34")
            .respond("api.ipify.org", "198.51.100.4"),
    );
    let book = Arc::new(AddressBook::new());
    let source = FixedLocalSource(vec![]);

    Arc::clone(&book)
        .discover(fetcher, &source, &CancellationToken::new())
        .await;
    settle().await;

    let public = book.public_addresses();
    assert_eq!(public.len(), 2);
    assert!(public.contains(&"93.184.216.34".parse().unwrap()));
    assert!(public.contains(&"198.51.100.4".parse().unwrap()));
}

#[tokio::test]
async fn discover_with_unreachable_echo_services_leaves_public_empty() {
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(
        MockFetcher::new()
            .fail(
                "checkip.dyndns.org",
                IpLocatorError::provider_unreachable("timeout"),
            )
            .fail(
                "api.ipify.org",
                IpLocatorError::provider_unreachable("timeout"),
            ),
    );
    let book = Arc::new(AddressBook::new());
    let source = FixedLocalSource(vec![]);

    Arc::clone(&book)
        .discover(fetcher, &source, &CancellationToken::new())
        .await;
    settle().await;

    assert!(book.public_addresses().is_empty());
    assert!(matches!(
        book.first_public_address(),
        Err(IpLocatorError::NoAddressAvailable(_))
    ));
}
