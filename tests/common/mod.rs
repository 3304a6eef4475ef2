//! Mock collaborators for the test suites
//!
//! The resolution pipeline's three external seams (store, cache, HTTP
//! fetch) get programmable in-memory implementations here; tests never
//! touch the network or a database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use iplocator::addresses::{AddressBook, SameLocationClassifier};
use iplocator::cache::LocationCache;
use iplocator::config::ProviderConfig;
use iplocator::errors::{IpLocatorError, Result};
use iplocator::fetch::HttpFetcher;
use iplocator::providers::ProviderChain;
use iplocator::repository::{Location, LocationRepository};
use iplocator::services::LocationService;

// ============ MockFetcher ============

/// Returns canned responses matched by URL substring
pub struct MockFetcher {
    responses: Mutex<Vec<(String, Result<String>)>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, url_part: &str, body: &str) -> Self {
        self.responses
            .lock()
            .push((url_part.to_string(), Ok(body.to_string())));
        self
    }

    pub fn fail(self, url_part: &str, err: IpLocatorError) -> Self {
        self.responses.lock().push((url_part.to_string(), Err(err)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(IpLocatorError::cancelled("fetch aborted by caller"));
        }

        self.calls.lock().push(url.to_string());

        for (part, response) in self.responses.lock().iter() {
            if url.contains(part.as_str()) {
                return response.clone();
            }
        }

        Err(IpLocatorError::provider_unreachable(format!(
            "no mock response for {}",
            url
        )))
    }
}

// ============ MockRepository ============

#[derive(Default)]
pub struct MockRepository {
    pub records: Mutex<HashMap<String, Location>>,
    pub fail_reads: AtomicBool,
    pub fail_creates: AtomicBool,
    pub fail_updates: AtomicBool,
    pub get_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub last_user_id: Mutex<Option<String>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, location: Location) -> Self {
        self.records.lock().insert(location.id.clone(), location);
        self
    }

    pub fn stored(&self, id: &str) -> Option<Location> {
        self.records.lock().get(id).cloned()
    }
}

#[async_trait]
impl LocationRepository for MockRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<Location>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(IpLocatorError::store_error("read failure injected"));
        }
        Ok(self.records.lock().get(id).cloned())
    }

    async fn create(&self, location: &Location) -> Result<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(IpLocatorError::store_error("create failure injected"));
        }
        self.records
            .lock()
            .insert(location.id.clone(), location.clone());
        Ok(())
    }

    async fn update(&self, location: &Location, user_id: Option<&str>) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_id.lock() = user_id.map(String::from);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(IpLocatorError::store_error("update failure injected"));
        }
        self.records
            .lock()
            .insert(location.id.clone(), location.clone());
        Ok(())
    }
}

// ============ MockCache ============

#[derive(Default)]
pub struct MockCache {
    pub entries: Mutex<HashMap<String, Location>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, location: Location) -> Self {
        self.entries.lock().insert(location.id.clone(), location);
        self
    }

    pub fn cached(&self, id: &str) -> Option<Location> {
        self.entries.lock().get(id).cloned()
    }
}

#[async_trait]
impl LocationCache for MockCache {
    async fn get(&self, id: &str) -> Option<Location> {
        self.entries.lock().get(id).cloned()
    }

    async fn set(&self, location: Location) {
        self.entries.lock().insert(location.id.clone(), location);
    }

    async fn invalidate_all(&self) {
        self.entries.lock().clear();
    }
}

// ============ Assembly ============

pub fn provider_configs() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            name: "ipstack".to_string(),
            uri_pattern: "http://ipstack.test/{ip}?access_key={accessKey}".to_string(),
            access_key: "test-key".to_string(),
        },
        ProviderConfig {
            name: "ipapi".to_string(),
            uri_pattern: "http://ipapi.test/json/{ip}".to_string(),
            access_key: String::new(),
        },
        ProviderConfig {
            name: "keycdn".to_string(),
            uri_pattern: "https://keycdn.test/geo.json?host={ip}".to_string(),
            access_key: String::new(),
        },
    ]
}

pub fn provider_chain(fetcher: Arc<MockFetcher>) -> ProviderChain {
    ProviderChain::new(&provider_configs(), "ipstack", "ipapi", fetcher)
}

/// Assemble a LocationService with every collaborator mocked
pub fn service_with(
    repository: Arc<MockRepository>,
    cache: Arc<MockCache>,
    fetcher: Arc<MockFetcher>,
    local_addresses: &[&str],
    public_addresses: &[&str],
) -> LocationService {
    let book = Arc::new(AddressBook::new());
    for address in local_addresses {
        book.add_local(address.parse().unwrap());
    }
    for address in public_addresses {
        book.add_public(address.parse().unwrap());
    }

    let classifier =
        SameLocationClassifier::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}", Arc::clone(&book)).unwrap();

    LocationService::new(
        repository,
        cache,
        provider_chain(fetcher),
        classifier,
        book,
        30,
    )
}

// ============ Canned bodies ============

pub const IPSTACK_8888: &str = r#"{
    "ip": "8.8.8.8",
    "city": "Mountain View",
    "region_name": "California",
    "country_name": "United States",
    "country_code": "US",
    "continent_name": "North America",
    "latitude": "37.4",
    "longitude": "-122.07"
}"#;

pub const IPAPI_8888: &str = r#"{
    "status": "success",
    "query": "8.8.8.8",
    "city": "Mountain View",
    "regionName": "California",
    "country": "United States",
    "countryCode": "US",
    "timezone": "America/Los_Angeles",
    "lat": 37.4056,
    "lon": -122.0775
}"#;

pub const IPSTACK_EMPTY_CITY: &str = r#"{
    "ip": "8.8.8.8",
    "city": "",
    "region_name": "",
    "country_name": "United States",
    "country_code": "US",
    "continent_name": "North America",
    "latitude": "37.4",
    "longitude": "-122.07"
}"#;
