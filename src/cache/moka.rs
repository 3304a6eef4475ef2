use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::cache::LocationCache;
use crate::config::CacheConfig;
use crate::repository::Location;

pub struct MokaCacheWrapper {
    inner: Cache<String, Location>,
}

impl MokaCacheWrapper {
    pub fn new(config: &CacheConfig) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.default_ttl))
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, TTL: {}s",
            config.max_capacity, config.default_ttl
        );
        Self { inner }
    }
}

#[async_trait]
impl LocationCache for MokaCacheWrapper {
    async fn get(&self, id: &str) -> Option<Location> {
        self.inner.get(id).await
    }

    async fn set(&self, location: Location) {
        self.inner.insert(location.id.clone(), location).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
