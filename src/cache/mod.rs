use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::config::CacheConfig;
use crate::errors::{IpLocatorError, Result};
use crate::repository::Location;

pub mod moka;
pub mod null;

/// In-memory cache collaborator
///
/// Second-tier lookup for the resolver: read when a store read fails,
/// written through after every successful refresh. TTL eviction is the
/// implementation's concern.
#[async_trait]
pub trait LocationCache: Send + Sync {
    async fn get(&self, id: &str) -> Option<Location>;
    async fn set(&self, location: Location);
    async fn invalidate_all(&self);
}

pub struct CacheFactory;

impl CacheFactory {
    pub fn create(config: &CacheConfig) -> Result<Arc<dyn LocationCache>> {
        match config.backend.as_str() {
            "memory" => Ok(Arc::new(moka::MokaCacheWrapper::new(config))),
            "null" => Ok(Arc::new(null::NullCache)),
            other => {
                error!("Unknown cache backend: {}", other);
                Err(IpLocatorError::config(format!(
                    "Unknown cache backend: {}. Supported: memory, null",
                    other
                )))
            }
        }
    }
}
