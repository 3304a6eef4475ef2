use async_trait::async_trait;

use crate::cache::LocationCache;
use crate::repository::Location;

/// No-op implementation, used when caching is disabled
pub struct NullCache;

#[async_trait]
impl LocationCache for NullCache {
    async fn get(&self, _id: &str) -> Option<Location> {
        None
    }

    async fn set(&self, _location: Location) {}

    async fn invalidate_all(&self) {}
}
