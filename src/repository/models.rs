use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for unknown geo fields; persisted records carry this,
/// never an empty string or null
pub const UNKNOWN_MARKER: &str = "N/A";

/// One resolution result
///
/// `id` is the content hash of `ip` (see `utils::location_id`); the two
/// map one-to-one. A record is either fully resolved or carries
/// `UNKNOWN_MARKER` in every geo field, there is no partially resolved
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub country_code: String,
    pub continent: String,
    pub latitude: String,
    pub longitude: String,
    /// Time of the last successful provider refresh; None means never
    pub last_updated: Option<DateTime<Utc>>,
}

impl Location {
    /// Sentinel record, returned when resolution is skipped or every
    /// provider failed
    pub fn unknown(ip: &str) -> Self {
        Self {
            id: crate::utils::location_id(ip),
            ip: ip.to_string(),
            city: UNKNOWN_MARKER.to_string(),
            region: UNKNOWN_MARKER.to_string(),
            country: UNKNOWN_MARKER.to_string(),
            country_code: UNKNOWN_MARKER.to_string(),
            continent: UNKNOWN_MARKER.to_string(),
            latitude: UNKNOWN_MARKER.to_string(),
            longitude: UNKNOWN_MARKER.to_string(),
            last_updated: None,
        }
    }

    /// Whether the record is older than the staleness window; a record
    /// that was never refreshed counts as stale
    pub fn is_stale(&self, stale_after_days: i64) -> bool {
        match self.last_updated {
            Some(at) => (Utc::now() - at).num_days() > stale_after_days,
            None => true,
        }
    }
}
