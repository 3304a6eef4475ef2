//! ipstack response normalization
//!
//! Fields are flat at the top level; errors arrive as an `error` object
//! envelope.

use serde_json::Value;

use crate::errors::{IpLocatorError, Result};
use crate::providers::{ResponseParser, json_text};
use crate::repository::Location;
use crate::utils::location_id;

pub struct IpStackParser;

impl ResponseParser for IpStackParser {
    fn parse(&self, body: &str) -> Result<Location> {
        let json: Value = serde_json::from_str(body)
            .map_err(|e| IpLocatorError::provider_error(format!("ipstack: invalid JSON: {}", e)))?;

        if let Some(error) = json.get("error").filter(|e| e.is_object()) {
            return Err(IpLocatorError::provider_error(format!(
                "{} ({} - {})",
                json_text(error, "info"),
                json_text(error, "code"),
                json_text(error, "type"),
            )));
        }

        let ip = json_text(&json, "ip");
        Ok(Location {
            id: location_id(&ip),
            ip,
            city: json_text(&json, "city"),
            region: json_text(&json, "region_name"),
            country: json_text(&json, "country_name"),
            country_code: json_text(&json, "country_code"),
            continent: json_text(&json, "continent_name"),
            latitude: json_text(&json, "latitude"),
            longitude: json_text(&json, "longitude"),
            last_updated: None,
        })
    }
}
