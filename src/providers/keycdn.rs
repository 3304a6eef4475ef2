//! KeyCDN response normalization
//!
//! Geo fields are nested under `data.geo`; any `status` other than the
//! literal "success" is a failure, described by `description`.

use serde_json::Value;

use crate::errors::{IpLocatorError, Result};
use crate::providers::{ResponseParser, json_text};
use crate::repository::Location;
use crate::utils::location_id;

pub struct KeyCdnParser;

impl ResponseParser for KeyCdnParser {
    fn parse(&self, body: &str) -> Result<Location> {
        let json: Value = serde_json::from_str(body)
            .map_err(|e| IpLocatorError::provider_error(format!("keycdn: invalid JSON: {}", e)))?;

        if json.get("status").and_then(Value::as_str) != Some("success") {
            return Err(IpLocatorError::provider_error(json_text(&json, "description")));
        }

        let geo = &json["data"]["geo"];
        let ip = json_text(geo, "ip");
        Ok(Location {
            id: location_id(&ip),
            ip,
            city: json_text(geo, "city"),
            region: json_text(geo, "region_name"),
            country: json_text(geo, "country_name"),
            country_code: json_text(geo, "country_code"),
            continent: json_text(geo, "continent_name"),
            latitude: json_text(geo, "latitude"),
            longitude: json_text(geo, "longitude"),
            last_updated: None,
        })
    }
}
