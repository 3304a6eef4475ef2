//! ip-api.com response normalization
//!
//! The IP lives in `query`. There is no continent field, so it is taken
//! from `timezone` before the first `/` ("Asia/Ho_Chi_Minh" -> "Asia").
//! Failures come back as `status: "fail"` with a `message`.

use serde_json::Value;

use crate::errors::{IpLocatorError, Result};
use crate::providers::{ResponseParser, json_text};
use crate::repository::Location;
use crate::utils::location_id;

pub struct IpApiParser;

impl ResponseParser for IpApiParser {
    fn parse(&self, body: &str) -> Result<Location> {
        let json: Value = serde_json::from_str(body)
            .map_err(|e| IpLocatorError::provider_error(format!("ipapi: invalid JSON: {}", e)))?;

        if json.get("status").and_then(Value::as_str) == Some("fail") {
            return Err(IpLocatorError::provider_error(json_text(&json, "message")));
        }

        let timezone = json_text(&json, "timezone");
        let continent = timezone
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let ip = json_text(&json, "query");
        Ok(Location {
            id: location_id(&ip),
            ip,
            city: json_text(&json, "city"),
            region: json_text(&json, "regionName"),
            country: json_text(&json, "country"),
            country_code: json_text(&json, "countryCode"),
            continent,
            latitude: json_text(&json, "lat"),
            longitude: json_text(&json, "lon"),
            last_updated: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = r#"{
            "status": "success",
            "query": "1.53.0.1",
            "city": "Hanoi",
            "regionName": "Hanoi",
            "country": "Vietnam",
            "countryCode": "VN",
            "timezone": "Asia/Ho_Chi_Minh",
            "lat": 21.0278,
            "lon": 105.8342
        }"#;

        let location = IpApiParser.parse(body).unwrap();
        assert_eq!(location.id, location_id("1.53.0.1"));
        assert_eq!(location.city, "Hanoi");
        assert_eq!(location.country_code, "VN");
        // continent comes from the timezone prefix
        assert_eq!(location.continent, "Asia");
        assert_eq!(location.latitude, "21.0278");
    }

    #[test]
    fn test_parse_fail_envelope() {
        let body = r#"{"status": "fail", "message": "private range", "query": "192.168.1.1"}"#;

        let err = IpApiParser.parse(body).unwrap_err();
        assert!(matches!(err, IpLocatorError::ProviderError(_)));
        assert!(err.message().contains("private range"));
    }

    #[test]
    fn test_parse_timezone_without_slash() {
        let body = r#"{"status": "success", "query": "8.8.8.8", "city": "x", "timezone": "UTC"}"#;

        let location = IpApiParser.parse(body).unwrap();
        assert_eq!(location.continent, "UTC");
    }
}
