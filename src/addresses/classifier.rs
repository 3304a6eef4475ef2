//! Same-location detection
//!
//! An incoming IP counts as "same location" when it is loopback, or
//! when a configurable prefix of it (default: the first three octets)
//! matches any address in the local set. Such addresses skip the
//! resolution pipeline entirely.

use std::net::IpAddr;
use std::sync::Arc;

use regex::Regex;

use crate::addresses::AddressBook;
use crate::errors::{IpLocatorError, Result};

pub struct SameLocationClassifier {
    prefix_regex: Regex,
    book: Arc<AddressBook>,
}

impl SameLocationClassifier {
    pub fn new(pattern: &str, book: Arc<AddressBook>) -> Result<Self> {
        let prefix_regex = Regex::new(pattern).map_err(|e| {
            IpLocatorError::config(format!("invalid same-location pattern {:?}: {}", pattern, e))
        })?;

        Ok(Self { prefix_regex, book })
    }

    /// Whether `ip` is in the same location as this instance
    ///
    /// Pure function of `ip` and the current address book; no I/O, no
    /// mutation. Unparseable input is `InvalidInput`; an input the
    /// prefix pattern cannot match (e.g. IPv6 against an IPv4 pattern)
    /// classifies as different.
    pub fn is_same_location(&self, ip: &str) -> Result<bool> {
        let address: IpAddr = ip
            .trim()
            .parse()
            .map_err(|e| IpLocatorError::invalid_input(format!("unparseable IP {:?}: {}", ip, e)))?;

        if address.is_loopback() {
            return Ok(true);
        }

        let Some(prefix) = self.prefix_regex.find(ip) else {
            return Ok(false);
        };

        for local in self.book.local_addresses() {
            let text = local.to_string();
            if let Some(local_prefix) = self.prefix_regex.find(&text)
                && local_prefix.as_str() == prefix.as_str()
            {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
