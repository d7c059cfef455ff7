//! Locator backed by a MaxMind GeoLite2/GeoIP2 City database
//!
//! Opt-in replacement for [`CoarseLocator`](super::CoarseLocator). Addresses
//! the database has no entry for (private ranges, loopback) fall back to the
//! coarse label.

use anyhow::{Context, Result};
use maxminddb::{geoip2, Mmap, Reader};
use std::net::IpAddr;
use std::sync::Arc;

use super::location::{coarse_location, Locator};

#[derive(Clone)]
pub struct MaxMindLocator {
    city_reader: Arc<Reader<Mmap>>,
}

impl MaxMindLocator {
    /// Memory-map a City database for click location lookups
    ///
    /// # Arguments
    /// * `city_path` - Path to the MaxMind GeoLite2-City or GeoIP2-City .mmdb file
    ///
    /// # Returns
    /// A locator sharing the mapped database, or an error if the file cannot be opened
    pub fn new(city_path: &str) -> Result<Self> {
        let reader = unsafe { Reader::open_mmap(city_path) }
            .with_context(|| format!("Failed to open GeoIP City database at {}", city_path))?;

        Ok(Self {
            city_reader: Arc::new(reader),
        })
    }

    fn lookup(&self, ip: IpAddr) -> Option<String> {
        let result = self.city_reader.lookup(ip).ok()?;

        if let Ok(Some(city)) = result.decode::<geoip2::City>() {
            let country = city.country.iso_code;
            let name = city.city.names.english;
            return match (name, country) {
                (Some(name), Some(country)) => Some(format!("{}, {}", name, country)),
                (None, Some(country)) => Some(country.to_string()),
                (Some(name), None) => Some(name.to_string()),
                (None, None) => None,
            };
        }

        // City databases are a superset of Country data
        if let Ok(Some(country)) = result.decode::<geoip2::Country>() {
            return country.country.iso_code.map(|s| s.to_string());
        }

        None
    }
}

impl Locator for MaxMindLocator {
    /// Label `source_address` as "City, CC", "CC" or the city name, whichever
    /// the database knows. Loopback, unparseable and unknown addresses get the
    /// coarse label instead.
    fn locate(&self, source_address: &str) -> String {
        source_address
            .parse::<IpAddr>()
            .ok()
            .filter(|ip| !ip.is_loopback())
            .and_then(|ip| self.lookup(ip))
            .unwrap_or_else(|| coarse_location(source_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maxmind_locator_invalid_path() {
        let result = MaxMindLocator::new("/nonexistent/path.mmdb");
        assert!(result.is_err());
    }
}
