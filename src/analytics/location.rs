//! Best-effort location labels for click events

use std::net::IpAddr;

/// Label for loopback callers.
pub const LOCAL: &str = "Local";
/// Label when nothing can be derived from the address.
pub const UNKNOWN: &str = "Unknown";

/// Turns a source address into a human-readable location label.
pub trait Locator: Send + Sync {
    fn locate(&self, source_address: &str) -> String;
}

/// Masks the host part of an IPv4 address, e.g. `93.184.*.*`.
///
/// This is not geolocation; it only groups callers by their /16.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoarseLocator;

impl Locator for CoarseLocator {
    fn locate(&self, source_address: &str) -> String {
        coarse_location(source_address)
    }
}

pub fn coarse_location(source_address: &str) -> String {
    match source_address.parse::<IpAddr>() {
        Ok(ip) if ip.is_loopback() => LOCAL.to_string(),
        Ok(IpAddr::V4(v4)) => {
            let octets = v4.octets();
            format!("{}.{}.*.*", octets[0], octets[1])
        }
        Ok(IpAddr::V6(_)) => UNKNOWN.to_string(),
        // Not an IP literal; still mask anything dotted-quad shaped
        Err(_) => {
            let parts: Vec<&str> = source_address.split('.').collect();
            if parts.len() == 4 {
                format!("{}.{}.*.*", parts[0], parts[1])
            } else {
                UNKNOWN.to_string()
            }
        }
    }
}
