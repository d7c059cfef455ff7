//! Click attribution
//!
//! Works out who a click came from ([`ip_extractor`]) and labels roughly
//! where they are ([`Locator`]). The default locator only masks addresses;
//! a MaxMind City database can be configured for real lookups.

pub mod geoip;
pub mod ip_extractor;
pub mod location;

pub use geoip::MaxMindLocator;
pub use ip_extractor::extract_client_ip;
pub use location::{coarse_location, CoarseLocator, Locator};
