//! In-memory short URL registry
//!
//! Each shortcode owns one map entry holding both its [`UrlRecord`] and its
//! click history, so the two are always inserted and removed together. All
//! check-then-mutate sequences run under the entry's shard lock.

pub mod clock;
pub mod error;
pub mod shortcode;
pub mod sweeper;

use chrono::Duration;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::analytics::{CoarseLocator, Locator};
use crate::models::{ClickContext, ClickEvent, CreatedUrl, UrlRecord, UrlStats, DIRECT_REFERRER};

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{RegistryError, RegistryResult};
pub use shortcode::{is_valid_shortcode, CodeGenerator, RandomCodeGenerator};
pub use sweeper::{spawn_sweeper, SweeperHandle};

/// Generated candidates tried before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 10;

struct RegistryEntry {
    record: UrlRecord,
    clicks: Vec<ClickEvent>,
}

pub struct Registry {
    entries: DashMap<String, RegistryEntry>,
    clock: Arc<dyn Clock>,
    generator: Arc<dyn CodeGenerator>,
    locator: Arc<dyn Locator>,
}

impl Registry {
    /// Registry on wall-clock time, random 6-character codes and coarse
    /// location labels.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            clock: Arc::new(SystemClock),
            generator: Arc::new(RandomCodeGenerator::default()),
            locator: Arc::new(CoarseLocator),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_locator(mut self, locator: Arc<dyn Locator>) -> Self {
        self.locator = locator;
        self
    }

    /// Register `original_url` for `validity_minutes`.
    ///
    /// A requested shortcode is used verbatim and fails with
    /// [`RegistryError::ShortcodeTaken`] if any record (expired or not) still
    /// holds it. Without one, generated candidates are tried up to
    /// [`MAX_GENERATION_ATTEMPTS`] times.
    pub fn create(
        &self,
        original_url: &str,
        validity_minutes: u32,
        requested_shortcode: Option<&str>,
    ) -> RegistryResult<CreatedUrl> {
        if Url::parse(original_url).is_err() {
            return Err(RegistryError::InvalidUrl {
                url: original_url.to_string(),
            });
        }
        if validity_minutes == 0 {
            return Err(RegistryError::InvalidValidity {
                minutes: validity_minutes,
            });
        }

        let created = match requested_shortcode {
            Some(code) => match self.entries.entry(code.to_string()) {
                Entry::Occupied(_) => {
                    return Err(RegistryError::ShortcodeTaken {
                        shortcode: code.to_string(),
                    })
                }
                Entry::Vacant(slot) => {
                    let record = self.new_record(code, original_url, validity_minutes);
                    let created = created_from(&record);
                    slot.insert(RegistryEntry {
                        record,
                        clicks: Vec::new(),
                    });
                    created
                }
            },
            None => self.insert_generated(original_url, validity_minutes)?,
        };

        info!(
            shortcode = %created.shortcode,
            original_url = %original_url,
            validity_minutes,
            expires_at = %created.expires_at,
            "Short URL created"
        );

        Ok(created)
    }

    fn insert_generated(
        &self,
        original_url: &str,
        validity_minutes: u32,
    ) -> RegistryResult<CreatedUrl> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let candidate = self.generator.generate();
            match self.entries.entry(candidate) {
                Entry::Occupied(slot) => {
                    debug!(shortcode = %slot.key(), attempt, "generated shortcode collided");
                }
                Entry::Vacant(slot) => {
                    let record = self.new_record(slot.key(), original_url, validity_minutes);
                    let created = created_from(&record);
                    slot.insert(RegistryEntry {
                        record,
                        clicks: Vec::new(),
                    });
                    return Ok(created);
                }
            }
        }

        warn!(
            attempts = MAX_GENERATION_ATTEMPTS,
            "failed to generate a unique shortcode"
        );
        Err(RegistryError::GenerationExhausted {
            attempts: MAX_GENERATION_ATTEMPTS,
        })
    }

    fn new_record(&self, shortcode: &str, original_url: &str, validity_minutes: u32) -> UrlRecord {
        let created_at = self.clock.now();
        UrlRecord {
            shortcode: shortcode.to_string(),
            original_url: original_url.to_string(),
            validity_minutes,
            created_at,
            expires_at: created_at + Duration::minutes(i64::from(validity_minutes)),
        }
    }

    /// Look up the target of `shortcode` and record the click.
    ///
    /// The expiry check and the append happen under the same entry lock and
    /// against the same instant, so no click lands after the deadline.
    pub fn resolve(&self, shortcode: &str, context: ClickContext) -> RegistryResult<String> {
        let coarse_location = self.locator.locate(&context.source_address);

        let Some(mut entry) = self.entries.get_mut(shortcode) else {
            warn!(shortcode = %shortcode, "Short URL not found");
            return Err(RegistryError::NotFound {
                shortcode: shortcode.to_string(),
            });
        };

        let now = self.clock.now();
        if entry.record.is_expired_at(now) {
            let expires_at = entry.record.expires_at;
            warn!(shortcode = %shortcode, expires_at = %expires_at, "Short URL expired");
            return Err(RegistryError::Expired {
                shortcode: shortcode.to_string(),
                expires_at,
            });
        }

        let click = ClickEvent {
            timestamp: now,
            source_address: context.source_address,
            user_agent: context.user_agent,
            referrer: context
                .referrer
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DIRECT_REFERRER.to_string()),
            coarse_location,
        };
        debug!(
            shortcode = %shortcode,
            ip = %click.source_address,
            location = %click.coarse_location,
            referrer = %click.referrer,
            "Short URL accessed"
        );
        entry.clicks.push(click);

        Ok(entry.record.original_url.clone())
    }

    /// Snapshot of a record and its full click history. Expired records are
    /// still reported, with `is_expired` set.
    pub fn statistics(&self, shortcode: &str) -> RegistryResult<UrlStats> {
        let entry = self
            .entries
            .get(shortcode)
            .ok_or_else(|| RegistryError::NotFound {
                shortcode: shortcode.to_string(),
            })?;

        let record = &entry.record;
        Ok(UrlStats {
            shortcode: record.shortcode.clone(),
            original_url: record.original_url.clone(),
            total_clicks: entry.clicks.len(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            is_expired: record.is_expired_at(self.clock.now()),
            click_data: entry.clicks.clone(),
        })
    }

    /// Drop every expired record together with its clicks. Returns how many
    /// were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut purged = 0;

        self.entries.retain(|_, entry| {
            if entry.record.is_expired_at(now) {
                purged += 1;
                false
            } else {
                true
            }
        });

        if purged > 0 {
            info!(purged, "Cleaned up expired URLs");
        }
        purged
    }

    pub fn contains(&self, shortcode: &str) -> bool {
        self.entries.contains_key(shortcode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn created_from(record: &UrlRecord) -> CreatedUrl {
    CreatedUrl {
        shortcode: record.shortcode.clone(),
        created_at: record.created_at,
        expires_at: record.expires_at,
    }
}
