use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClickEvent;

/// A shortcode and the URL it points at. Fields are fixed when the record is
/// created; expiry is derived from `expires_at` on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub shortcode: String,
    pub original_url: String,
    pub validity_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UrlRecord {
    /// A record is expired once `now` is strictly past its deadline.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Returned by a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUrl {
    pub shortcode: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Snapshot of a record and its click history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlStats {
    pub shortcode: String,
    pub original_url: String,
    pub total_clicks: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    pub click_data: Vec<ClickEvent>,
}

/// Raw create payload. Fields are loosely typed; `api::validation` checks them.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUrlRequest {
    pub url: Option<serde_json::Value>,
    pub validity: Option<serde_json::Value>,
    pub shortcode: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlResponse {
    pub short_link: String,
    pub expiry: String,
}
