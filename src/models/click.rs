use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Referrer recorded when the request carried none.
pub const DIRECT_REFERRER: &str = "Direct";

/// One access to a short URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "ip")]
    pub source_address: String,
    pub user_agent: Option<String>,
    pub referrer: String,
    #[serde(rename = "location")]
    pub coarse_location: String,
}

/// Request details handed to the registry by the redirect layer
#[derive(Debug, Clone, Default)]
pub struct ClickContext {
    pub source_address: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ClickContext {
    pub fn new(source_address: impl Into<String>) -> Self {
        Self {
            source_address: source_address.into(),
            ..Default::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }
}
