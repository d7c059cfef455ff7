use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("validity must be at least one minute, got {minutes}")]
    InvalidValidity { minutes: u32 },
    #[error("shortcode '{shortcode}' is already in use")]
    ShortcodeTaken { shortcode: String },
    #[error("shortcode '{shortcode}' not found")]
    NotFound { shortcode: String },
    #[error("shortcode '{shortcode}' expired at {expires_at}")]
    Expired {
        shortcode: String,
        expires_at: DateTime<Utc>,
    },
    #[error("no free shortcode after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}

pub type RegistryResult<T> = Result<T, RegistryError>;
