use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

/// Longest validity a link may be created with (24 hours).
pub const MAX_VALIDITY_MINUTES: u32 = 1440;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// Prefix for the `shortLink` returned on create, without trailing slash
    pub base_url: String,
    pub links: LinkConfig,
    pub analytics: AnalyticsConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Validity applied when a create request does not specify one
    #[serde(default = "LinkConfig::default_validity_minutes")]
    pub default_validity_minutes: u32,
    #[serde(default = "LinkConfig::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Use the socket peer address
    None,
    /// Use X-Forwarded-For
    Standard,
    /// Use CF-Connecting-IP
    Cloudflare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// MaxMind City database; coarse labels are used when unset
    #[serde(default)]
    pub geoip_city_db_path: Option<String>,
    pub trusted_proxy_mode: TrustedProxyMode,
    /// Proxies to skip from the right of X-Forwarded-For
    #[serde(default)]
    pub num_trusted_proxies: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origin: Option<String>,
}

impl LinkConfig {
    const fn default_validity_minutes() -> u32 {
        30
    }

    const fn default_sweep_interval_secs() -> u64 {
        3600
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            default_validity_minutes: Self::default_validity_minutes(),
            sweep_interval_secs: Self::default_sweep_interval_secs(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            geoip_city_db_path: None,
            trusted_proxy_mode: TrustedProxyMode::None,
            num_trusted_proxies: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let default_validity_minutes = match std::env::var("DEFAULT_VALIDITY_MINUTES") {
            Ok(v) => v
                .parse::<u32>()
                .context("DEFAULT_VALIDITY_MINUTES must be a positive integer")?,
            Err(_) => LinkConfig::default_validity_minutes(),
        };
        if !(1..=MAX_VALIDITY_MINUTES).contains(&default_validity_minutes) {
            bail!(
                "DEFAULT_VALIDITY_MINUTES must be between 1 and {}, got {}",
                MAX_VALIDITY_MINUTES,
                default_validity_minutes
            );
        }

        let sweep_interval_secs = match std::env::var("SWEEP_INTERVAL_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .context("SWEEP_INTERVAL_SECS must be a positive integer")?,
            Err(_) => LinkConfig::default_sweep_interval_secs(),
        };
        if sweep_interval_secs == 0 {
            bail!("SWEEP_INTERVAL_SECS must be greater than zero");
        }

        let trusted_proxy_mode = match std::env::var("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|_| "none".to_string())
            .to_lowercase()
            .as_str()
        {
            "none" => TrustedProxyMode::None,
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'none'. Supported values: none, standard, cloudflare"
                );
                TrustedProxyMode::None
            }
        };

        let num_trusted_proxies = std::env::var("NUM_TRUSTED_PROXIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());

        let geoip_city_db_path = std::env::var("GEOIP_CITY_DB_PATH")
            .ok()
            .filter(|p| !p.is_empty());

        let allowed_origin = match std::env::var("CORS_ALLOWED_ORIGIN") {
            Ok(v) if v.is_empty() => None,
            Ok(v) => Some(v),
            Err(_) => Some("http://localhost:3000".to_string()),
        };

        Ok(Config {
            server: ServerConfig { host, port },
            base_url,
            links: LinkConfig {
                default_validity_minutes,
                sweep_interval_secs,
            },
            analytics: AnalyticsConfig {
                geoip_city_db_path,
                trusted_proxy_mode,
                num_trusted_proxies,
            },
            cors: CorsConfig { allowed_origin },
        })
    }

    /// Public link for `shortcode`.
    pub fn short_link(&self, shortcode: &str) -> String {
        format!("{}/{}", self.base_url, shortcode)
    }
}
