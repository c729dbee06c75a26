//! Application configuration
//!
//! All settings are read from the environment once at startup and carried in
//! an immutable [`AppConfig`] that is injected into the handlers via
//! `web::Data`. Nothing in the request path reads environment variables.

use std::env;

use tracing::warn;

use crate::errors::{BuylinkError, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redirect: RedirectConfig,
    pub affiliate: AffiliateMode,
    pub api: ApiConfig,
    pub probe: ProbeConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub database_url: String,
}

/// Settings for the resolver's URL transformation.
#[derive(Clone, Debug)]
pub struct RedirectConfig {
    /// Generic category page served when a mapping has no live option.
    pub fallback_url: String,
    pub utm_source: String,
    pub utm_medium: String,
    pub utm_campaign: String,
}

/// Affiliate wrapping strategy. A closed set so adding a network is a
/// compile-time checked extension, not a string comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AffiliateMode {
    Off,
    Skimlinks { site_id: String },
}

#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Bearer token for the admin surface. Empty disables the admin API.
    pub admin_token: String,
    /// Allowed CORS origin for the admin surface, "*" for any.
    pub cors_origin: String,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

#[derive(Clone, Debug)]
pub struct ProbeConfig {
    pub timeout_secs: u64,
    pub concurrency: usize,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let affiliate = match env_or("AFFILIATE_MODE", "off").to_lowercase().as_str() {
            "off" | "" => AffiliateMode::Off,
            "skimlinks" => match env::var("SKIMLINKS_SITE_ID") {
                Ok(site_id) if !site_id.is_empty() => AffiliateMode::Skimlinks { site_id },
                _ => {
                    warn!("AFFILIATE_MODE=skimlinks but SKIMLINKS_SITE_ID is not set, affiliate wrapping disabled");
                    AffiliateMode::Off
                }
            },
            other => {
                return Err(BuylinkError::validation(format!(
                    "Unknown AFFILIATE_MODE: {}. Supported: off, skimlinks",
                    other
                )));
            }
        };

        let fallback_url = env_or("FALLBACK_URL", "https://shop.kochmonster.example/zutaten");
        url::Url::parse(&fallback_url)
            .map_err(|e| BuylinkError::validation(format!("Invalid FALLBACK_URL: {}", e)))?;

        Ok(AppConfig {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "127.0.0.1"),
                port: env_parse_or("SERVER_PORT", 8080),
            },
            database: DatabaseConfig {
                database_url: env_or("DATABASE_URL", "sqlite://buylink.db?mode=rwc"),
            },
            redirect: RedirectConfig {
                fallback_url,
                utm_source: env_or("UTM_SOURCE", "buylink"),
                utm_medium: env_or("UTM_MEDIUM", "redirect"),
                utm_campaign: env_or("UTM_CAMPAIGN", "product-links"),
            },
            affiliate,
            api: ApiConfig {
                admin_token: env_or("ADMIN_TOKEN", ""),
                cors_origin: env_or("CORS_ORIGIN", "*"),
                rate_limit_per_second: env_parse_or("RATE_LIMIT_PER_SECOND", 5),
                rate_limit_burst: env_parse_or("RATE_LIMIT_BURST", 20),
            },
            probe: ProbeConfig {
                timeout_secs: env_parse_or("PROBE_TIMEOUT_SECS", 5),
                concurrency: env_parse_or("PROBE_CONCURRENCY", 8),
            },
        })
    }
}

impl Default for RedirectConfig {
    fn default() -> Self {
        RedirectConfig {
            fallback_url: "https://shop.kochmonster.example/zutaten".to_string(),
            utm_source: "buylink".to_string(),
            utm_medium: "redirect".to_string(),
            utm_campaign: "product-links".to_string(),
        }
    }
}
