//! Configuration management for the adsift pipeline
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target marketplace site
    pub site: SiteConfig,

    /// Crawler configuration
    pub crawler: CrawlerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Target site configuration
///
/// The scheme and host are the only pieces of the marketplace URL space that
/// live outside the selector table; relative hrefs from the markup are joined
/// against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// URL scheme (http or https)
    pub scheme: String,

    /// Site hostname, e.g. "www.olx.ua"
    pub host: String,
}

/// Crawler-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Per-request timeout in seconds; an unresponsive upstream stalls the
    /// whole job otherwise
    pub request_timeout_secs: u64,

    /// Enable cookie persistence
    pub enable_cookies: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let scheme = std::env::var("ADSIFT_SITE_SCHEME").unwrap_or_else(|_| String::from("https"));

        let host =
            std::env::var("ADSIFT_SITE_HOST").unwrap_or_else(|_| String::from("www.olx.ua"));

        let request_timeout_secs = std::env::var("ADSIFT_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        let sqlite_path = std::env::var("ADSIFT_SQLITE_PATH")
            .unwrap_or_else(|_| String::from("data/adverts.db"))
            .into();

        let log_level = std::env::var("ADSIFT_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("ADSIFT_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            site: SiteConfig { scheme, host },
            crawler: CrawlerConfig {
                request_timeout_secs,
                enable_cookies: true,
            },
            database: DatabaseConfig { sqlite_path },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.site.scheme.as_str(), "http" | "https") {
            anyhow::bail!("site.scheme must be http or https");
        }

        if self.site.host.trim().is_empty() {
            anyhow::bail!("site.host must not be empty");
        }

        if self.crawler.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.crawler.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                scheme: String::from("https"),
                host: String::from("www.olx.ua"),
            },
            crawler: CrawlerConfig {
                request_timeout_secs: 30,
                enable_cookies: true,
            },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/adverts.db"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_scheme_fails_validation() {
        let mut config = Config::default();
        config.site.scheme = String::from("ftp");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_host_fails_validation() {
        let mut config = Config::default();
        config.site.host = String::from("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let mut config = Config::default();
        config.crawler.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_timeout_duration() {
        let config = Config::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [site]
            scheme = "https"
            host = "market.example.com"

            [crawler]
            request_timeout_secs = 10
            enable_cookies = false

            [database]
            sqlite_path = "test.db"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.host, "market.example.com");
        assert_eq!(config.crawler.request_timeout_secs, 10);
        assert!(config.validate().is_ok());
    }
}
