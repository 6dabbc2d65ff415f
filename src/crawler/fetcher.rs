//! HTTP page fetcher
//!
//! One GET per listing page, no internal retry and no rate limiting: a
//! failed fetch is fatal to the job's fetch stage, and retry is the caller's
//! decision by resubmitting the whole job.

use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use std::time::Duration;

use crate::config::CrawlerConfig;
use crate::error::FetchError;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Marketplace page fetcher
pub struct PageFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Optional base URL override for testing with mock servers
    base_url: Option<String>,
}

impl PageFetcher {
    /// Create a new fetcher with the given request timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Create a fetcher from crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .cookie_store(config.enable_cookies)
            .build()?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Create a fetcher with a custom base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut fetcher = Self::new(timeout)?;
        fetcher.base_url = Some(base_url.to_string());
        Ok(fetcher)
    }

    /// Fetch one listing page and return its markup
    ///
    /// # Errors
    ///
    /// Any transport failure or non-success status is a `FetchError`; the
    /// caller treats it as fatal to the job's fetch stage.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let full_url = if let Some(base) = &self.base_url {
            format!("{base}{url}")
        } else {
            url.to_string()
        };

        tracing::debug!(url = %full_url, "Fetching page");

        let response = self
            .client
            .get(&full_url)
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(FetchError::Http)
    }

    /// Build browser-shaped headers with a rotated user agent
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("uk-UA,uk;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br"),
        );

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_creation() {
        let fetcher = PageFetcher::new(Duration::from_secs(10));
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_fetcher_with_base_url() {
        let fetcher = PageFetcher::with_base_url("http://localhost:8080", Duration::from_secs(5));
        assert!(fetcher.is_ok());
        assert_eq!(
            fetcher.unwrap().base_url,
            Some("http://localhost:8080".to_string())
        );
    }

    #[test]
    fn test_user_agent_rotation() {
        let fetcher = PageFetcher::new(Duration::from_secs(10)).unwrap();

        let mut agents = std::collections::HashSet::new();
        for _ in 0..100 {
            let agent = fetcher.random_user_agent();
            assert!(USER_AGENTS.contains(&agent));
            agents.insert(agent);
        }

        assert!(agents.len() > 1, "User agents should rotate");
    }

    #[test]
    fn test_headers_shape() {
        let fetcher = PageFetcher::new(Duration::from_secs(10)).unwrap();
        let headers = fetcher.build_headers();

        assert!(headers.contains_key(USER_AGENT));
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
        assert!(headers.contains_key(ACCEPT_ENCODING));
    }
}
