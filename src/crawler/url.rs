//! Search URL construction and href joining
//!
//! The marketplace addresses a fresh query as `/q-{query}/` with price
//! filters carried in the query string. Every href found in the markup is
//! relative to the configured site base.

use url::Url;

use crate::config::SiteConfig;
use crate::error::FetchError;

/// Builder for marketplace search URLs
#[derive(Debug, Clone)]
pub struct SearchUrlBuilder {
    base: Url,
}

impl SearchUrlBuilder {
    /// Create a builder for the given scheme and host
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if scheme and host do not form a
    /// valid base URL
    pub fn new(scheme: &str, host: &str) -> Result<Self, FetchError> {
        let base = Url::parse(&format!("{scheme}://{host}/"))
            .map_err(|err| FetchError::InvalidUrl(format!("{scheme}://{host}: {err}")))?;
        Ok(Self { base })
    }

    /// Create a builder from site configuration
    pub fn from_site(site: &SiteConfig) -> Result<Self, FetchError> {
        Self::new(&site.scheme, &site.host)
    }

    /// Site base URL
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build the initial search URL for a query with price filters
    ///
    /// Price filters are always written into the query string, zero or not -
    /// the site treats an absent filter and a zero filter the same way, and
    /// keeping them unconditional makes the request shape predictable.
    pub fn search(&self, query: &str, price_from: f64, price_to: f64) -> String {
        let mut url = self.base.clone();
        url.set_path(&format!("q-{query}/"));
        url.query_pairs_mut()
            .append_pair("search[filter_float_price:from]", &format_price(price_from))
            .append_pair("search[filter_float_price:to]", &format_price(price_to));
        url.to_string()
    }

    /// Join a relative href from the site markup against the base
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the href cannot be joined
    pub fn join(&self, href: &str) -> Result<String, FetchError> {
        self.base
            .join(href)
            .map(|url| url.to_string())
            .map_err(|err| FetchError::InvalidUrl(format!("{href}: {err}")))
    }
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}
