//! Category disambiguation
//!
//! A fresh query lands on a page that fans out into per-category result
//! lists. The selector picks the most populous category once per job and
//! rewrites the starting URL to it.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::url::SearchUrlBuilder;
use crate::error::{Error, ExtractError};
use crate::parser::ListingPageParser;

/// The category chosen for a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    /// Display label, attached to every record of the job as its tag
    pub label: String,

    /// Absolute URL of the category's first results page
    pub start_url: String,
}

/// Picks the most populous category for a fresh query
pub struct CategorySelector {
    parser: ListingPageParser,
}

impl CategorySelector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parser: ListingPageParser::new(),
        }
    }

    /// Fetch the first page of a fresh query and resolve its category
    ///
    /// # Errors
    ///
    /// Fetch failures propagate as-is. A page with no category entries means
    /// the markup shape changed upstream and fails the job with
    /// [`ExtractError::NoCategories`]; this is not retried.
    pub async fn resolve(
        &self,
        fetcher: &PageFetcher,
        urls: &SearchUrlBuilder,
        first_page_url: &str,
    ) -> Result<ResolvedCategory, Error> {
        let html = fetcher.fetch_page(first_page_url).await?;
        self.pick(&html, urls)
    }

    /// Pure selection over already-fetched markup
    ///
    /// The entry with the strictly largest advert count wins; ties resolve to
    /// the first entry in document order.
    pub fn pick(&self, html: &str, urls: &SearchUrlBuilder) -> Result<ResolvedCategory, Error> {
        let entries = self.parser.parse_categories(html);
        if entries.is_empty() {
            return Err(ExtractError::NoCategories.into());
        }

        let mut best = 0;
        let mut max_count = entries[0].count;
        for (index, entry) in entries.iter().enumerate().skip(1) {
            if entry.count > max_count {
                max_count = entry.count;
                best = index;
            }
        }

        let chosen = &entries[best];
        let start_url = urls.join(&chosen.href)?;

        tracing::info!(
            category = %chosen.label,
            count = chosen.count,
            candidates = entries.len(),
            "Resolved category"
        );

        Ok(ResolvedCategory {
            label: chosen.label.clone(),
            start_url,
        })
    }
}

impl Default for CategorySelector {
    fn default() -> Self {
        Self::new()
    }
}
