//! Pagination walking
//!
//! One walk covers the whole fetch stage of a job: resolve the category once,
//! then fetch, parse, and extract listing pages in site order until the page
//! limit, the last page, or a pagination break.

use crate::config::Config;
use crate::crawler::category::CategorySelector;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::url::SearchUrlBuilder;
use crate::error::{Error, ExtractError};
use crate::models::{IngestRequest, WalkOutcome};
use crate::parser::{ListingPageParser, PageCursor, RecordExtractor};

/// Walk states
///
/// Category resolution runs exactly once, at the start; every remaining
/// iteration is a fetch/extract cycle. Termination decisions are centralized
/// in [`next_state`] so they are testable without I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    ResolveCategory,
    FetchPage,
    Done,
}

/// Transition function for the fetch/extract loop
///
/// Reaching the page limit is success, not truncation-as-error.
fn next_state(pages_visited: u32, limit: u32, cursor: &PageCursor) -> WalkState {
    if pages_visited >= limit {
        return WalkState::Done;
    }
    match cursor {
        PageCursor::Next(_) => WalkState::FetchPage,
        PageCursor::End => WalkState::Done,
    }
}

/// Sequential walker over paginated search results
pub struct PaginationWalker {
    fetcher: PageFetcher,
    urls: SearchUrlBuilder,
    categories: CategorySelector,
    pages: ListingPageParser,
    cards: RecordExtractor,
}

impl PaginationWalker {
    /// Create a walker from configuration
    pub fn new(config: &Config) -> Result<Self, Error> {
        let fetcher = PageFetcher::from_config(&config.crawler)?;
        let urls = SearchUrlBuilder::from_site(&config.site)?;
        Ok(Self::with_parts(fetcher, urls))
    }

    /// Create a walker from pre-built parts (used by tests with mock servers)
    #[must_use]
    pub fn with_parts(fetcher: PageFetcher, urls: SearchUrlBuilder) -> Self {
        let cards = RecordExtractor::new(urls.base().clone());
        Self {
            fetcher,
            urls,
            categories: CategorySelector::new(),
            pages: ListingPageParser::new(),
            cards,
        }
    }

    /// Run the fetch stage of one job to completion or early stop
    ///
    /// Page fetches are strictly sequential: each page's URL comes from the
    /// previous page's response. Per-card extraction failures are counted and
    /// skipped; fetch failures and a missing category block abort the walk.
    pub async fn walk(&self, request: &IngestRequest) -> Result<WalkOutcome, Error> {
        let mut outcome = WalkOutcome::default();
        let mut current_url =
            self.urls
                .search(&request.query, request.price_from, request.price_to);
        let mut state = WalkState::ResolveCategory;

        while state != WalkState::Done {
            match state {
                WalkState::ResolveCategory => {
                    let resolved = self
                        .categories
                        .resolve(&self.fetcher, &self.urls, &current_url)
                        .await?;
                    outcome.tag = resolved.label;
                    current_url = resolved.start_url;
                    state = WalkState::FetchPage;
                }

                WalkState::FetchPage => {
                    let html = self.fetcher.fetch_page(&current_url).await?;

                    let page = match self.pages.parse(&html) {
                        Ok(page) => page,
                        Err(ExtractError::PaginationBroken) => {
                            tracing::warn!(
                                url = %current_url,
                                pages_visited = outcome.pages_visited,
                                "Broken pagination control, stopping walk early"
                            );
                            outcome.stopped_early = true;
                            state = WalkState::Done;
                            continue;
                        }
                        Err(other) => return Err(other.into()),
                    };

                    self.extract_cards(&page.cards, request, &mut outcome);
                    outcome.pages_visited += 1;

                    state = next_state(outcome.pages_visited, request.limit, &page.next);
                    if state == WalkState::FetchPage {
                        if let PageCursor::Next(href) = &page.next {
                            match self.urls.join(href) {
                                Ok(url) => current_url = url,
                                Err(err) => {
                                    // An unjoinable target is a malformed
                                    // control: early stop, keep what we have
                                    tracing::warn!(
                                        error = %err,
                                        "Unusable next-page target, stopping walk early"
                                    );
                                    outcome.stopped_early = true;
                                    state = WalkState::Done;
                                }
                            }
                        }
                    }
                }

                WalkState::Done => {}
            }
        }

        tracing::info!(
            query = %request.query,
            tag = %outcome.tag,
            pages = outcome.pages_visited,
            records = outcome.records.len(),
            card_failures = outcome.card_failures,
            stopped_early = outcome.stopped_early,
            "Walk completed"
        );

        Ok(outcome)
    }

    /// Extract every card on a page, skipping individual failures
    fn extract_cards(
        &self,
        fragments: &[String],
        request: &IngestRequest,
        outcome: &mut WalkOutcome,
    ) {
        for fragment in fragments {
            outcome.cards_seen += 1;
            match self.cards.extract(fragment) {
                Ok(mut advert) => {
                    advert.query = request.query.clone();
                    advert.tag = outcome.tag.clone();
                    outcome.records.push(advert);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Skipping card");
                    outcome.card_failures += 1;
                }
            }
        }
    }
}
