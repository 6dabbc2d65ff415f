// Core data structures for the adsift pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One extracted marketplace advertisement
///
/// Produced by record extraction from a single listing card; `query` and
/// `tag` are attached by the walker once per job. The record carries no
/// identity until the store assigns one at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub title: String,
    pub url: String,
    /// Price in whole currency units; 0 when the source field was absent or
    /// unparseable.
    pub price: i64,
    pub place: String,
    pub date_added: DateTime<Utc>,
    /// Search query that produced this record
    pub query: String,
    /// Category label resolved once per job
    pub tag: String,
}

/// One ingestion job: a query plus its filters
///
/// Transient by design. A job lives for the duration of its two pipeline
/// stages and has no persisted representation; a job lost to a restart must
/// be resubmitted by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Search query text
    pub query: String,

    /// Maximum number of listing pages to visit
    pub limit: u32,

    /// Minimum price filter
    pub price_from: f64,

    /// Maximum price filter
    pub price_to: f64,
}

impl IngestRequest {
    /// Create a request with default filters (one page, no price bounds)
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: 1,
            price_from: 0.0,
            price_to: 0.0,
        }
    }

    /// Validate the submission inputs
    pub fn validate(&self) -> Result<(), Error> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid_job("query must not be empty"));
        }
        if self.limit < 1 {
            return Err(Error::invalid_job("limit must be at least 1"));
        }
        if self.price_from < 0.0 || self.price_to < 0.0 {
            return Err(Error::invalid_job("price filters must not be negative"));
        }
        Ok(())
    }
}

/// Accumulated result of one pagination walk (fetch stage)
///
/// Passed by value between walk states so that partial results on an early
/// stop are an explicit, inspectable contract rather than closure state.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    /// Extracted records, in page order then document order
    pub records: Vec<Advertisement>,

    /// Category label resolved for the whole job
    pub tag: String,

    /// Listing pages actually visited
    pub pages_visited: u32,

    /// Card fragments seen across all pages
    pub cards_seen: usize,

    /// Cards skipped because a required field was missing
    pub card_failures: usize,

    /// True when a broken pagination control ended the walk before the page
    /// limit or the natural last page
    pub stopped_early: bool,
}

/// Final report for one job, covering both pipeline stages
///
/// Partial success is a valid outcome and is observable here; nothing about
/// per-record failures is swallowed into logs alone.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub query: String,
    pub tag: String,
    pub pages_visited: u32,
    pub cards_seen: usize,
    pub extracted: usize,
    pub card_failures: usize,
    pub persisted: usize,
    pub persist_failures: usize,
    pub stopped_early: bool,
}

impl IngestReport {
    /// Ratio of persisted records to extracted records (0.0 - 1.0)
    pub fn persist_rate(&self) -> f64 {
        if self.extracted == 0 {
            return 1.0;
        }
        self.persisted as f64 / self.extracted as f64
    }
}
