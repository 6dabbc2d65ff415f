//! Error types for the adsift pipeline
//!
//! Domain-specific errors live in their own enums so call sites can match on
//! the failure mode that matters to them; the unified [`Error`] wraps them for
//! use across module boundaries.
//!
//! The fetch stage treats [`FetchError`] and [`ExtractError::NoCategories`] as
//! fatal to the whole job. [`ExtractError::PaginationBroken`] stops a walk
//! early but keeps the records gathered so far. All remaining `ExtractError`
//! variants are per-card: the card is skipped and the walk continues.
//! [`StoreError`] is per-record in the persist stage and never aborts a batch.

use std::io;
use thiserror::Error;

/// Errors from the HTTP fetch surface
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Server returned status {0}")]
    Status(u16),

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// Invalid or unjoinable URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Errors raised while extracting structure from fetched markup
#[derive(Error, Debug)]
pub enum ExtractError {
    /// No category entries found on the first results page
    #[error("No category entries found on first results page")]
    NoCategories,

    /// A forward-pagination control is present but carries no usable target
    #[error("Pagination control present but unusable")]
    PaginationBroken,

    /// Card has no title heading
    #[error("Card has no title heading")]
    TitleMissing,

    /// Card has no detail link
    #[error("Card has no detail link")]
    LinkMissing,

    /// Card has no location/date line
    #[error("Card has no location/date line")]
    InfoLineMissing,

    /// Publication date could not be resolved to a timestamp
    #[error("Unparseable publication date: {0}")]
    BadDate(String),
}

/// Errors from the persistence collaborator
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored row could not be mapped back to a record
    #[error("Corrupt stored row: {0}")]
    BadRow(String),

    /// The storage location could not be prepared
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the record
    #[error("Store rejected record: {0}")]
    Rejected(String),
}

/// Unified error type for the adsift crate
#[derive(Error, Debug)]
pub enum Error {
    /// Fetch-stage errors (network/status)
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Markup extraction errors
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Rejected job submission
    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a job-validation error
    pub fn invalid_job(msg: impl Into<String>) -> Self {
        Self::InvalidJob(msg.into())
    }

    /// Whether this error aborts the fetch stage of a job.
    ///
    /// Pagination breaks are the one extraction failure a walk survives;
    /// everything else surfacing at this level ends the job.
    pub fn is_fatal_to_job(&self) -> bool {
        !matches!(self, Self::Extract(ExtractError::PaginationBroken))
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
