//! Pagination walking and job orchestration
//!
//! This module implements the fetch side of the pipeline: building search
//! URLs, fetching pages, resolving the job's category, walking pagination,
//! and driving both pipeline stages of a job.

pub mod category;
pub mod fetcher;
pub mod pipeline;
pub mod url;
pub mod walker;

pub use category::{CategorySelector, ResolvedCategory};
pub use fetcher::PageFetcher;
pub use pipeline::{persist_batch, IngestionOrchestrator};
pub use url::SearchUrlBuilder;
pub use walker::{PaginationWalker, WalkState};
