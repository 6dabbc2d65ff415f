//! adsift - Marketplace Advertisement Ingestion Pipeline
//!
//! A crawling system that walks paginated marketplace search results,
//! extracts normalized advertisement records from listing cards, and persists
//! them for later querying.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Pagination walking, category resolution and the two-stage job pipeline
//! - [`parser`] - HTML parsing and record extraction
//! - [`models`] - Core data structures and types
//! - [`storage`] - Advertisement store (SQLite)
//!
//! # Example
//!
//! ```no_run
//! use adsift::config::Config;
//! use adsift::crawler::IngestionOrchestrator;
//! use adsift::models::IngestRequest;
//! use adsift::storage::SqliteAdvertStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let orchestrator = IngestionOrchestrator::new(&config)?;
//!     let store = SqliteAdvertStore::new(&config.database.sqlite_path)?;
//!
//!     let request = IngestRequest::new("macbook");
//!     let report = orchestrator.run(&request, &store).await?;
//!     println!("persisted {} of {} records", report.persisted, report.extracted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{IngestionOrchestrator, PageFetcher, PaginationWalker};
    pub use crate::error::{Error, ExtractError, FetchError, Result, StoreError};
    pub use crate::models::{Advertisement, IngestReport, IngestRequest, WalkOutcome};
    pub use crate::storage::{AdvertStore, SqliteAdvertStore};
}

// Direct re-exports for convenience
pub use models::{Advertisement, IngestReport, IngestRequest, WalkOutcome};
