//! Durable advertisement storage
//!
//! The pipeline only ever talks to the [`AdvertStore`] trait; SQLite is the
//! production backend.

pub mod repository;

pub use repository::{AdvertStore, SqliteAdvertStore, StoredAdvertisement};
