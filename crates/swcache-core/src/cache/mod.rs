//! Durable cache generations (SQLite via sqlx).
//!
//! Each deployed version owns one generation, named by its `cache_name`.
//! A single-row `controller` table records which generation is active.

mod db;
mod entries;
mod error;
mod generations;
mod types;

pub use db::CacheStorage;
pub use error::StoreError;
pub use types::{EntrySummary, GenerationState, GenerationSummary};
