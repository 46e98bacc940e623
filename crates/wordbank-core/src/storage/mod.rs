//! Storage Module
//!
//! SQLite-based storage layer with:
//! - Versioned schema migrations
//! - Optimistic-concurrency review submission (compare-and-swap on a
//!   per-word version counter, bounded retries)
//! - Capped, paginated review-history log

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{Result, Storage, StorageError, REVIEW_HISTORY_CAP};
