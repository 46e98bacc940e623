//! # Wordbank Core
//!
//! Vocabulary memory engine for language-learning products:
//!
//! - **SM-2 Scheduling**: pure, deterministic spaced-repetition review
//!   scheduling on a 0–4 performance scale
//! - **Word Bank Model**: per-user vocabulary words with mastery tracking
//!   and an append-only (capped) review history
//! - **SQLite Persistence**: optimistic-concurrency review writes — read,
//!   compute, save with a version check, retry on conflict
//! - **Keyed Caching**: per-word LRU cache invalidated by exact
//!   `(user, word)` key
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wordbank_core::{Storage, WordInput};
//!
//! // Create storage (uses default platform-specific location)
//! let storage = Storage::new(None)?;
//!
//! // Add a word to a learner's bank
//! let input = WordInput {
//!     user_id: "learner-1".to_string(),
//!     word: "saudade".to_string(),
//!     definition: "a deep nostalgic longing".to_string(),
//!     ..Default::default()
//! };
//! let word = storage.create_word(input)?;
//!
//! // The learner rates their recall 0–4; out-of-range scores are clamped
//! let updated = storage.submit_review("learner-1", &word.id, 4, None)?;
//!
//! // Fetch what is due today
//! let due = storage.due_words("learner-1", 20)?;
//! ```
//!
//! The scheduler is also usable standalone, without storage:
//!
//! ```rust,ignore
//! use chrono::Utc;
//! use wordbank_core::{compute_next_review, MemoryState, Rating};
//!
//! let outcome = compute_next_review(Rating::Perfect, &MemoryState::default(), Utc::now());
//! assert_eq!(outcome.state.interval_days, 1);
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod cache;
pub mod scheduler;
pub mod storage;
pub mod vocab;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Vocabulary types
pub use vocab::{BankStats, ReviewRecord, VocabularyWord, WordInput, WordPatch};

// SM-2 scheduler
pub use scheduler::{
    compute_next_review, MemoryState, Rating, ReviewOutcome, ReviewStage, INITIAL_EASINESS,
    MIN_EASINESS,
};

// Storage layer
pub use storage::{Result, Storage, StorageError, REVIEW_HISTORY_CAP};

// Cache
pub use cache::WordCache;

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        compute_next_review, BankStats, MemoryState, Rating, Result, ReviewOutcome, ReviewRecord,
        ReviewStage, Storage, StorageError, VocabularyWord, WordInput, WordPatch,
    };
}
