//! Scheduler Module
//!
//! Pure SM-2 spaced-repetition scheduling: given a recall performance
//! rating and a word's current memory state, produce the updated state and
//! the next review date. Total over all inputs — malformed ratings are
//! clamped and malformed state fields normalized, never rejected.

mod sm2;

pub use sm2::{
    compute_next_review, MemoryState, Rating, ReviewOutcome, ReviewStage, INITIAL_EASINESS,
    MIN_EASINESS,
};
