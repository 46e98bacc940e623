//! Vocab module - Core types and data structures
//!
//! The vocabulary data model:
//! - Words with embedded SM-2 scheduling state and a write-version counter
//! - Creation and content-edit inputs
//! - Review history records and per-bank statistics

mod word;

pub use word::{BankStats, ReviewRecord, VocabularyWord, WordInput, WordPatch};
