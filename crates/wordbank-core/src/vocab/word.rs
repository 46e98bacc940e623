//! Vocabulary Word - The fundamental unit of a learner's word bank
//!
//! Each word carries:
//! - Display content (word, definition, context, examples)
//! - SM-2 scheduling state
//! - An append-only review history (stored separately, capped)
//! - A version counter for optimistic-concurrency writes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::{MemoryState, ReviewStage, INITIAL_EASINESS};

// ============================================================================
// VOCABULARY WORD
// ============================================================================

/// A vocabulary word in a learner's bank
///
/// Content fields are immutable after creation except through an explicit
/// [`WordPatch`]; scheduling fields change only through review events.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyWord {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Owner of the containing vocabulary bank
    pub user_id: String,
    /// The word itself
    pub word: String,
    /// Its definition
    pub definition: String,
    /// Context the word was encountered in
    pub context: Option<String>,
    /// Example sentences
    pub examples: Vec<String>,

    // ========== SM-2 state ==========
    /// User-facing progress score, 0–100
    pub mastery: i32,
    /// Easiness factor (floor 1.3); lower = harder, reviewed more often
    pub easiness_factor: f64,
    /// Consecutive successful reviews since the last lapse
    pub repetitions: i32,
    /// Days until the next scheduled review
    pub interval_days: i32,

    // ========== Scheduling ==========
    /// Next scheduled review date
    pub next_review: Option<DateTime<Utc>>,
    /// Most recent review event
    pub last_reviewed: Option<DateTime<Utc>>,

    /// When the word was created
    pub created_at: DateTime<Utc>,
    /// When the word was last modified
    pub updated_at: DateTime<Utc>,

    /// Write version, incremented on every state change. Saves carry the
    /// expected version; a mismatch is a conflict, not an overwrite.
    pub version: i64,
}

impl Default for VocabularyWord {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            user_id: String::new(),
            word: String::new(),
            definition: String::new(),
            context: None,
            examples: vec![],
            mastery: 0,
            easiness_factor: INITIAL_EASINESS,
            repetitions: 0,
            interval_days: 0,
            next_review: None,
            last_reviewed: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }
}

impl VocabularyWord {
    /// Extract the scheduling state for the scheduler.
    pub fn memory_state(&self) -> MemoryState {
        MemoryState {
            mastery: self.mastery,
            easiness_factor: self.easiness_factor,
            repetitions: self.repetitions,
            interval_days: self.interval_days,
        }
    }

    /// The implicit review stage this word sits in.
    pub fn stage(&self) -> ReviewStage {
        self.memory_state().stage()
    }

    /// Check if this word is due for review at the given time.
    ///
    /// A word with no scheduled review yet is always due.
    pub fn is_due_at(&self, time: DateTime<Utc>) -> bool {
        self.next_review.map(|t| t <= time).unwrap_or(true)
    }

    /// Check if this word is due for review now.
    pub fn is_due(&self) -> bool {
        self.is_due_at(Utc::now())
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for adding a word to a learner's bank
///
/// Uses `deny_unknown_fields` to prevent field injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WordInput {
    /// Owner of the vocabulary bank
    pub user_id: String,
    /// The word to learn
    pub word: String,
    /// Its definition
    pub definition: String,
    /// Context the word was encountered in
    pub context: Option<String>,
    /// Example sentences
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Default for WordInput {
    fn default() -> Self {
        Self {
            user_id: String::new(),
            word: String::new(),
            definition: String::new(),
            context: None,
            examples: vec![],
        }
    }
}

/// Explicit edit to a word's content fields
///
/// Scheduling state cannot be patched; it changes only through reviews.
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WordPatch {
    /// Replacement definition
    pub definition: Option<String>,
    /// Replacement context
    pub context: Option<String>,
    /// Replacement example list
    pub examples: Option<Vec<String>>,
}

impl WordPatch {
    /// Whether the patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.definition.is_none() && self.context.is_none() && self.examples.is_none()
    }
}

// ============================================================================
// REVIEW HISTORY
// ============================================================================

/// One entry of a word's append-only review log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// When the review happened
    pub reviewed_at: DateTime<Utc>,
    /// Performance score, always clamped to 0–4
    pub performance: u8,
    /// Context the review happened in (session, exercise, ...)
    pub context: Option<String>,
}

// ============================================================================
// BANK STATISTICS
// ============================================================================

/// Aggregate statistics over one learner's vocabulary bank
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStats {
    /// Total number of words in the bank
    pub total_words: i64,
    /// Words currently due for review
    pub words_due: i64,
    /// Average mastery across all words
    pub average_mastery: f64,
    /// Average easiness factor across all words
    pub average_easiness: f64,
    /// Creation time of the oldest word
    pub oldest_word: Option<DateTime<Utc>>,
    /// Creation time of the newest word
    pub newest_word: Option<DateTime<Utc>>,
    /// Review history entries currently retained
    pub reviews_logged: i64,
}

impl Default for BankStats {
    fn default() -> Self {
        Self {
            total_words: 0,
            words_due: 0,
            average_mastery: 0.0,
            average_easiness: 0.0,
            oldest_word: None,
            newest_word: None,
            reviews_logged: 0,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_default() {
        let word = VocabularyWord::default();
        assert!(word.id.is_empty());
        assert_eq!(word.mastery, 0);
        assert_eq!(word.version, 1);
        assert!((word.easiness_factor - INITIAL_EASINESS).abs() < f64::EPSILON);
        assert!(word.is_due());
        assert_eq!(word.stage(), ReviewStage::New);
    }

    #[test]
    fn test_due_follows_next_review() {
        let mut word = VocabularyWord::default();
        let now = Utc::now();

        word.next_review = Some(now + chrono::Duration::days(3));
        assert!(!word.is_due_at(now));

        word.next_review = Some(now - chrono::Duration::hours(1));
        assert!(word.is_due_at(now));
    }

    #[test]
    fn test_memory_state_extraction() {
        let word = VocabularyWord {
            mastery: 60,
            easiness_factor: 2.1,
            repetitions: 4,
            interval_days: 21,
            ..Default::default()
        };
        let state = word.memory_state();
        assert_eq!(state.mastery, 60);
        assert_eq!(state.repetitions, 4);
        assert_eq!(state.interval_days, 21);
        assert_eq!(state.stage(), ReviewStage::Long);
    }

    #[test]
    fn test_word_input_deny_unknown_fields() {
        let json = r#"{"userId": "u1", "word": "saudade", "definition": "longing", "context": null}"#;
        let result: Result<WordInput, _> = serde_json::from_str(json);
        assert!(result.is_ok());

        let json_with_unknown =
            r#"{"userId": "u1", "word": "saudade", "definition": "longing", "mastery": 100}"#;
        let result: Result<WordInput, _> = serde_json::from_str(json_with_unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(WordPatch::default().is_empty());
        assert!(!WordPatch {
            definition: Some("new".into()),
            ..Default::default()
        }
        .is_empty());
    }
}
