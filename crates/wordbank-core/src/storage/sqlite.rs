//! SQLite Storage Implementation
//!
//! Persistence layer for vocabulary banks. Review submission follows a
//! read-compute-write cycle with a version check on the write: a stale
//! version is a conflict and the whole cycle is retried, never blindly
//! overwritten.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use crate::cache::WordCache;
use crate::scheduler::{compute_next_review, Rating, ReviewOutcome};
use crate::vocab::{BankStats, ReviewRecord, VocabularyWord, WordInput, WordPatch};

/// Review history entries retained per word. The log is append-only up to
/// this cap; older entries are trimmed inside the review transaction.
pub const REVIEW_HISTORY_CAP: i64 = 500;

/// Attempts at the read-compute-write cycle before a conflict is surfaced.
const MAX_REVIEW_RETRIES: u32 = 3;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Word not found
    #[error("Word not found: {0}")]
    NotFound(String),
    /// Concurrent write detected; the operation can be retried
    #[error("Write conflict on word {word_id}, please try again")]
    Conflict {
        /// The contended word
        word_id: String,
    },
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

impl StorageError {
    /// Whether retrying the whole read-compute-write cycle can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORAGE
// ============================================================================

/// Main storage struct over a SQLite database
///
/// Uses separate reader/writer connections for interior mutability.
/// All methods take `&self` (not `&mut self`), making Storage `Send + Sync`
/// so callers can share it as `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    /// Read-through cache of hydrated words, invalidated by exact
    /// `(user_id, word_id)` key on every write
    cache: WordCache,
}

impl Storage {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Create new storage instance
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => {
                let proj_dirs = ProjectDirs::from("com", "wordbank", "core").ok_or_else(|| {
                    StorageError::Init("Could not determine project directories".to_string())
                })?;

                let data_dir = proj_dirs.data_dir();
                std::fs::create_dir_all(data_dir)?;
                // Restrict directory permissions to owner-only on Unix
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let perms = std::fs::Permissions::from_mode(0o700);
                    let _ = std::fs::set_permissions(data_dir, perms);
                }
                data_dir.join("wordbank.db")
            }
        };

        let writer_conn = Connection::open(&path)?;
        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            cache: WordCache::new(),
        })
    }

    // ========================================================================
    // WORD CRUD
    // ========================================================================

    /// Add a word to a learner's bank
    pub fn create_word(&self, input: WordInput) -> Result<VocabularyWord> {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let examples_json =
            serde_json::to_string(&input.examples).unwrap_or_else(|_| "[]".to_string());

        {
            let writer = self
                .writer
                .lock()
                .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
            writer.execute(
                "INSERT INTO words (
                    id, user_id, word, definition, context, examples,
                    mastery, easiness_factor, repetitions, interval_days,
                    next_review, last_reviewed, created_at, updated_at, version
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6,
                    ?7, ?8, ?9, ?10,
                    ?11, ?12, ?13, ?14, ?15
                )",
                params![
                    id,
                    input.user_id,
                    input.word,
                    input.definition,
                    input.context,
                    examples_json,
                    0,
                    crate::scheduler::INITIAL_EASINESS,
                    0,
                    0,
                    Option::<String>::None,
                    Option::<String>::None,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                    1,
                ],
            )?;
        }

        self.read_word_fresh(&input.user_id, &id)?
            .ok_or(StorageError::NotFound(id))
    }

    /// Get a word by ID, read-through the cache
    pub fn get_word(&self, user_id: &str, word_id: &str) -> Result<Option<VocabularyWord>> {
        if let Some(word) = self.cache.get(user_id, word_id) {
            return Ok(Some(word));
        }

        let word = self.read_word_fresh(user_id, word_id)?;
        if let Some(ref word) = word {
            self.cache.put(word);
        }
        Ok(word)
    }

    /// Read a word straight from the database, bypassing the cache.
    ///
    /// Review submission reads through here so the version check runs
    /// against the latest persisted state.
    fn read_word_fresh(&self, user_id: &str, word_id: &str) -> Result<Option<VocabularyWord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare("SELECT * FROM words WHERE id = ?1 AND user_id = ?2")?;

        let word = stmt
            .query_row(params![word_id, user_id], |row| Self::row_to_word(row))
            .optional()?;
        Ok(word)
    }

    /// Apply an explicit content edit to a word
    ///
    /// Only content fields can be patched; scheduling state changes
    /// exclusively through [`Storage::submit_review`].
    pub fn update_word_content(
        &self,
        user_id: &str,
        word_id: &str,
        patch: WordPatch,
    ) -> Result<VocabularyWord> {
        if patch.is_empty() {
            return self
                .get_word(user_id, word_id)?
                .ok_or_else(|| StorageError::NotFound(word_id.to_string()));
        }

        let now = Utc::now();
        let examples_json = patch
            .examples
            .as_ref()
            .map(|e| serde_json::to_string(e).unwrap_or_else(|_| "[]".to_string()));

        let changed = {
            let writer = self
                .writer
                .lock()
                .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
            writer.execute(
                "UPDATE words SET
                    definition = COALESCE(?1, definition),
                    context = COALESCE(?2, context),
                    examples = COALESCE(?3, examples),
                    updated_at = ?4,
                    version = version + 1
                WHERE id = ?5 AND user_id = ?6",
                params![
                    patch.definition,
                    patch.context,
                    examples_json,
                    now.to_rfc3339(),
                    word_id,
                    user_id,
                ],
            )?
        };

        if changed == 0 {
            return Err(StorageError::NotFound(word_id.to_string()));
        }

        self.cache.invalidate(user_id, word_id);
        self.read_word_fresh(user_id, word_id)?
            .ok_or_else(|| StorageError::NotFound(word_id.to_string()))
    }

    /// Delete a word. Terminal: the word and its review history are gone.
    pub fn delete_word(&self, user_id: &str, word_id: &str) -> Result<bool> {
        let changed = {
            let writer = self
                .writer
                .lock()
                .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
            writer.execute(
                "DELETE FROM words WHERE id = ?1 AND user_id = ?2",
                params![word_id, user_id],
            )?
        };

        self.cache.invalidate(user_id, word_id);
        Ok(changed > 0)
    }

    // ========================================================================
    // REVIEWS
    // ========================================================================

    /// Record a review of a word and reschedule it
    ///
    /// Runs the read-compute-write cycle: load the current state, feed it
    /// through the scheduler, and save with a version check. A concurrent
    /// write between the read and the save is detected as a conflict and
    /// the cycle is retried from the fresh state, up to 3 attempts.
    ///
    /// `score` is clamped to the 0–4 rating scale, never rejected.
    pub fn submit_review(
        &self,
        user_id: &str,
        word_id: &str,
        score: i64,
        context: Option<&str>,
    ) -> Result<VocabularyWord> {
        let rating = Rating::from_score(score);

        for attempt in 0..MAX_REVIEW_RETRIES {
            let word = self
                .read_word_fresh(user_id, word_id)?
                .ok_or_else(|| StorageError::NotFound(word_id.to_string()))?;

            let now = Utc::now();
            let outcome = compute_next_review(rating, &word.memory_state(), now);

            match self.save_review_outcome(&word, &outcome, rating, context, now) {
                Ok(()) => {
                    self.cache.invalidate(user_id, word_id);
                    return self
                        .read_word_fresh(user_id, word_id)?
                        .ok_or_else(|| StorageError::NotFound(word_id.to_string()));
                }
                Err(e) if e.is_retryable() => {
                    tracing::debug!(
                        word_id,
                        attempt,
                        "Review write conflict, re-reading and reapplying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(StorageError::Conflict {
            word_id: word_id.to_string(),
        })
    }

    /// Persist one review outcome against an expected word version
    ///
    /// The state update, the history append, and the retention trim commit
    /// in a single transaction. `word.version` is the expected version; if
    /// another writer got there first, nothing is written and
    /// [`StorageError::Conflict`] is returned.
    pub fn save_review_outcome(
        &self,
        word: &VocabularyWord,
        outcome: &ReviewOutcome,
        rating: Rating,
        context: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let tx = writer.transaction()?;

        let changed = tx.execute(
            "UPDATE words SET
                mastery = ?1,
                easiness_factor = ?2,
                repetitions = ?3,
                interval_days = ?4,
                next_review = ?5,
                last_reviewed = ?6,
                updated_at = ?7,
                version = version + 1
            WHERE id = ?8 AND version = ?9",
            params![
                outcome.state.mastery,
                outcome.state.easiness_factor,
                outcome.state.repetitions,
                outcome.state.interval_days,
                outcome.next_review.to_rfc3339(),
                now.to_rfc3339(),
                now.to_rfc3339(),
                word.id,
                word.version,
            ],
        )?;

        if changed == 0 {
            // Dropping the transaction rolls back; nothing was written.
            return Err(StorageError::Conflict {
                word_id: word.id.clone(),
            });
        }

        tx.execute(
            "INSERT INTO review_history (word_id, reviewed_at, performance, context)
             VALUES (?1, ?2, ?3, ?4)",
            params![word.id, now.to_rfc3339(), rating.score(), context],
        )?;

        // Retention: keep the newest entries, trim the rest
        tx.execute(
            "DELETE FROM review_history
             WHERE word_id = ?1
             AND id NOT IN (
                 SELECT id FROM review_history
                 WHERE word_id = ?1
                 ORDER BY reviewed_at DESC, id DESC
                 LIMIT ?2
             )",
            params![word.id, REVIEW_HISTORY_CAP],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Page through a word's review history, newest first
    pub fn review_history(
        &self,
        user_id: &str,
        word_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ReviewRecord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT h.reviewed_at, h.performance, h.context
             FROM review_history h
             JOIN words w ON h.word_id = w.id
             WHERE w.id = ?1 AND w.user_id = ?2
             ORDER BY h.reviewed_at DESC, h.id DESC
             LIMIT ?3 OFFSET ?4",
        )?;

        let rows = stmt.query_map(params![word_id, user_id, limit, offset], |row| {
            let reviewed_at: String = row.get("reviewed_at")?;
            Ok(ReviewRecord {
                reviewed_at: Self::parse_timestamp(&reviewed_at, "reviewed_at")?,
                performance: row.get("performance")?,
                context: row.get("context")?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Words due for review at `now`, soonest first
    ///
    /// Words that have never been reviewed are always due.
    pub fn due_words(&self, user_id: &str, limit: i64) -> Result<Vec<VocabularyWord>> {
        let now = Utc::now();
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM words
             WHERE user_id = ?1
             AND (next_review IS NULL OR next_review <= ?2)
             ORDER BY next_review ASC
             LIMIT ?3",
        )?;

        let rows = stmt.query_map(params![user_id, now.to_rfc3339(), limit], |row| {
            Self::row_to_word(row)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Page through a learner's bank in creation order
    pub fn list_words(
        &self,
        user_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VocabularyWord>> {
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(
            "SELECT * FROM words
             WHERE user_id = ?1
             ORDER BY created_at ASC, id ASC
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt.query_map(params![user_id, limit, offset], |row| {
            Self::row_to_word(row)
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Aggregate statistics for one learner's bank
    pub fn stats(&self, user_id: &str) -> Result<BankStats> {
        let now = Utc::now();
        let reader = self
            .reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;

        let mut stats = reader.query_row(
            "SELECT
                COUNT(*) AS total,
                COALESCE(AVG(mastery), 0.0) AS avg_mastery,
                COALESCE(AVG(easiness_factor), 0.0) AS avg_easiness,
                MIN(created_at) AS oldest,
                MAX(created_at) AS newest
             FROM words WHERE user_id = ?1",
            params![user_id],
            |row| {
                let oldest: Option<String> = row.get("oldest")?;
                let newest: Option<String> = row.get("newest")?;
                Ok(BankStats {
                    total_words: row.get("total")?,
                    words_due: 0,
                    average_mastery: row.get("avg_mastery")?,
                    average_easiness: row.get("avg_easiness")?,
                    oldest_word: oldest.and_then(|s| Self::rfc3339_opt(&s)),
                    newest_word: newest.and_then(|s| Self::rfc3339_opt(&s)),
                    reviews_logged: 0,
                })
            },
        )?;

        stats.words_due = reader.query_row(
            "SELECT COUNT(*) FROM words
             WHERE user_id = ?1
             AND (next_review IS NULL OR next_review <= ?2)",
            params![user_id, now.to_rfc3339()],
            |row| row.get(0),
        )?;

        stats.reviews_logged = reader.query_row(
            "SELECT COUNT(*) FROM review_history h
             JOIN words w ON h.word_id = w.id
             WHERE w.user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;

        Ok(stats)
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    fn rfc3339_opt(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    /// Convert a row to VocabularyWord
    fn row_to_word(row: &rusqlite::Row) -> rusqlite::Result<VocabularyWord> {
        let examples_json: String = row.get("examples")?;
        let examples: Vec<String> = serde_json::from_str(&examples_json).unwrap_or_default();

        let created_at: String = row.get("created_at")?;
        let updated_at: String = row.get("updated_at")?;
        let next_review: Option<String> = row.get("next_review")?;
        let last_reviewed: Option<String> = row.get("last_reviewed")?;

        Ok(VocabularyWord {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            word: row.get("word")?,
            definition: row.get("definition")?,
            context: row.get("context")?,
            examples,
            mastery: row.get("mastery")?,
            easiness_factor: row.get("easiness_factor")?,
            repetitions: row.get("repetitions")?,
            interval_days: row.get("interval_days")?,
            next_review: next_review.and_then(|s| Self::rfc3339_opt(&s)),
            last_reviewed: last_reviewed.and_then(|s| Self::rfc3339_opt(&s)),
            created_at: Self::parse_timestamp(&created_at, "created_at")?,
            updated_at: Self::parse_timestamp(&updated_at, "updated_at")?,
            version: row.get("version")?,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = Storage::new(Some(db_path)).unwrap();
        (dir, storage)
    }

    fn sample_input(user_id: &str, word: &str) -> WordInput {
        WordInput {
            user_id: user_id.to_string(),
            word: word.to_string(),
            definition: format!("definition of {}", word),
            context: Some("seen in a short story".to_string()),
            examples: vec![format!("A sentence using {}.", word)],
        }
    }

    #[test]
    fn test_storage_creation() {
        let (_dir, storage) = create_test_storage();
        let stats = storage.stats("u1").unwrap();
        assert_eq!(stats.total_words, 0);
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, storage) = create_test_storage();

        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();
        assert!(!word.id.is_empty());
        assert_eq!(word.word, "saudade");
        assert_eq!(word.version, 1);
        assert_eq!(word.repetitions, 0);
        assert!(word.next_review.is_none());

        let retrieved = storage.get_word("u1", &word.id).unwrap().unwrap();
        assert_eq!(retrieved.definition, word.definition);

        // Other users never see the word
        assert!(storage.get_word("u2", &word.id).unwrap().is_none());
    }

    #[test]
    fn test_submit_review_updates_state_and_history() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();

        let reviewed = storage
            .submit_review("u1", &word.id, 4, Some("reading session"))
            .unwrap();
        assert_eq!(reviewed.repetitions, 1);
        assert_eq!(reviewed.interval_days, 1);
        assert_eq!(reviewed.mastery, 15);
        assert_eq!(reviewed.version, 2);
        assert!(reviewed.next_review.is_some());
        assert!(reviewed.last_reviewed.is_some());

        let history = storage.review_history("u1", &word.id, 10, 0).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].performance, 4);
        assert_eq!(history[0].context.as_deref(), Some("reading session"));
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();

        let reviewed = storage.submit_review("u1", &word.id, 7, None).unwrap();
        assert_eq!(reviewed.mastery, 15);

        let history = storage.review_history("u1", &word.id, 10, 0).unwrap();
        assert_eq!(history[0].performance, 4);
    }

    #[test]
    fn test_failed_review_resets_streak() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();

        storage.submit_review("u1", &word.id, 4, None).unwrap();
        storage.submit_review("u1", &word.id, 4, None).unwrap();
        let after_lapse = storage.submit_review("u1", &word.id, 0, None).unwrap();

        assert_eq!(after_lapse.repetitions, 0);
        assert_eq!(after_lapse.interval_days, 1);
    }

    #[test]
    fn test_stale_version_save_is_a_conflict() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();

        // Another writer reviews the word first, bumping its version
        storage.submit_review("u1", &word.id, 3, None).unwrap();

        // A save against the stale snapshot must be rejected, not applied
        let now = Utc::now();
        let outcome = compute_next_review(Rating::Perfect, &word.memory_state(), now);
        let err = storage
            .save_review_outcome(&word, &outcome, Rating::Perfect, None, now)
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, StorageError::Conflict { .. }));

        // The stale write left no trace
        let current = storage.get_word("u1", &word.id).unwrap().unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(storage.review_history("u1", &word.id, 10, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_history_is_capped() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();

        for i in 0..(REVIEW_HISTORY_CAP + 20) {
            storage
                .submit_review("u1", &word.id, (i % 5) as i64, None)
                .unwrap();
        }

        let stats = storage.stats("u1").unwrap();
        assert_eq!(stats.reviews_logged, REVIEW_HISTORY_CAP);

        // Pagination walks the retained window, newest first
        let first_page = storage.review_history("u1", &word.id, 50, 0).unwrap();
        let second_page = storage.review_history("u1", &word.id, 50, 50).unwrap();
        assert_eq!(first_page.len(), 50);
        assert_eq!(second_page.len(), 50);
        assert!(first_page[0].reviewed_at >= second_page[0].reviewed_at);
    }

    #[test]
    fn test_content_edit_bumps_version() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();

        let patch = WordPatch {
            definition: Some("a deep nostalgic longing".to_string()),
            ..Default::default()
        };
        let updated = storage.update_word_content("u1", &word.id, patch).unwrap();
        assert_eq!(updated.definition, "a deep nostalgic longing");
        assert_eq!(updated.version, 2);
        // Untouched fields survive
        assert_eq!(updated.context, word.context);
        assert_eq!(updated.examples, word.examples);
    }

    #[test]
    fn test_content_edit_invalidates_cache() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();

        // Warm the cache
        storage.get_word("u1", &word.id).unwrap();

        let patch = WordPatch {
            definition: Some("updated".to_string()),
            ..Default::default()
        };
        storage.update_word_content("u1", &word.id, patch).unwrap();

        let cached = storage.get_word("u1", &word.id).unwrap().unwrap();
        assert_eq!(cached.definition, "updated");
    }

    #[test]
    fn test_delete_is_terminal() {
        let (_dir, storage) = create_test_storage();
        let word = storage.create_word(sample_input("u1", "saudade")).unwrap();
        storage.submit_review("u1", &word.id, 3, None).unwrap();

        assert!(storage.delete_word("u1", &word.id).unwrap());
        assert!(storage.get_word("u1", &word.id).unwrap().is_none());
        // History cascades with the word
        assert!(storage.review_history("u1", &word.id, 10, 0).unwrap().is_empty());
        // Deleting again reports nothing deleted
        assert!(!storage.delete_word("u1", &word.id).unwrap());
    }

    #[test]
    fn test_due_words_ordering() {
        let (_dir, storage) = create_test_storage();

        let fresh = storage.create_word(sample_input("u1", "fresh")).unwrap();
        let reviewed = storage.create_word(sample_input("u1", "reviewed")).unwrap();
        // Perfect review pushes next_review a day out
        storage.submit_review("u1", &reviewed.id, 4, None).unwrap();

        let due = storage.due_words("u1", 10).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, fresh.id);
    }

    #[test]
    fn test_list_words_pagination() {
        let (_dir, storage) = create_test_storage();
        for i in 0..5 {
            storage
                .create_word(sample_input("u1", &format!("word{}", i)))
                .unwrap();
        }

        let page1 = storage.list_words("u1", 3, 0).unwrap();
        let page2 = storage.list_words("u1", 3, 3).unwrap();
        assert_eq!(page1.len(), 3);
        assert_eq!(page2.len(), 2);
    }

    #[test]
    fn test_stats() {
        let (_dir, storage) = create_test_storage();
        let a = storage.create_word(sample_input("u1", "alpha")).unwrap();
        storage.create_word(sample_input("u1", "beta")).unwrap();
        storage.create_word(sample_input("u2", "gamma")).unwrap();

        storage.submit_review("u1", &a.id, 4, None).unwrap();

        let stats = storage.stats("u1").unwrap();
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.words_due, 1);
        assert_eq!(stats.reviews_logged, 1);
        assert!(stats.average_mastery > 0.0);
        assert!(stats.oldest_word.is_some());
    }
}
