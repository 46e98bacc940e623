//! SM-2 review scheduling.
//!
//! Classic SuperMemo-2 recalculation adapted to a 0–4 performance scale:
//! larger gaps from the top rating penalize the easiness factor more
//! steeply, failures reset the repetition streak, and the first two
//! successful repetitions use fixed 1-day / 6-day intervals before
//! intervals grow geometrically by the easiness factor.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Easiness factor floor. No amount of poor performance drops below this.
pub const MIN_EASINESS: f64 = 1.3;

/// Easiness factor assigned to a word that has never been reviewed.
pub const INITIAL_EASINESS: f64 = 2.5;

/// Fixed interval (days) for the first successful repetition after a reset.
const FIRST_INTERVAL_DAYS: i32 = 1;

/// Fixed interval (days) for the second consecutive successful repetition.
const SECOND_INTERVAL_DAYS: i32 = 6;

// ============================================================================
// RATING
// ============================================================================

/// Recall performance reported by the learner after a review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    /// Forgot the word completely
    Forgot,
    /// Recalled with great difficulty
    Struggled,
    /// Recalled with hesitation
    Hesitant,
    /// Recalled easily
    Easy,
    /// Recalled perfectly
    Perfect,
}

impl Rating {
    /// Build a rating from a raw numeric score, clamping to [0, 4].
    ///
    /// Out-of-range input is normalized, never rejected: the scheduler is
    /// total over all numeric scores.
    pub fn from_score(score: i64) -> Self {
        match score {
            i64::MIN..=0 => Rating::Forgot,
            1 => Rating::Struggled,
            2 => Rating::Hesitant,
            3 => Rating::Easy,
            _ => Rating::Perfect,
        }
    }

    /// Canonical 0–4 value of this rating.
    pub fn score(&self) -> u8 {
        *self as u8
    }

    /// Whether the recall counts as a success. Ratings below the midpoint
    /// of the scale reset the repetition streak.
    pub fn is_successful(&self) -> bool {
        self.score() >= 2
    }

    /// Mastery delta applied to the user-facing 0–100 progress score.
    ///
    /// This is a separate display signal. It never feeds back into the
    /// easiness or interval computation.
    pub fn mastery_delta(&self) -> i32 {
        match self {
            Rating::Forgot => -15,
            Rating::Struggled => -5,
            Rating::Hesitant => 5,
            Rating::Easy => 10,
            Rating::Perfect => 15,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Forgot => "forgot",
            Rating::Struggled => "struggled",
            Rating::Hesitant => "hesitant",
            Rating::Easy => "easy",
            Rating::Perfect => "perfect",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// MEMORY STATE
// ============================================================================

/// Scheduling state carried by a vocabulary word between reviews.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryState {
    /// User-facing progress score, 0–100
    pub mastery: i32,
    /// How easy the word is to retain; lower means reviewed more often
    pub easiness_factor: f64,
    /// Consecutive successful reviews since the last lapse
    pub repetitions: i32,
    /// Days until the next scheduled review
    pub interval_days: i32,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            mastery: 0,
            easiness_factor: INITIAL_EASINESS,
            repetitions: 0,
            interval_days: 0,
        }
    }
}

impl MemoryState {
    /// The implicit review "box" this state sits in.
    pub fn stage(&self) -> ReviewStage {
        ReviewStage::from_repetitions(self.repetitions)
    }
}

/// Position in the review progression, derived from the repetition streak.
///
/// Any stage drops back to `New` on a failed recall; successes move one
/// stage forward until intervals grow geometrically in `Long`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStage {
    /// New or relearning after a lapse
    New,
    /// One successful review; 1-day interval
    Short,
    /// Two successful reviews; 6-day interval
    Medium,
    /// Three or more; geometric interval growth
    Long,
}

impl ReviewStage {
    fn from_repetitions(repetitions: i32) -> Self {
        match repetitions {
            i32::MIN..=0 => ReviewStage::New,
            1 => ReviewStage::Short,
            2 => ReviewStage::Medium,
            _ => ReviewStage::Long,
        }
    }
}

// ============================================================================
// SCHEDULING
// ============================================================================

/// Result of scheduling one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// Updated scheduling state
    pub state: MemoryState,
    /// When the word should next be reviewed
    pub next_review: DateTime<Utc>,
}

/// Compute the next review schedule for a word.
///
/// Pure and deterministic: identical `(rating, state, now)` always produce
/// the identical outcome, and no input can make it fail. Out-of-range state
/// fields are normalized (easiness is floored at [`MIN_EASINESS`], mastery
/// is clamped to [0, 100]).
pub fn compute_next_review(
    rating: Rating,
    state: &MemoryState,
    now: DateTime<Utc>,
) -> ReviewOutcome {
    let gap = f64::from(4 - rating.score());
    let easiness =
        (state.easiness_factor + (0.1 - gap * (0.08 + gap * 0.02))).max(MIN_EASINESS);

    let (repetitions, interval_days) = if !rating.is_successful() {
        // Lapses never decay gradually: straight back to a 1-day interval.
        (0, FIRST_INTERVAL_DAYS)
    } else {
        let repetitions = state.repetitions.max(0) + 1;
        let interval_days = match repetitions {
            1 => FIRST_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            // A success is never rescheduled for today, even from a
            // zero-interval state.
            _ => ((f64::from(state.interval_days) * easiness).round() as i32).max(1),
        };
        (repetitions, interval_days)
    };

    let mastery = (state.mastery + rating.mastery_delta()).clamp(0, 100);

    ReviewOutcome {
        state: MemoryState {
            mastery,
            easiness_factor: easiness,
            repetitions,
            interval_days,
        },
        next_review: now + Duration::days(i64::from(interval_days)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
