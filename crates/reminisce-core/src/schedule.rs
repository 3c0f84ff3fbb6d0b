//! Mastery scoring and spaced-repetition scheduling.
//!
//! Pure arithmetic over one mastery record and one answer outcome; the
//! caller persists the returned record.

use chrono::{DateTime, Duration, Utc};

use crate::model::{MasteryKey, MasteryRecord};

/// Score gained on a correct answer.
const CORRECT_DELTA: f64 = 0.10;
/// Extra gain when the correct answer arrived quickly.
const FAST_BONUS: f64 = 0.05;
/// Score lost on an incorrect answer.
const INCORRECT_DELTA: f64 = 0.05;
/// Response times under this count as fast.
const FAST_RESPONSE_MS: u64 = 3000;

/// Review interval in days as a monotone step function of the
/// post-update mastery score.
pub fn interval_days(score: f64) -> i64 {
    if score >= 0.8 {
        14
    } else if score >= 0.6 {
        7
    } else if score >= 0.4 {
        4
    } else if score >= 0.2 {
        2
    } else {
        1
    }
}

/// Apply one answer outcome to a mastery record.
///
/// A missing record starts from the zero baseline. A correct answer bumps
/// the score by 0.10 (plus 0.05 when fast), an incorrect one drops it by
/// 0.05; the score stays clamped to [0, 1] and the opposite streak
/// counter resets, so the two streaks are never both positive.
pub fn update(
    existing: Option<&MasteryRecord>,
    key: MasteryKey,
    correct: bool,
    response_time_ms: u64,
    now: DateTime<Utc>,
) -> MasteryRecord {
    let base = existing.cloned().unwrap_or_else(|| MasteryRecord::baseline(key));

    let mut score = base.mastery_score;
    let mut streak_correct = base.consecutive_correct;
    let mut streak_incorrect = base.consecutive_incorrect;

    if correct {
        streak_correct += 1;
        streak_incorrect = 0;
        score = (score + CORRECT_DELTA).min(1.0);
        if response_time_ms < FAST_RESPONSE_MS {
            score = (score + FAST_BONUS).min(1.0);
        }
    } else {
        streak_incorrect += 1;
        streak_correct = 0;
        score = (score - INCORRECT_DELTA).max(0.0);
    }

    MasteryRecord {
        key,
        mastery_score: score,
        consecutive_correct: streak_correct,
        consecutive_incorrect: streak_incorrect,
        last_seen_at: Some(now),
        next_due_at: Some(now + Duration::days(interval_days(score))),
    }
}
