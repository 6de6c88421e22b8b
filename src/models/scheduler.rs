//! Simplified spaced repetition scheduler.
//!
//! Each card has an interval (days) and an ease factor:
//! - Again: interval resets to 1 day, ease drops by 0.3
//! - Hard: interval halves (never below 1 day), ease drops by 0.15
//! - Good: interval is multiplied by ease
//! - Easy: interval is multiplied by ease and a 1.3 bonus, ease grows by 0.1
//! - Ease never falls below 1.3 and has no ceiling
//! - The next review is `now + interval` days, fractional days included

use super::{Rating, ReviewData};
use chrono::{DateTime, Duration, Utc};

pub const MIN_EASE: f64 = 1.3;
const MIN_INTERVAL: f64 = 1.0;
const EASY_BONUS: f64 = 1.3;
const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Calculates the review data that follows `rating`.
pub fn calculate_next_review(
    review_data: &ReviewData,
    rating: Rating,
    now: DateTime<Utc>,
) -> ReviewData {
    let interval = review_data.interval;
    let ease = review_data.ease;

    let (new_interval, new_ease) = match rating {
        Rating::Again => (MIN_INTERVAL, (ease - 0.3).max(MIN_EASE)),
        Rating::Hard => ((interval * 0.5).max(MIN_INTERVAL), (ease - 0.15).max(MIN_EASE)),
        Rating::Good => (interval * ease, ease),
        Rating::Easy => (interval * ease * EASY_BONUS, ease + 0.1),
    };

    ReviewData {
        interval: new_interval,
        ease: new_ease,
        reviews: review_data.reviews.saturating_add(1),
        next_review: due_after(now, new_interval),
    }
}

/// `now + days`, at millisecond precision. Saturates at the latest representable instant.
pub fn due_after(now: DateTime<Utc>, days: f64) -> DateTime<Utc> {
    // float to int casts saturate, so absurd intervals end up in the None branch below
    let millis = (days * MILLIS_PER_DAY).round() as i64;
    Duration::try_milliseconds(millis)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
