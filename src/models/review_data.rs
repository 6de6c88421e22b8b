//! Scheduling fields carried by every card.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const INITIAL_INTERVAL: f64 = 1.0;
pub const INITIAL_EASE: f64 = 2.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewData {
    /// Days until the next review. Fractional values are kept as is.
    #[serde(default = "default_interval")]
    pub interval: f64,
    #[serde(default = "default_ease")]
    pub ease: f64,
    #[serde(default)]
    pub reviews: u32,
    /// Missing in hand-written imports means "due now".
    #[serde(default = "Utc::now")]
    pub next_review: DateTime<Utc>,
}

fn default_interval() -> f64 {
    INITIAL_INTERVAL
}

fn default_ease() -> f64 {
    INITIAL_EASE
}

impl ReviewData {
    /// State of a card that has never been rated; due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            interval: INITIAL_INTERVAL,
            ease: INITIAL_EASE,
            reviews: 0,
            next_review: now,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_card_is_due_now() {
        let now = Utc::now();
        let review = ReviewData::new(now);

        assert_eq!(review.interval, 1.0);
        assert_eq!(review.ease, 2.5);
        assert_eq!(review.reviews, 0);
        assert!(review.is_due(now));
        assert!(!review.is_due(now - Duration::seconds(1)));
    }
}
