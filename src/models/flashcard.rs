//! Flashcard is a front/back pair with optional tags and images, plus its review state.
use super::ReviewData;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub front_text: String,
    pub back_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Encoded image (data URL) or empty.
    #[serde(default)]
    pub front_image: String,
    #[serde(default)]
    pub back_image: String,
    #[serde(flatten)]
    pub review: ReviewData,
}

impl Flashcard {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.review.is_due(now)
    }

    /// Case-insensitive match on front, back or any tag. `query` must already be lowercase.
    pub fn matches(&self, query: &str) -> bool {
        self.front_text.to_lowercase().contains(query)
            || self.back_text.to_lowercase().contains(query)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(query))
    }
}

/// User input for a new card, before it gets an id and review state.
#[derive(Clone, Debug, Default)]
pub struct CardDraft {
    pub front_text: String,
    pub back_text: String,
    pub tags: Vec<String>,
    pub front_image: String,
    pub back_image: String,
}

impl CardDraft {
    pub fn new(front_text: &str, back_text: &str) -> Self {
        Self {
            front_text: front_text.to_string(),
            back_text: back_text.to_string(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: &str) -> Self {
        self.tags = parse_tags(tags);
        self
    }

    /// Trims both sides and rejects empty text.
    pub(crate) fn validated(self) -> Result<Self, ValidationError> {
        let front_text = self.front_text.trim().to_string();
        let back_text = self.back_text.trim().to_string();
        if front_text.is_empty() {
            return Err(ValidationError::EmptyFrontText);
        }
        if back_text.is_empty() {
            return Err(ValidationError::EmptyBackText);
        }
        Ok(Self {
            front_text,
            back_text,
            ..self
        })
    }

    pub(crate) fn into_card(self, id: String, now: DateTime<Utc>) -> Flashcard {
        Flashcard {
            id,
            front_text: self.front_text,
            back_text: self.back_text,
            tags: self.tags,
            front_image: self.front_image,
            back_image: self.back_image,
            review: ReviewData::new(now),
        }
    }
}

/// Splits a comma separated tag list. Order and duplicates are kept.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
