//! Deck is an ordered set of flashcards
use super::Flashcard;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DECK_ID: &str = "default";
pub const DEFAULT_DECK_NAME: &str = "Default Deck";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Flashcard>,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            id: DEFAULT_DECK_ID.to_string(),
            name: DEFAULT_DECK_NAME.to_string(),
            cards: Vec::new(),
        }
    }
}

impl Deck {
    pub fn card(&self, card_id: &str) -> Option<&Flashcard> {
        self.cards.iter().find(|card| card.id == card_id)
    }

    pub fn due_count(&self, now: DateTime<Utc>) -> usize {
        self.cards.iter().filter(|card| card.is_due(now)).count()
    }
}
