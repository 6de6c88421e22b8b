//! Container for all decks. Card ids are unique across the whole store.
use super::scheduler::MIN_EASE;
use super::{CardDraft, Deck, Flashcard};
use crate::error::{FlashcardError, Result, ValidationError};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

const ID_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub decks: Vec<Deck>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            decks: vec![Deck::default()],
        }
    }
}

/// Counters shown on the home screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub total_decks: usize,
    pub total_cards: usize,
    pub cards_due: usize,
}

impl Store {
    pub fn deck(&self, deck_id: &str) -> Result<&Deck> {
        self.decks
            .iter()
            .find(|deck| deck.id == deck_id)
            .ok_or_else(|| FlashcardError::DeckNotFound(deck_id.to_string()))
    }

    fn deck_mut(&mut self, deck_id: &str) -> Result<&mut Deck> {
        self.decks
            .iter_mut()
            .find(|deck| deck.id == deck_id)
            .ok_or_else(|| FlashcardError::DeckNotFound(deck_id.to_string()))
    }

    pub fn card(&self, card_id: &str) -> Result<&Flashcard> {
        self.decks
            .iter()
            .find_map(|deck| deck.card(card_id))
            .ok_or_else(|| FlashcardError::CardNotFound(card_id.to_string()))
    }

    pub(crate) fn card_mut(&mut self, card_id: &str) -> Result<&mut Flashcard> {
        self.decks
            .iter_mut()
            .flat_map(|deck| deck.cards.iter_mut())
            .find(|card| card.id == card_id)
            .ok_or_else(|| FlashcardError::CardNotFound(card_id.to_string()))
    }

    /// Creates a deck with a trimmed, non-empty name.
    pub fn create_deck(&mut self, name: &str) -> Result<&Deck> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyDeckName.into());
        }

        let id = self.fresh_id();
        info!(deck_id = %id, deck_name = name, "deck created");
        self.decks.push(Deck {
            id,
            name: name.to_string(),
            cards: Vec::new(),
        });
        Ok(&self.decks[self.decks.len() - 1])
    }

    /// Removes a deck together with all of its cards.
    pub fn delete_deck(&mut self, deck_id: &str) -> Result<Deck> {
        let position = self
            .decks
            .iter()
            .position(|deck| deck.id == deck_id)
            .ok_or_else(|| FlashcardError::DeckNotFound(deck_id.to_string()))?;

        let deck = self.decks.remove(position);
        info!(deck_id, cards = deck.cards.len(), "deck deleted");
        Ok(deck)
    }

    /// Validates the draft and appends it to the deck as a new, immediately due card.
    pub fn add_card(
        &mut self,
        deck_id: &str,
        draft: CardDraft,
        now: DateTime<Utc>,
    ) -> Result<&Flashcard> {
        let draft = draft.validated()?;
        // Looked up before generating the id so an unknown deck changes nothing
        self.deck(deck_id)?;

        let id = self.fresh_id();
        let deck = self.deck_mut(deck_id)?;
        deck.cards.push(draft.into_card(id, now));
        let card = &deck.cards[deck.cards.len() - 1];
        info!(deck_id, card_id = %card.id, "card created");
        Ok(card)
    }

    pub fn delete_card(&mut self, card_id: &str) -> Result<Flashcard> {
        for deck in &mut self.decks {
            if let Some(position) = deck.cards.iter().position(|card| card.id == card_id) {
                let card = deck.cards.remove(position);
                info!(deck_id = %deck.id, card_id, "card deleted");
                return Ok(card);
            }
        }
        Err(FlashcardError::CardNotFound(card_id.to_string()))
    }

    /// Cards of a deck whose front, back or tags contain `query`, ignoring case.
    pub fn search(&self, deck_id: &str, query: &str) -> Result<Vec<&Flashcard>> {
        let query = query.trim().to_lowercase();
        Ok(self
            .deck(deck_id)?
            .cards
            .iter()
            .filter(|card| card.matches(&query))
            .collect())
    }

    pub fn due_cards(&self, deck_id: &str, now: DateTime<Utc>) -> Result<Vec<&Flashcard>> {
        Ok(self
            .deck(deck_id)?
            .cards
            .iter()
            .filter(|card| card.is_due(now))
            .collect())
    }

    pub fn stats(&self, now: DateTime<Utc>) -> StoreStats {
        StoreStats {
            total_decks: self.decks.len(),
            total_cards: self.decks.iter().map(|deck| deck.cards.len()).sum(),
            cards_due: self.decks.iter().map(|deck| deck.due_count(now)).sum(),
        }
    }

    /// Finds the first duplicated deck id or card id, if any.
    pub fn duplicate_id(&self) -> Option<String> {
        let mut deck_ids = HashSet::new();
        let mut card_ids = HashSet::new();
        for deck in &self.decks {
            if !deck_ids.insert(deck.id.as_str()) {
                return Some(deck.id.clone());
            }
            for card in &deck.cards {
                if !card_ids.insert(card.id.as_str()) {
                    return Some(card.id.clone());
                }
            }
        }
        None
    }

    /// Checks the rules every stored card must satisfy: unique ids, non-blank front and back,
    /// a positive interval and an ease of at least `MIN_EASE`. Returns the first problem found.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(id) = self.duplicate_id() {
            return Err(format!("duplicate id '{id}'"));
        }
        for card in self.decks.iter().flat_map(|deck| deck.cards.iter()) {
            let id = &card.id;
            if card.front_text.trim().is_empty() {
                return Err(format!("card '{id}' has empty front text"));
            }
            if card.back_text.trim().is_empty() {
                return Err(format!("card '{id}' has empty back text"));
            }
            if !(card.review.interval.is_finite() && card.review.interval > 0.0) {
                return Err(format!(
                    "card '{id}' has invalid interval {}",
                    card.review.interval
                ));
            }
            if !(card.review.ease.is_finite() && card.review.ease >= MIN_EASE) {
                return Err(format!(
                    "card '{id}' has ease {} below {MIN_EASE}",
                    card.review.ease
                ));
            }
        }
        Ok(())
    }

    fn contains_id(&self, id: &str) -> bool {
        self.decks
            .iter()
            .any(|deck| deck.id == id || deck.card(id).is_some())
    }

    /// Random `id-xxxxxxxxx` not used by any deck or card.
    fn fresh_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let suffix: String = (0..ID_LEN)
                .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
                .collect();
            let id = format!("id-{suffix}");
            if !self.contains_id(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_DECK_ID;
    use chrono::Duration;

    #[test]
    fn test_default_store_has_one_deck() {
        let store = Store::default();

        assert_eq!(store.decks.len(), 1);
        assert_eq!(store.decks[0].id, "default");
        assert_eq!(store.decks[0].name, "Default Deck");
    }

    #[test]
    fn test_create_deck_trims_name() {
        let mut store = Store::default();
        let deck = store.create_deck("  Geo  ").unwrap();

        assert_eq!(deck.name, "Geo");
        assert!(deck.id.starts_with("id-"));
        assert_eq!(deck.id.len(), 3 + ID_LEN);
        assert_eq!(store.decks.len(), 2);
    }

    #[test]
    fn test_create_deck_rejects_empty_name() {
        let mut store = Store::default();
        let err = store.create_deck("   ").unwrap_err();

        assert!(matches!(
            err,
            FlashcardError::Validation(ValidationError::EmptyDeckName)
        ));
        assert_eq!(store.decks.len(), 1);
    }

    #[test]
    fn test_add_card_initial_state() {
        let mut store = Store::default();
        let now = Utc::now();
        let card = store
            .add_card(DEFAULT_DECK_ID, CardDraft::new("hello", "cześć"), now)
            .unwrap();

        assert_eq!(card.review.interval, 1.0);
        assert_eq!(card.review.ease, 2.5);
        assert_eq!(card.review.reviews, 0);
        assert_eq!(card.review.next_review, now);
        assert!(card.front_image.is_empty());
    }

    #[test]
    fn test_add_card_validation_leaves_store_untouched() {
        let mut store = Store::default();
        let before = store.clone();

        assert!(store
            .add_card(DEFAULT_DECK_ID, CardDraft::new("", "back"), Utc::now())
            .is_err());
        assert!(matches!(
            store.add_card("missing", CardDraft::new("front", "back"), Utc::now()),
            Err(FlashcardError::DeckNotFound(_))
        ));
        assert_eq!(store, before);
    }

    #[test]
    fn test_card_ids_unique_across_decks() {
        let mut store = Store::default();
        let other = store.create_deck("Other").unwrap().id.clone();
        let now = Utc::now();
        for i in 0..50 {
            let deck_id = if i % 2 == 0 { DEFAULT_DECK_ID } else { other.as_str() };
            store
                .add_card(deck_id, CardDraft::new(&format!("q{i}"), "a"), now)
                .unwrap();
        }

        assert_eq!(store.duplicate_id(), None);
        assert_eq!(store.stats(now).total_cards, 50);
    }

    #[test]
    fn test_delete_deck_removes_cards() {
        let mut store = Store::default();
        let deck_id = store.create_deck("Geo").unwrap().id.clone();
        let card_id = store
            .add_card(&deck_id, CardDraft::new("q", "a"), Utc::now())
            .unwrap()
            .id
            .clone();

        let removed = store.delete_deck(&deck_id).unwrap();

        assert_eq!(removed.cards.len(), 1);
        assert!(matches!(
            store.card(&card_id),
            Err(FlashcardError::CardNotFound(_))
        ));
        assert!(store.delete_deck(&deck_id).is_err());
    }

    #[test]
    fn test_delete_card() {
        let mut store = Store::default();
        let card_id = store
            .add_card(DEFAULT_DECK_ID, CardDraft::new("q", "a"), Utc::now())
            .unwrap()
            .id
            .clone();

        assert_eq!(store.delete_card(&card_id).unwrap().front_text, "q");
        assert!(store.deck(DEFAULT_DECK_ID).unwrap().cards.is_empty());
        assert!(matches!(
            store.delete_card(&card_id),
            Err(FlashcardError::CardNotFound(_))
        ));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut store = Store::default();
        let now = Utc::now();
        store
            .add_card(
                DEFAULT_DECK_ID,
                CardDraft::new("Capital of France?", "Paris").with_tags("geo"),
                now,
            )
            .unwrap();
        store
            .add_card(DEFAULT_DECK_ID, CardDraft::new("2 + 2", "4").with_tags("math"), now)
            .unwrap();

        assert_eq!(store.search(DEFAULT_DECK_ID, "PARIS").unwrap().len(), 1);
        assert_eq!(store.search(DEFAULT_DECK_ID, "Math").unwrap().len(), 1);
        assert_eq!(store.search(DEFAULT_DECK_ID, "").unwrap().len(), 2);
        assert!(store.search("missing", "").is_err());
    }

    #[test]
    fn test_stats_count_due_cards() {
        let mut store = Store::default();
        let now = Utc::now();
        store
            .add_card(DEFAULT_DECK_ID, CardDraft::new("due", "a"), now)
            .unwrap();
        let later_id = store
            .add_card(DEFAULT_DECK_ID, CardDraft::new("later", "a"), now)
            .unwrap()
            .id
            .clone();
        store.card_mut(&later_id).unwrap().review.next_review = now + Duration::days(3);

        let stats = store.stats(now);
        assert_eq!(stats.total_decks, 1);
        assert_eq!(stats.total_cards, 2);
        assert_eq!(stats.cards_due, 1);
        assert_eq!(store.due_cards(DEFAULT_DECK_ID, now).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_id_detection() {
        let mut store = Store::default();
        store.decks.push(Deck::default());

        assert_eq!(store.duplicate_id(), Some("default".to_string()));
    }

    #[test]
    fn test_validate_rejects_broken_cards() {
        let now = Utc::now();
        let mut store = Store::default();
        let id = store
            .add_card(DEFAULT_DECK_ID, CardDraft::new("Q", "A"), now)
            .unwrap()
            .id
            .clone();
        assert_eq!(store.validate(), Ok(()));

        let mut blank_back = store.clone();
        blank_back.card_mut(&id).unwrap().back_text = "   ".to_string();
        assert!(blank_back.validate().unwrap_err().contains("back text"));

        let mut negative_interval = store.clone();
        negative_interval.card_mut(&id).unwrap().review.interval = -4.0;
        assert!(negative_interval.validate().unwrap_err().contains("interval"));

        let mut low_ease = store.clone();
        low_ease.card_mut(&id).unwrap().review.ease = 0.5;
        assert!(low_ease.validate().unwrap_err().contains("ease"));

        let mut floor_ease = store.clone();
        floor_ease.card_mut(&id).unwrap().review.ease = MIN_EASE;
        assert_eq!(floor_ease.validate(), Ok(()));
    }
}
