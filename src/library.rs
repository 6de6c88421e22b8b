//! Owns the store and its collaborators. Every mutation is applied in memory and
//! then saved right away.
//!
//! Validation failures return before anything changes. When the save itself fails the
//! in-memory change is kept and the error is returned; the next successful save
//! persists it.

use crate::clock::Clock;
use crate::database::db::Storage;
use crate::error::{FlashcardError, Result};
use crate::export::json;
use crate::media::image::{ImageEncoder, encode_or_empty};
use crate::models::{
    CardDraft, Deck, Flashcard, PracticeMode, PracticeSession, RateOutcome, Rating, Store,
    StoreStats,
};
use rand::Rng;
use std::path::Path;
use tracing::{info, warn};

/// Raw image file picked for one side of a new card.
pub struct ImageFile<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

/// A newly created card plus the image problems that did not stop its creation.
#[derive(Debug)]
pub struct CreatedCard {
    pub card_id: String,
    pub image_errors: Vec<FlashcardError>,
}

pub struct Library<S: Storage, C: Clock> {
    store: Store,
    storage: S,
    clock: C,
}

impl<S: Storage, C: Clock> Library<S, C> {
    /// Loads the store from `storage`.
    pub fn open(storage: S, clock: C) -> Result<Self> {
        let store = storage.load()?;
        Ok(Self {
            store,
            storage,
            clock,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats(self.clock.now())
    }

    pub fn search(&self, deck_id: &str, query: &str) -> Result<Vec<&Flashcard>> {
        self.store.search(deck_id, query)
    }

    pub fn create_deck(&mut self, name: &str) -> Result<String> {
        let id = self.store.create_deck(name)?.id.clone();
        self.persist()?;
        Ok(id)
    }

    pub fn delete_deck(&mut self, deck_id: &str) -> Result<Deck> {
        let deck = self.store.delete_deck(deck_id)?;
        self.persist()?;
        Ok(deck)
    }

    /// Adds a card, encoding any attached images first. Image failures leave that
    /// side's image empty and are reported in the result.
    pub fn add_card<E: ImageEncoder + ?Sized>(
        &mut self,
        deck_id: &str,
        mut draft: CardDraft,
        front_image: Option<ImageFile<'_>>,
        back_image: Option<ImageFile<'_>>,
        encoder: &E,
    ) -> Result<CreatedCard> {
        let mut image_errors = Vec::new();
        for (file, slot) in [
            (front_image, &mut draft.front_image),
            (back_image, &mut draft.back_image),
        ] {
            let (encoded, error) = encode_or_empty(encoder, file.map(|f| (f.file_name, f.bytes)));
            *slot = encoded;
            image_errors.extend(error);
        }

        let now = self.clock.now();
        let card_id = self.store.add_card(deck_id, draft, now)?.id.clone();
        self.persist()?;
        Ok(CreatedCard {
            card_id,
            image_errors,
        })
    }

    pub fn delete_card(&mut self, card_id: &str) -> Result<Flashcard> {
        let card = self.store.delete_card(card_id)?;
        self.persist()?;
        Ok(card)
    }

    pub fn start_practice<R: Rng + ?Sized>(
        &self,
        deck_id: &str,
        mode: PracticeMode,
        rng: &mut R,
    ) -> Result<PracticeSession> {
        PracticeSession::start(&self.store, deck_id, mode, rng)
    }

    pub fn rate(&mut self, session: &mut PracticeSession, rating: Rating) -> Result<RateOutcome> {
        let outcome = session.rate(&mut self.store, rating, self.clock.now())?;
        if outcome.persisted {
            self.persist()?;
        }
        Ok(outcome)
    }

    /// Replaces the whole store with a parsed import. The current store is kept on error.
    pub fn import_str(&mut self, text: &str) -> Result<()> {
        let imported = json::parse_import(text)?;
        self.replace(imported)
    }

    pub fn import_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let imported = json::import_json(path)?;
        self.replace(imported)
    }

    pub fn export_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        json::export_json_to_path(&self.store, path)
    }

    pub fn export_file_name(&self) -> String {
        json::default_export_file_name(self.clock.now())
    }

    fn replace(&mut self, store: Store) -> Result<()> {
        info!(decks = store.decks.len(), "replacing store with imported data");
        self.store = store;
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.storage.save(&self.store).inspect_err(|e| {
            warn!(error = %e, "failed to save store");
        })
    }
}
