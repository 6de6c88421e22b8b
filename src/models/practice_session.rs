//! Practice session over a shuffled snapshot of one deck.
//!
//! Each card goes through `Front -> Revealed -> (rated)`; after the last card the
//! session is `Complete`. In typing mode the card is revealed by submitting an answer,
//! in standard mode by an explicit reveal.

use super::{Flashcard, Rating, ReviewData, Store, scheduler};
use crate::error::{FlashcardError, Result, ValidationError};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    /// Reveal the back, then rate.
    #[default]
    Standard,
    /// Type the answer, get it graded, then rate.
    Typing,
}

impl PracticeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeMode::Standard => "standard",
            PracticeMode::Typing => "typing",
        }
    }
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PracticeMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(PracticeMode::Standard),
            "typing" => Ok(PracticeMode::Typing),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Front,
    Revealed,
    Complete,
}

/// Grading of a typed answer. `answer` is the card's back text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedAnswer {
    pub correct: bool,
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RateOutcome {
    pub card_id: String,
    pub review: ReviewData,
    /// False when the card was deleted from the store after the session started.
    pub persisted: bool,
    /// True only for the rating that finished the session.
    pub completed: bool,
}

pub struct PracticeSession {
    pub deck_id: String,
    pub deck_name: String,
    mode: PracticeMode,
    cards: Vec<Flashcard>,
    current_index: usize,
    phase: Phase,
    last_answer: Option<TypedAnswer>,
}

impl PracticeSession {
    /// Starts a session on a shuffled copy of the deck's cards.
    pub fn start<R: Rng + ?Sized>(
        store: &Store,
        deck_id: &str,
        mode: PracticeMode,
        rng: &mut R,
    ) -> Result<Self> {
        let deck = store.deck(deck_id)?;
        if deck.cards.is_empty() {
            return Err(ValidationError::EmptyDeck.into());
        }

        let mut cards = deck.cards.clone();
        cards.shuffle(rng);
        info!(deck_id, %mode, cards = cards.len(), "practice session started");

        Ok(Self {
            deck_id: deck.id.clone(),
            deck_name: deck.name.clone(),
            mode,
            cards,
            current_index: 0,
            phase: Phase::Front,
            last_answer: None,
        })
    }

    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// The card being practiced, or `None` once the session is complete.
    pub fn current_card(&self) -> Option<&Flashcard> {
        match self.phase {
            Phase::Complete => None,
            Phase::Front | Phase::Revealed => self.cards.get(self.current_index),
        }
    }

    /// Ids of the session's cards in practice order.
    pub fn card_ids(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|card| card.id.as_str())
    }

    /// `(position, total)` with a 1-based position; equals `total` once complete.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.cards.len();
        let position = match self.phase {
            Phase::Complete => total,
            Phase::Front | Phase::Revealed => self.current_index + 1,
        };
        (position, total)
    }

    /// The graded typed answer for the current card, while it is revealed.
    pub fn last_answer(&self) -> Option<&TypedAnswer> {
        self.last_answer.as_ref()
    }

    pub fn reveal(&mut self) -> Result<()> {
        self.require_mode(PracticeMode::Standard, "reveal")?;
        self.require_phase(Phase::Front, "reveal")?;
        self.phase = Phase::Revealed;
        Ok(())
    }

    /// Grades a typed answer: correct when the trimmed answer appears in the back text, ignoring case.
    pub fn submit_typed(&mut self, answer: &str) -> Result<&TypedAnswer> {
        self.require_mode(PracticeMode::Typing, "submit answer")?;
        self.require_phase(Phase::Front, "submit answer")?;

        let back_text = &self.cards[self.current_index].back_text;
        let typed = answer.trim().to_lowercase();
        let correct = back_text.to_lowercase().contains(&typed);

        self.phase = Phase::Revealed;
        Ok(self.last_answer.insert(TypedAnswer {
            correct,
            answer: back_text.clone(),
        }))
    }

    /// Schedules the current card, writes the result into `store` and moves on.
    pub fn rate(
        &mut self,
        store: &mut Store,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<RateOutcome> {
        self.require_phase(Phase::Revealed, "rate")?;

        let snapshot = &mut self.cards[self.current_index];
        let card_id = snapshot.id.clone();
        let (review, persisted) = match store.card_mut(&card_id) {
            Ok(card) => {
                card.review = scheduler::calculate_next_review(&card.review, rating, now);
                (card.review.clone(), true)
            }
            Err(FlashcardError::CardNotFound(_)) => {
                warn!(card_id = %card_id, "rated card no longer exists, skipping write-back");
                (
                    scheduler::calculate_next_review(&snapshot.review, rating, now),
                    false,
                )
            }
            Err(e) => return Err(e),
        };
        snapshot.review = review.clone();

        self.current_index += 1;
        self.last_answer = None;
        let completed = self.current_index >= self.cards.len();
        if completed {
            self.phase = Phase::Complete;
            info!(deck_id = %self.deck_id, cards = self.cards.len(), "practice session complete");
        } else {
            self.phase = Phase::Front;
        }

        Ok(RateOutcome {
            card_id,
            review,
            persisted,
            completed,
        })
    }

    fn require_mode(&self, mode: PracticeMode, operation: &'static str) -> Result<()> {
        if self.mode != mode {
            return Err(ValidationError::WrongMode {
                operation,
                mode: self.mode.as_str(),
            }
            .into());
        }
        Ok(())
    }

    fn require_phase(&self, phase: Phase, operation: &'static str) -> Result<()> {
        match self.phase {
            Phase::Complete => Err(ValidationError::SessionComplete.into()),
            current if current != phase => Err(ValidationError::WrongPhase { operation }.into()),
            _ => Ok(()),
        }
    }
}
