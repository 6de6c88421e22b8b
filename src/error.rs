//! Error types shared by the store, the practice session and the collaborators.
//!
//! The `Display` text of every variant is what the UI shows in its result dialog.

use thiserror::Error;

/// Rejected input or an operation called in the wrong session state.
/// Nothing is mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Deck name cannot be empty.")]
    EmptyDeckName,

    #[error("Front text is required.")]
    EmptyFrontText,

    #[error("Back text is required.")]
    EmptyBackText,

    #[error("Unknown rating '{0}'. Expected again, hard, good or easy.")]
    UnknownRating(String),

    #[error("Unknown practice mode '{0}'. Expected standard or typing.")]
    UnknownMode(String),

    #[error("No cards in this deck.")]
    EmptyDeck,

    #[error("'{operation}' is not available in {mode} mode.")]
    WrongMode {
        operation: &'static str,
        mode: &'static str,
    },

    #[error("'{operation}' is not allowed at this point of the session.")]
    WrongPhase { operation: &'static str },

    #[error("Practice session is already complete.")]
    SessionComplete,
}

#[derive(Error, Debug)]
pub enum FlashcardError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Deck not found: {0}")]
    DeckNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid file format: {0}")]
    ImportFormat(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(String),
}

pub type Result<T> = std::result::Result<T, FlashcardError>;
