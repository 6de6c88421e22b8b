pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod library;
pub mod logging;
pub mod media;
pub mod models;

pub use error::{FlashcardError, Result, ValidationError};
pub use library::Library;
pub use models::{CardDraft, Deck, Flashcard, PracticeMode, PracticeSession, Rating, Store};
