pub mod deck;
pub mod flashcard;
pub mod practice_session;
pub mod rating;
pub mod review_data;
pub mod scheduler;
pub mod store;

pub use deck::{DEFAULT_DECK_ID, DEFAULT_DECK_NAME, Deck};
pub use flashcard::{CardDraft, Flashcard, parse_tags};
pub use practice_session::{Phase, PracticeMode, PracticeSession, RateOutcome, TypedAnswer};
pub use rating::Rating;
pub use review_data::ReviewData;
pub use store::{Store, StoreStats};
