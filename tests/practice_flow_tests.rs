//! End-to-end practice flows through the library: deck and card creation, practice,
//! rating write-back and persistence.

use chrono::{Duration, TimeZone, Utc};
use flashcards_app::clock::{Clock, FixedClock};
use flashcards_app::database::db::{MemoryStorage, SqliteStorage, Storage};
use flashcards_app::error::{FlashcardError, ValidationError};
use flashcards_app::library::Library;
use flashcards_app::media::image::DataUrlEncoder;
use flashcards_app::models::{CardDraft, PracticeMode, Rating};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn geo_library() -> (Library<MemoryStorage, FixedClock>, String) {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 9, 2, 10, 0, 0).unwrap());
    let mut library = Library::open(MemoryStorage::new(), clock).unwrap();
    let deck_id = library.create_deck("Geo").unwrap();
    library
        .add_card(
            &deck_id,
            CardDraft::new("Capital of France?", "Paris"),
            None,
            None,
            &DataUrlEncoder::default(),
        )
        .unwrap();
    (library, deck_id)
}

#[test]
fn rating_good_grows_interval_by_ease() {
    let (mut library, deck_id) = geo_library();
    let now = library.clock().now();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let mut session = library
        .start_practice(&deck_id, PracticeMode::Standard, &mut rng)
        .unwrap();
    session.reveal().unwrap();
    let outcome = library.rate(&mut session, Rating::Good).unwrap();

    assert!(outcome.completed);
    let card = library.store().card(&outcome.card_id).unwrap();
    assert_eq!(card.review.interval, 2.5);
    assert_eq!(card.review.ease, 2.5);
    assert_eq!(card.review.reviews, 1);
    assert_eq!(card.review.next_review, now + Duration::hours(60));

    let saved = library.storage().saved().unwrap().unwrap();
    assert_eq!(saved.card(&outcome.card_id).unwrap(), card);
}

#[test]
fn rating_again_resets_and_lowers_ease() {
    let (mut library, deck_id) = geo_library();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let mut session = library
        .start_practice(&deck_id, PracticeMode::Standard, &mut rng)
        .unwrap();
    session.reveal().unwrap();
    let outcome = library.rate(&mut session, Rating::Again).unwrap();

    let card = library.store().card(&outcome.card_id).unwrap();
    assert_eq!(card.review.interval, 1.0);
    assert!((card.review.ease - 2.2).abs() < 1e-9);
    assert_eq!(card.review.reviews, 1);
}

#[test]
fn rated_card_is_no_longer_due_until_interval_passes() {
    let (mut library, deck_id) = geo_library();
    assert_eq!(library.stats().cards_due, 1);

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut session = library
        .start_practice(&deck_id, PracticeMode::Typing, &mut rng)
        .unwrap();
    assert!(session.submit_typed("paris").unwrap().correct);
    library.rate(&mut session, Rating::Good).unwrap();

    assert_eq!(library.stats().cards_due, 0);
    library.clock().advance(Duration::hours(60));
    assert_eq!(library.stats().cards_due, 1);
}

#[test]
fn empty_deck_does_not_start() {
    let clock = FixedClock::new(Utc::now());
    let mut library = Library::open(MemoryStorage::new(), clock).unwrap();
    let deck_id = library.create_deck("Empty").unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let result = library.start_practice(&deck_id, PracticeMode::Standard, &mut rng);
    assert!(matches!(
        result,
        Err(FlashcardError::Validation(ValidationError::EmptyDeck))
    ));
}

#[test]
fn full_session_visits_every_card_once() {
    let (mut library, deck_id) = geo_library();
    for (front, back) in [
        ("Capital of Spain?", "Madrid"),
        ("Capital of Italy?", "Rome"),
        ("Capital of Poland?", "Warsaw"),
    ] {
        library
            .add_card(
                &deck_id,
                CardDraft::new(front, back),
                None,
                None,
                &DataUrlEncoder::default(),
            )
            .unwrap();
    }
    let saves_before = library.storage().save_count();

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut session = library
        .start_practice(&deck_id, PracticeMode::Standard, &mut rng)
        .unwrap();
    let mut rated = Vec::new();
    let mut completions = 0;
    while let Some(card) = session.current_card() {
        rated.push(card.id.clone());
        session.reveal().unwrap();
        if library.rate(&mut session, Rating::Easy).unwrap().completed {
            completions += 1;
        }
    }

    rated.sort();
    rated.dedup();
    assert_eq!(rated.len(), 4);
    assert_eq!(completions, 1);
    assert_eq!(library.storage().save_count(), saves_before + 4);
    for card in &library.store().deck(&deck_id).unwrap().cards {
        assert_eq!(card.review.reviews, 1);
    }
}

#[test]
fn import_of_object_without_decks_keeps_data() {
    let (mut library, _) = geo_library();
    let before = library.store().clone();

    let err = library.import_str("{}").unwrap_err();

    assert!(matches!(err, FlashcardError::ImportFormat(_)));
    assert_eq!(library.store(), &before);
}

#[test]
fn import_of_card_with_broken_review_state_is_rejected() {
    let (mut library, deck_id) = geo_library();
    let before = library.store().clone();
    let saves_before = library.storage().save_count();

    let err = library
        .import_str(
            r#"{"decks": [{"id": "d", "name": "D", "cards": [
                {"id": "c", "frontText": "", "backText": "   ", "interval": -4.0, "ease": 0.5}
            ]}]}"#,
        )
        .unwrap_err();

    assert!(matches!(err, FlashcardError::ImportFormat(_)));
    assert_eq!(library.store(), &before);
    assert_eq!(library.storage().save_count(), saves_before);

    // The existing deck still practices with a sane schedule.
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut session = library
        .start_practice(&deck_id, PracticeMode::Standard, &mut rng)
        .unwrap();
    session.reveal().unwrap();
    let outcome = library.rate(&mut session, Rating::Good).unwrap();
    let card = library.store().card(&outcome.card_id).unwrap();
    assert!(card.review.interval > 0.0);
    assert!(card.review.ease >= 1.3);
    assert!(card.review.next_review > library.clock().now());
}

#[test]
fn sqlite_library_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.sqlite3");
    let clock = FixedClock::new(Utc::now());

    let mut library = Library::open(SqliteStorage::open(&path).unwrap(), clock.clone()).unwrap();
    let deck_id = library.create_deck("Geo").unwrap();
    library
        .add_card(
            &deck_id,
            CardDraft::new("Capital of France?", "Paris").with_tags("europe"),
            None,
            None,
            &DataUrlEncoder::default(),
        )
        .unwrap();
    let expected = library.store().clone();
    drop(library);

    let storage = SqliteStorage::open(&path).unwrap();
    assert_eq!(storage.load().unwrap(), expected);
}
