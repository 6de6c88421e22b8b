mod app;

use app::MyApp;
use flashcards_app::clock::SystemClock;
use flashcards_app::config::Config;
use flashcards_app::database::db::SqliteStorage;
use flashcards_app::library::Library;
use flashcards_app::logging;
use flashcards_app::media::image::DataUrlEncoder;
use tracing::info;

fn main() -> eframe::Result<()> {
    let config = Config::from_env();
    logging::init_tracing(&config.log_level);

    if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).expect("Failed to create data directory");
    }
    let storage = SqliteStorage::open(&config.db_path).expect("Failed to initialize database");
    let library = Library::open(storage, SystemClock).expect("Failed to load flashcards");

    let stats = library.stats();
    info!(
        decks = stats.total_decks,
        cards = stats.total_cards,
        due = stats.cards_due,
        "flashcards loaded"
    );
    for deck in &library.store().decks {
        info!("  - {} ({} cards)", deck.name, deck.cards.len());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(config.window_size),
        ..Default::default()
    };
    let encoder = DataUrlEncoder::new(config.max_image_bytes);
    eframe::run_native(
        "Flashcards App",
        options,
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(MyApp::new(library, encoder)))
        }),
    )
}
