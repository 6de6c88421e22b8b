//! Main application UI.
//! Home statistics, card creation, practice sessions, card management and import/export.

use eframe::egui;
use egui::load::Bytes;
use flashcards_app::clock::SystemClock;
use flashcards_app::database::db::SqliteStorage;
use flashcards_app::library::{ImageFile, Library};
use flashcards_app::media::image::{DataUrlEncoder, decode_data_url};
use flashcards_app::models::{
    CardDraft, Deck, Flashcard, Phase, PracticeMode, PracticeSession, Rating, parse_tags,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

const CARD_IMAGE_SIZE: egui::Vec2 = egui::vec2(320.0, 200.0);
const THUMBNAIL_SIZE: egui::Vec2 = egui::vec2(96.0, 64.0);

/// Application screen states
#[derive(Default, Clone, Copy, PartialEq, Eq)]
enum AppScreen {
    #[default]
    Home,
    Create,
    Practice,
    Manage,
    Settings,
}

impl AppScreen {
    const ALL: [AppScreen; 5] = [
        AppScreen::Home,
        AppScreen::Create,
        AppScreen::Practice,
        AppScreen::Manage,
        AppScreen::Settings,
    ];

    fn title(&self) -> &'static str {
        match self {
            AppScreen::Home => "Home",
            AppScreen::Create => "Create",
            AppScreen::Practice => "Practice",
            AppScreen::Manage => "Manage",
            AppScreen::Settings => "Settings",
        }
    }
}

/// Image file picked in the create form, kept until the card is submitted.
struct PickedImage {
    file_name: String,
    /// Loader URI for the preview; unique per pick so a re-picked file is reloaded.
    uri: String,
    bytes: Bytes,
}

/// Side of a card an image belongs to.
#[derive(Clone, Copy)]
enum Side {
    Front,
    Back,
}

impl Side {
    fn name(self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }

    fn data_url(self, card: &Flashcard) -> &str {
        match self {
            Side::Front => &card.front_image,
            Side::Back => &card.back_image,
        }
    }
}

/// Decoded card images by `<card id>/<side>`, so each data URL is decoded once.
/// `None` marks an image that could not be decoded.
type ImageCache = HashMap<String, Option<(String, Bytes)>>;

enum PendingDelete {
    Card(String),
    Deck(String),
}

pub struct MyApp {
    library: Library<SqliteStorage, SystemClock>,
    encoder: DataUrlEncoder,
    current_screen: AppScreen,

    // create form
    create_deck_id: String,
    front_text: String,
    back_text: String,
    tags: String,
    front_image: Option<PickedImage>,
    back_image: Option<PickedImage>,
    new_deck_name: String,
    show_new_deck_dialog: bool,

    // practice
    practice_deck_id: String,
    practice_mode: PracticeMode,
    session: Option<PracticeSession>,
    typed_answer: String,

    // manage
    manage_deck_id: String,
    search: String,
    pending_delete: Option<PendingDelete>,

    image_cache: ImageCache,
    message: Option<String>,
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("navigation").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for screen in AppScreen::ALL {
                    if ui
                        .selectable_label(self.current_screen == screen, screen.title())
                        .clicked()
                    {
                        self.current_screen = screen;
                    }
                }
            });
        });

        match self.current_screen {
            AppScreen::Home => self.render_home_screen(ctx),
            AppScreen::Create => self.render_create_screen(ctx),
            AppScreen::Practice => self.render_practice_screen(ctx),
            AppScreen::Manage => self.render_manage_screen(ctx),
            AppScreen::Settings => self.render_settings_screen(ctx),
        }

        self.render_new_deck_dialog(ctx);
        self.render_delete_confirmation(ctx);

        if let Some(message) = &self.message {
            let mut close = false;
            egui::Window::new("Flashcards")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
            if close {
                self.message = None;
            }
        }
    }
}

impl MyApp {
    pub fn new(library: Library<SqliteStorage, SystemClock>, encoder: DataUrlEncoder) -> Self {
        let first_deck = library
            .store()
            .decks
            .first()
            .map(|deck| deck.id.clone())
            .unwrap_or_default();
        Self {
            library,
            encoder,
            current_screen: AppScreen::Home,
            create_deck_id: first_deck.clone(),
            front_text: String::new(),
            back_text: String::new(),
            tags: String::new(),
            front_image: None,
            back_image: None,
            new_deck_name: String::new(),
            show_new_deck_dialog: false,
            practice_deck_id: first_deck.clone(),
            practice_mode: PracticeMode::Standard,
            session: None,
            typed_answer: String::new(),
            manage_deck_id: first_deck,
            search: String::new(),
            pending_delete: None,
            image_cache: ImageCache::new(),
            message: None,
        }
    }

    fn render_home_screen(&mut self, ctx: &egui::Context) {
        let stats = self.library.stats();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Flashcards");
            ui.add_space(10.0);
            ui.label(format!("Decks: {}", stats.total_decks));
            ui.label(format!("Cards: {}", stats.total_cards));
            ui.label(format!("Cards due: {}", stats.cards_due));
        });
    }

    fn render_create_screen(&mut self, ctx: &egui::Context) {
        let mut action_submit = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Create Flashcard");

            ui.horizontal(|ui| {
                deck_combo(ui, "Deck", &self.library.store().decks, &mut self.create_deck_id);
                if ui.button("New Deck").clicked() {
                    self.show_new_deck_dialog = true;
                }
            });

            ui.label("Front:");
            ui.text_edit_multiline(&mut self.front_text);
            image_picker(ui, "Front image", &mut self.front_image, &mut self.message);

            ui.label("Back:");
            ui.text_edit_multiline(&mut self.back_text);
            image_picker(ui, "Back image", &mut self.back_image, &mut self.message);

            ui.horizontal(|ui| {
                ui.label("Tags (comma separated):");
                ui.text_edit_singleline(&mut self.tags);
            });

            ui.separator();
            ui.heading("Preview");
            ui.group(|ui| {
                ui.label(format!("Front: {}", self.front_text.trim()));
                picked_preview(ui, self.front_image.as_ref());
                ui.label(format!("Back: {}", self.back_text.trim()));
                picked_preview(ui, self.back_image.as_ref());
                let tags = parse_tags(&self.tags);
                if !tags.is_empty() {
                    ui.label(format!("Tags: {}", tags.join(", ")));
                }
            });

            ui.add_space(10.0);
            if ui.button("Create Flashcard").clicked() {
                action_submit = true;
            }
        });

        if action_submit {
            self.submit_card(ctx);
        }
    }

    fn submit_card(&mut self, ctx: &egui::Context) {
        let draft = CardDraft::new(&self.front_text, &self.back_text).with_tags(&self.tags);
        let front = self.front_image.as_ref().map(|image| ImageFile {
            file_name: &image.file_name,
            bytes: &image.bytes,
        });
        let back = self.back_image.as_ref().map(|image| ImageFile {
            file_name: &image.file_name,
            bytes: &image.bytes,
        });

        match self
            .library
            .add_card(&self.create_deck_id, draft, front, back, &self.encoder)
        {
            Ok(created) => {
                let mut message = "Flashcard created successfully!".to_string();
                for error in &created.image_errors {
                    message.push_str(&format!("\n{error}"));
                }
                self.message = Some(message);
                self.front_text.clear();
                self.back_text.clear();
                self.tags.clear();
                for picked in [self.front_image.take(), self.back_image.take()]
                    .into_iter()
                    .flatten()
                {
                    ctx.forget_image(&picked.uri);
                }
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn render_new_deck_dialog(&mut self, ctx: &egui::Context) {
        if !self.show_new_deck_dialog {
            return;
        }

        let mut action_create = false;
        let mut action_cancel = false;
        egui::Window::new("New Deck")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Deck name:");
                    ui.text_edit_singleline(&mut self.new_deck_name);
                });
                ui.horizontal(|ui| {
                    if ui.button("Create Deck").clicked() {
                        action_create = true;
                    }
                    if ui.button("Cancel").clicked() {
                        action_cancel = true;
                    }
                });
            });

        if action_create {
            match self.library.create_deck(&self.new_deck_name) {
                Ok(deck_id) => {
                    self.create_deck_id = deck_id;
                    self.new_deck_name.clear();
                    self.show_new_deck_dialog = false;
                }
                Err(e) => self.message = Some(e.to_string()),
            }
        }
        if action_cancel {
            self.new_deck_name.clear();
            self.show_new_deck_dialog = false;
        }
    }

    /// Renders the practice screen: deck and mode selection, then the running session
    fn render_practice_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.is_none() {
                ui.heading("Practice");
                deck_combo(ui, "Deck", &self.library.store().decks, &mut self.practice_deck_id);
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.practice_mode, PracticeMode::Standard, "Standard");
                    ui.radio_value(&mut self.practice_mode, PracticeMode::Typing, "Typing");
                });
                if ui.button("Start Practice").clicked() {
                    self.start_practice();
                }
                return;
            }

            // Store actions to execute after UI rendering
            let mut action_reveal = false;
            let mut action_submit = false;
            let mut action_rate: Option<Rating> = None;
            let mut action_back = false;

            if let Some(session) = &self.session {
                if let Some(card) = session.current_card() {
                    let (position, total) = session.progress();
                    ui.heading(format!("Practice: {}", session.deck_name));
                    ui.label(format!("{position}/{total}"));
                    ui.add_space(20.0);

                    let revealed = session.phase() == Phase::Revealed;
                    ui.group(|ui| {
                        ui.set_min_height(200.0);
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.label(&card.front_text);
                            card_image(
                                ui,
                                &mut self.image_cache,
                                card,
                                Side::Front,
                                CARD_IMAGE_SIZE,
                            );
                            ui.add_space(20.0);
                            if revealed {
                                ui.separator();
                                ui.label(&card.back_text);
                                card_image(
                                    ui,
                                    &mut self.image_cache,
                                    card,
                                    Side::Back,
                                    CARD_IMAGE_SIZE,
                                );
                            }
                        });
                    });

                    ui.add_space(20.0);

                    match (session.mode(), session.phase()) {
                        (PracticeMode::Standard, Phase::Front) => {
                            if ui.button("Show Answer").clicked() {
                                action_reveal = true;
                            }
                        }
                        (PracticeMode::Typing, Phase::Front) => {
                            ui.horizontal(|ui| {
                                ui.text_edit_singleline(&mut self.typed_answer);
                                if ui.button("Submit").clicked() {
                                    action_submit = true;
                                }
                            });
                        }
                        (_, Phase::Revealed) => {
                            if let Some(answer) = session.last_answer() {
                                if answer.correct {
                                    ui.label("Correct!");
                                } else {
                                    ui.label(format!("Incorrect. The answer is: {}", answer.answer));
                                }
                            }
                            ui.label("Rate your response:");
                            ui.horizontal(|ui| {
                                for rating in Rating::ALL {
                                    if ui.button(rating.label()).clicked() {
                                        action_rate = Some(rating);
                                    }
                                }
                            });
                        }
                        (_, Phase::Complete) => {}
                    }
                }
            }

            ui.add_space(20.0);
            if ui.button("End Practice").clicked() {
                action_back = true;
            }

            // Execute deferred actions
            if action_reveal {
                self.with_session(|session, _| session.reveal().map(|_| ()));
            }
            if action_submit {
                let typed = std::mem::take(&mut self.typed_answer);
                self.with_session(|session, _| session.submit_typed(&typed).map(|_| ()));
            }
            if let Some(rating) = action_rate {
                self.with_session(|session, library| library.rate(session, rating).map(|_| ()));
            }
            if action_back {
                self.session = None;
            }
        });
    }

    fn start_practice(&mut self) {
        let mut rng = rand::thread_rng();
        match self
            .library
            .start_practice(&self.practice_deck_id, self.practice_mode, &mut rng)
        {
            Ok(session) => {
                self.typed_answer.clear();
                self.session = Some(session);
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    /// Runs a session step, shows its error if any, and closes the session once complete.
    fn with_session<F>(&mut self, step: F)
    where
        F: FnOnce(
            &mut PracticeSession,
            &mut Library<SqliteStorage, SystemClock>,
        ) -> flashcards_app::Result<()>,
    {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(e) = step(session, &mut self.library) {
            self.message = Some(e.to_string());
        }
        if session.is_complete() {
            self.session = None;
            self.message = Some("Practice session complete!".to_string());
        }
    }

    fn render_manage_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Manage Cards");
            ui.horizontal(|ui| {
                deck_combo(ui, "Deck", &self.library.store().decks, &mut self.manage_deck_id);
                if ui.button("Delete Deck").clicked() {
                    self.pending_delete = Some(PendingDelete::Deck(self.manage_deck_id.clone()));
                }
            });
            ui.horizontal(|ui| {
                ui.label("Search:");
                ui.text_edit_singleline(&mut self.search);
            });
            ui.separator();

            let cards = self
                .library
                .search(&self.manage_deck_id, &self.search)
                .unwrap_or_default();
            ui.heading(format!("Cards ({})", cards.len()));

            let mut action_delete: Option<String> = None;
            egui::ScrollArea::vertical()
                .id_salt("card_list")
                .show(ui, |ui| {
                    for card in &cards {
                        ui.group(|ui| {
                            ui.label(format!("Front: {}", card.front_text));
                            card_image(
                                ui,
                                &mut self.image_cache,
                                card,
                                Side::Front,
                                THUMBNAIL_SIZE,
                            );
                            ui.label(format!("Back: {}", card.back_text));
                            card_image(
                                ui,
                                &mut self.image_cache,
                                card,
                                Side::Back,
                                THUMBNAIL_SIZE,
                            );
                            ui.label(format!("Tags: {}", card.tags.join(", ")));
                            ui.label(format!(
                                "Interval: {:.1} days, ease {:.2}, {} reviews",
                                card.review.interval, card.review.ease, card.review.reviews
                            ));
                            if ui.button("Delete").clicked() {
                                action_delete = Some(card.id.clone());
                            }
                        });
                    }
                });

            if let Some(card_id) = action_delete {
                self.pending_delete = Some(PendingDelete::Card(card_id));
            }
        });
    }

    fn render_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.pending_delete else {
            return;
        };
        let question = match pending {
            PendingDelete::Card(_) => "Are you sure you want to delete this card?",
            PendingDelete::Deck(_) => "Delete this deck and all of its cards?",
        };

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Confirm")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(question);
                ui.horizontal(|ui| {
                    if ui.button("No").clicked() {
                        cancelled = true;
                    }
                    if ui.button("Yes").clicked() {
                        confirmed = true;
                    }
                });
            });

        if cancelled {
            self.pending_delete = None;
        }
        if confirmed {
            let result = match self.pending_delete.take() {
                Some(PendingDelete::Card(card_id)) => self
                    .library
                    .delete_card(&card_id)
                    .map(|_| "Card deleted successfully."),
                Some(PendingDelete::Deck(deck_id)) => self
                    .library
                    .delete_deck(&deck_id)
                    .map(|_| "Deck deleted successfully."),
                None => return,
            };
            self.message = Some(match result {
                Ok(text) => text.to_string(),
                Err(e) => e.to_string(),
            });
        }
    }

    fn render_settings_screen(&mut self, ctx: &egui::Context) {
        let mut action_export = false;
        let mut action_import = false;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Settings");
            ui.horizontal(|ui| {
                if ui.button("Export Data").clicked() {
                    action_export = true;
                }
                if ui.button("Import Data").clicked() {
                    action_import = true;
                }
            });
        });

        if action_export {
            self.handle_export();
        }
        if action_import {
            self.handle_import(ctx);
        }
    }

    /// Handles store export to JSON file
    fn handle_export(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(self.library.export_file_name())
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            self.message = Some(match self.library.export_file(&path) {
                Ok(()) => "Data exported successfully!".to_string(),
                Err(e) => format!("Export failed: {e}"),
            });
        }
    }

    /// Handles store import from JSON file. The current data is kept if the file is rejected.
    fn handle_import(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        {
            self.message = Some(match self.library.import_file(&path) {
                Ok(()) => {
                    self.session = None;
                    // Imported cards may reuse ids with different images.
                    self.image_cache.clear();
                    ctx.forget_all_images();
                    "Data imported successfully!".to_string()
                }
                Err(e) => format!("Error importing data: {e}"),
            });
        }
    }
}

/// Deck selector. Falls back to the first deck when the selection no longer exists.
fn deck_combo(ui: &mut egui::Ui, label: &str, decks: &[Deck], selected: &mut String) {
    if !decks.iter().any(|deck| deck.id == *selected) {
        *selected = decks.first().map(|deck| deck.id.clone()).unwrap_or_default();
    }
    let selected_name = decks
        .iter()
        .find(|deck| deck.id == *selected)
        .map(|deck| deck.name.clone())
        .unwrap_or_else(|| "(no decks)".to_string());

    egui::ComboBox::from_label(label)
        .selected_text(selected_name)
        .show_ui(ui, |ui| {
            for deck in decks {
                ui.selectable_value(selected, deck.id.clone(), deck.name.as_str());
            }
        });
}

fn image_picker(
    ui: &mut egui::Ui,
    label: &str,
    image: &mut Option<PickedImage>,
    message: &mut Option<String>,
) {
    ui.horizontal(|ui| {
        ui.label(format!("{label}:"));
        match image {
            Some(picked) => {
                ui.label(&picked.file_name);
                if ui.button("Remove").clicked() {
                    ui.ctx().forget_image(&picked.uri);
                    *image = None;
                }
            }
            None => {
                if ui.button("Choose...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Images", &["png", "jpg", "jpeg", "gif"])
                        .pick_file()
                    {
                        match read_image(&path) {
                            Ok(picked) => *image = Some(picked),
                            Err(e) => *message = Some(format!("Error reading file: {e}")),
                        }
                    }
                }
            }
        }
    });
}

fn read_image(path: &Path) -> std::io::Result<PickedImage> {
    static NEXT_PICK: AtomicUsize = AtomicUsize::new(0);

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pick = NEXT_PICK.fetch_add(1, Ordering::Relaxed);
    Ok(PickedImage {
        uri: format!("bytes://picked/{pick}/{file_name}"),
        file_name,
        bytes: bytes.into(),
    })
}

fn picked_preview(ui: &mut egui::Ui, picked: Option<&PickedImage>) {
    if let Some(picked) = picked {
        ui.add(
            egui::Image::from_bytes(picked.uri.clone(), picked.bytes.clone())
                .max_size(CARD_IMAGE_SIZE),
        );
    }
}

/// Shows one side's image, if the card has one.
fn card_image(
    ui: &mut egui::Ui,
    cache: &mut ImageCache,
    card: &Flashcard,
    side: Side,
    max_size: egui::Vec2,
) {
    let data_url = side.data_url(card);
    if data_url.is_empty() {
        return;
    }
    let decoded = cache
        .entry(format!("{}/{}", card.id, side.name()))
        .or_insert_with(|| {
            decode_data_url(data_url).map(|image| {
                let uri = format!("bytes://card/{}/{}.{}", card.id, side.name(), image.extension);
                (uri, Bytes::from(image.bytes))
            })
        });
    match decoded {
        Some((uri, bytes)) => {
            ui.add(egui::Image::from_bytes(uri.clone(), bytes.clone()).max_size(max_size));
        }
        None => {
            ui.label("(image could not be displayed)");
        }
    }
}
