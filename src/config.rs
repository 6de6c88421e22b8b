use crate::media::image::DEFAULT_MAX_IMAGE_BYTES;
use std::path::PathBuf;

const DB_FILE_NAME: &str = "db.sqlite3";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: String,
    pub max_image_bytes: usize,
    pub window_size: [f32; 2],
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("FLASHCARDS_DB")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        let max_image_bytes = lookup("FLASHCARDS_MAX_IMAGE_MB")
            .and_then(|value| value.parse::<usize>().ok())
            .and_then(|mb| mb.checked_mul(1024 * 1024))
            .unwrap_or(DEFAULT_MAX_IMAGE_BYTES);

        let width = lookup("FLASHCARDS_WINDOW_WIDTH")
            .and_then(|value| value.parse::<f32>().ok())
            .unwrap_or(500.0);
        let height = lookup("FLASHCARDS_WINDOW_HEIGHT")
            .and_then(|value| value.parse::<f32>().ok())
            .unwrap_or(700.0);

        Self {
            db_path,
            log_level,
            max_image_bytes,
            window_size: [width, height],
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("flashcards").join(DB_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DB_FILE_NAME))
}
