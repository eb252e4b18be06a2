mod config;
pub mod database;
pub mod migrations;

pub use config::{Config, PlannerConfig, ProfileConfig, TimersConfig};
pub use database::Database;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// Defaults to `~/.config/studymate[-dev]/` based on STUDYMATE_ENV.
/// Set STUDYMATE_ENV=dev to use the development data directory, or
/// STUDYMATE_DATA_DIR to use an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("STUDYMATE_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYMATE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studymate-dev")
            } else {
                base_dir.join("studymate")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
