mod config;
pub mod day_cache;

pub use config::{CacheConfig, Config, SourceConfig};
pub use day_cache::{CacheEntry, DayCache, CACHE_FILE};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `SCHOLARIS_DATA_DIR` wins when set. Otherwise `~/.config/scholaris/`,
/// or `~/.config/scholaris-dev/` with `SCHOLARIS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("SCHOLARIS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("SCHOLARIS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("scholaris-dev")
            } else {
                base_dir.join("scholaris")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
