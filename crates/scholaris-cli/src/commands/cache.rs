use clap::Subcommand;

use scholaris_core::time;
use scholaris_core::{Config, DayCache};

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show the cached day
    Show,
    /// Delete the cached day (logout/reset)
    Clear,
    /// Drop the cached day and load today again from the source
    Refresh,
    /// Print the cache file path
    Path,
}

pub fn run(action: CacheAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        CacheAction::Show => {
            let cache = DayCache::new(config.cache_dir()?);
            match cache.load()? {
                Some(entry) => println!("{}", serde_json::to_string_pretty(&entry)?),
                None => println!("no cached day"),
            }
        }
        CacheAction::Clear => {
            let mut cache = DayCache::new(config.cache_dir()?);
            cache.invalidate()?;
            println!("cache cleared");
        }
        CacheAction::Refresh => {
            let mut service = super::service(&config)?;
            service.invalidate_cache()?;
            let report = service.refresh(time::day_of(time::now_local()));
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        CacheAction::Path => {
            let cache = DayCache::new(config.cache_dir()?);
            println!("{}", cache.path().display());
        }
    }
    Ok(())
}
