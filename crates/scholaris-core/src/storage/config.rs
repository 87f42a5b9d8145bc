//! TOML-based application configuration.
//!
//! Stores:
//! - Where the day cache lives
//! - Where calendar data is fetched from and how its timestamps are read
//! - Hotwords used to pick the timetable calendar
//!
//! Configuration is stored at `~/.config/scholaris/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::event::TimestampMode;
use crate::integrations::calendar_select::DEFAULT_HOTWORDS;

/// Day cache configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding `event_cache.json`. Defaults to the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Calendar source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory of the offline calendar mirror.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub timestamp_mode: TimestampMode,
    #[serde(default = "default_hotwords")]
    pub calendar_hotwords: Vec<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/scholaris/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

fn default_hotwords() -> Vec<String> {
    DEFAULT_HOTWORDS.iter().map(|w| w.to_string()).collect()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: None,
            timestamp_mode: TimestampMode::default(),
            calendar_hotwords: default_hotwords(),
        }
    }
}

impl Config {
    /// Keys that may be absent from the serialized form.
    const OPTIONAL_KEYS: &'static [&'static str] = &["cache.dir", "source.dir"];

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let optional = Self::OPTIONAL_KEYS.contains(&key);

                let new_value = match obj.get(part).cloned() {
                    None if !optional => return Err(unknown()),
                    _ if optional && value.is_empty() => {
                        obj.remove(part);
                        return Ok(());
                    }
                    Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    Some(serde_json::Value::Number(_)) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of `config.toml`.
    ///
    /// # Errors
    /// Returns [`ConfigError::DataDir`] if the data directory is unavailable.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir().map_err(ConfigError::DataDir)?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "using default configuration");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Unset optional keys read as an empty string.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let Some(val) = Self::get_json_value_by_path(&json, key) else {
            return Self::OPTIONAL_KEYS.contains(&key).then(String::new);
        };
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// An empty value clears optional path keys.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Directory for the day cache.
    ///
    /// # Errors
    /// Returns [`ConfigError::DataDir`] when falling back to an unavailable
    /// data directory.
    pub fn cache_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir().map_err(ConfigError::DataDir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.source.timestamp_mode, TimestampMode::StripOffset);
        assert!(parsed.source.calendar_hotwords.contains(&"school".to_string()));
    }

    #[test]
    fn empty_file_gives_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(
            cfg.get("source.timestamp_mode").as_deref(),
            Some("strip_offset")
        );
        assert_eq!(cfg.get("cache.dir").as_deref(), Some(""));
        assert!(cfg.get("source.missing_key").is_none());
    }

    #[test]
    fn set_timestamp_mode() {
        let mut cfg = Config::default();
        cfg.set("source.timestamp_mode", "apply_offset").unwrap();
        assert_eq!(cfg.source.timestamp_mode, TimestampMode::ApplyOffset);
    }

    #[test]
    fn set_rejects_unknown_enum_value() {
        let mut cfg = Config::default();
        let result = cfg.set("source.timestamp_mode", "sideways");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.source.timestamp_mode, TimestampMode::StripOffset);
    }

    #[test]
    fn set_and_clear_optional_path() {
        let mut cfg = Config::default();
        cfg.set("cache.dir", "/tmp/scholaris-cache").unwrap();
        assert_eq!(cfg.cache.dir, Some(PathBuf::from("/tmp/scholaris-cache")));
        assert_eq!(cfg.get("cache.dir").as_deref(), Some("/tmp/scholaris-cache"));

        cfg.set("cache.dir", "").unwrap();
        assert_eq!(cfg.cache.dir, None);
    }

    #[test]
    fn set_hotwords_from_json_array() {
        let mut cfg = Config::default();
        cfg.set("source.calendar_hotwords", r#"["uni", "lecture"]"#)
            .unwrap();
        assert_eq!(cfg.source.calendar_hotwords, vec!["uni", "lecture"]);

        let result = cfg.set("source.calendar_hotwords", "uni, lecture");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "source.nonexistent_key", "value");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
        let result = Config::set_json_value_by_path(&mut json, "nowhere.dir", "value");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_load_preserve_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("source.dir", "/srv/calendar").unwrap();
        cfg.set("source.timestamp_mode", "apply_offset").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source\ntimestamp_mode = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn explicit_cache_dir_wins() {
        let mut cfg = Config::default();
        cfg.cache.dir = Some(PathBuf::from("/var/cache/scholaris"));
        assert_eq!(cfg.cache_dir().unwrap(), PathBuf::from("/var/cache/scholaris"));
    }
}
