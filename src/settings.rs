//! Credential lookup.
//!
//! Settings come from two places, in this order:
//!
//! 1. a `.env`-style file with `NOTION_API_KEY` and `NOTION_DATABASE_ID`,
//!    used only when it yields both values
//! 2. a persisted key-value store with the keys `notionKey` and
//!    `databaseId`
//!
//! [`resolve`] is the single place this precedence is applied.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ENV_API_KEY: &str = "NOTION_API_KEY";
pub const ENV_DATABASE_ID: &str = "NOTION_DATABASE_ID";
pub const STORE_API_KEY: &str = "notionKey";
pub const STORE_DATABASE_ID: &str = "databaseId";

/// Default settings file name.
pub const ENV_FILE: &str = ".env";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("malformed settings store {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("no config directory for the settings store")]
    NoConfigDir,

    #[error("Please fill in all fields")]
    Incomplete,
}

/// Notion credentials for one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub database_id: String,
}

impl Settings {
    pub fn new(api_key: impl Into<String>, database_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            database_id: database_id.into(),
        }
    }

    /// Both the key and the database id are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.database_id.is_empty()
    }
}

/// Parse `.env` text into settings, if it yields both values.
///
/// Lines are `KEY=VALUE`, split at the first `=`, with both sides trimmed.
/// Blank lines, `#` comments and lines with an empty side are ignored.
pub fn parse_env(text: &str) -> Option<Settings> {
    let mut vars = HashMap::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let (key, value) = (key.trim(), value.trim());
            if !key.is_empty() && !value.is_empty() {
                vars.insert(key, value);
            }
        }
    }

    let settings = Settings::new(
        vars.get(ENV_API_KEY).copied().unwrap_or_default(),
        vars.get(ENV_DATABASE_ID).copied().unwrap_or_default(),
    );
    settings.is_complete().then_some(settings)
}

/// Persistent string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON object file. A missing file is an empty store.
///
/// A store opened with [`in_config_dir`](Self::in_config_dir) on a system
/// without a config directory has no file; it fails with
/// [`SettingsError::NoConfigDir`] only when it is actually read or written.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// The store at [`default_path`](Self::default_path).
    pub fn in_config_dir() -> Self {
        Self {
            path: Self::default_path().ok(),
        }
    }

    /// `<config dir>/pagecast/settings.json`.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        dirs::config_dir()
            .map(|dir| dir.join("pagecast").join("settings.json"))
            .ok_or(SettingsError::NoConfigDir)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn location(&self) -> Result<&Path, SettingsError> {
        self.path().ok_or(SettingsError::NoConfigDir)
    }

    fn load(&self) -> Result<HashMap<String, String>, SettingsError> {
        let path = self.location()?;
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| SettingsError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        let path = self.location()?;
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json =
            serde_json::to_string_pretty(&values).map_err(|source| SettingsError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        fs::write(path, json).map_err(write_err)
    }
}

/// Settings from the store, with absent keys as empty strings.
pub fn load_store(store: &dyn KeyValueStore) -> Result<Settings, SettingsError> {
    Ok(Settings::new(
        store.get(STORE_API_KEY)?.unwrap_or_default(),
        store.get(STORE_DATABASE_ID)?.unwrap_or_default(),
    ))
}

/// Persist settings to the store. Both values must be present.
pub fn save(store: &mut dyn KeyValueStore, settings: &Settings) -> Result<(), SettingsError> {
    if !settings.is_complete() {
        return Err(SettingsError::Incomplete);
    }
    store.set(STORE_API_KEY, &settings.api_key)?;
    store.set(STORE_DATABASE_ID, &settings.database_id)
}

/// Resolve settings: the env file when it is readable and complete,
/// otherwise the store.
///
/// The result may still be incomplete; callers decide what that means.
pub fn resolve(
    env_path: Option<&Path>,
    store: &dyn KeyValueStore,
) -> Result<Settings, SettingsError> {
    if let Some(path) = env_path {
        match fs::read_to_string(path) {
            Ok(text) => match parse_env(&text) {
                Some(settings) => {
                    tracing::debug!(path = %path.display(), "settings from env file");
                    return Ok(settings);
                }
                None => {
                    tracing::debug!(path = %path.display(), "env file incomplete, using store")
                }
            },
            Err(e) => tracing::debug!(
                path = %path.display(),
                error = %e,
                "env file unreadable, using store"
            ),
        }
    }
    load_store(store)
}

/// Source of settings for an export, consulted once per export.
pub trait SettingsProvider {
    fn settings(&self) -> Result<Settings, SettingsError>;
}

/// Fixed settings.
impl SettingsProvider for Settings {
    fn settings(&self) -> Result<Settings, SettingsError> {
        Ok(self.clone())
    }
}

/// The env-file-then-store lookup of [`resolve`].
pub struct Resolver<S> {
    pub env_path: Option<PathBuf>,
    pub store: S,
}

impl<S: KeyValueStore> Resolver<S> {
    pub fn new(env_path: Option<PathBuf>, store: S) -> Self {
        Self { env_path, store }
    }
}

impl<S: KeyValueStore> SettingsProvider for Resolver<S> {
    fn settings(&self) -> Result<Settings, SettingsError> {
        resolve(self.env_path.as_deref(), &self.store)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_parse_env() {
        let text = "# Notion\nNOTION_API_KEY = secret_abc\n\nNOTION_DATABASE_ID=db123\nOTHER=1\n";
        assert_eq!(parse_env(text), Some(Settings::new("secret_abc", "db123")));
    }

    #[test]
    fn test_parse_env_splits_at_first_equals() {
        let text = "NOTION_API_KEY=abc==\nNOTION_DATABASE_ID=a=b";
        assert_eq!(parse_env(text), Some(Settings::new("abc==", "a=b")));
    }

    #[test]
    fn test_parse_env_requires_both_values() {
        assert_eq!(parse_env("NOTION_API_KEY=abc"), None);
        assert_eq!(parse_env("NOTION_API_KEY=abc\nNOTION_DATABASE_ID="), None);
        assert_eq!(parse_env("#NOTION_API_KEY=abc\nNOTION_DATABASE_ID=db"), None);
        assert_eq!(parse_env(""), None);
    }

    #[test]
    fn test_env_file_wins_when_complete() {
        let dir = TempDir::new().unwrap();
        let env = dir.path().join(".env");
        fs::write(&env, "NOTION_API_KEY=file_key\nNOTION_DATABASE_ID=file_db\n").unwrap();
        let store = MemoryStore::new()
            .with(STORE_API_KEY, "store_key")
            .with(STORE_DATABASE_ID, "store_db");

        let settings = resolve(Some(env.as_path()), &store).unwrap();
        assert_eq!(settings, Settings::new("file_key", "file_db"));
    }

    #[test]
    fn test_incomplete_env_file_falls_back_to_store() {
        let dir = TempDir::new().unwrap();
        let env = dir.path().join(".env");
        fs::write(&env, "NOTION_API_KEY=file_key\n").unwrap();
        let store = MemoryStore::new()
            .with(STORE_API_KEY, "store_key")
            .with(STORE_DATABASE_ID, "store_db");

        let settings = resolve(Some(env.as_path()), &store).unwrap();
        assert_eq!(settings, Settings::new("store_key", "store_db"));
    }

    #[test]
    fn test_missing_env_file_falls_back_to_store() {
        let dir = TempDir::new().unwrap();
        let store = MemoryStore::new().with(STORE_API_KEY, "store_key");

        let settings = resolve(Some(dir.path().join("missing.env").as_path()), &store).unwrap();
        assert_eq!(settings, Settings::new("store_key", ""));
        assert!(!settings.is_complete());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut store = JsonFileStore::new(&path);
        assert_eq!(store.get(STORE_API_KEY).unwrap(), None);

        save(&mut store, &Settings::new("k", "d")).unwrap();
        assert!(path.exists());

        let reopened = JsonFileStore::new(&path);
        assert_eq!(load_store(&reopened).unwrap(), Settings::new("k", "d"));
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.get(STORE_API_KEY),
            Err(SettingsError::Malformed { .. })
        ));
    }

    #[test]
    fn test_store_without_config_dir_is_only_needed_as_fallback() {
        let dir = TempDir::new().unwrap();
        let env = dir.path().join(".env");
        fs::write(&env, "NOTION_API_KEY=file_key\nNOTION_DATABASE_ID=file_db\n").unwrap();
        let mut homeless = JsonFileStore { path: None };

        let settings = resolve(Some(env.as_path()), &homeless).unwrap();
        assert_eq!(settings, Settings::new("file_key", "file_db"));

        let missing = dir.path().join("missing.env");
        assert!(matches!(
            resolve(Some(missing.as_path()), &homeless),
            Err(SettingsError::NoConfigDir)
        ));
        assert!(matches!(
            save(&mut homeless, &Settings::new("k", "d")),
            Err(SettingsError::NoConfigDir)
        ));
    }

    #[test]
    fn test_save_requires_both_fields() {
        let mut store = MemoryStore::new();
        let err = save(&mut store, &Settings::new("k", "")).unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");
        assert_eq!(store.get(STORE_API_KEY).unwrap(), None);
    }

    #[test]
    fn test_resolver_provider() {
        let resolver = Resolver::new(
            None,
            MemoryStore::new()
                .with(STORE_API_KEY, "k")
                .with(STORE_DATABASE_ID, "d"),
        );
        assert_eq!(resolver.settings().unwrap(), Settings::new("k", "d"));
    }
}
