//! User preferences and their durable key-value storage.
//!
//! Preferences are three strings stored under fixed keys. Values are kept as entered so that a
//! stale or hand-edited store loads without error; they are resolved into typed provider and
//! length values only when a summary is requested.

use crate::summarization::{LengthClass, ProviderId, SummarizeError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Storage key for the provider identifier.
pub const PROVIDER_KEY: &str = "aiProvider";
/// Storage key for the API key.
pub const API_KEY_KEY: &str = "apiKey";
/// Storage key for the summary length.
pub const LENGTH_KEY: &str = "summaryLength";

/// Errors raised by preference storage backends.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The backing file could not be read or written.
    #[error("Preference storage I/O failed for {path}: {source}")]
    Io {
        /// File backing the store.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The backing file does not contain a JSON object of strings.
    #[error("Preference file {path} is not valid JSON: {source}")]
    Malformed {
        /// File backing the store.
        path: PathBuf,
        /// Decoder failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Durable string key-value storage.
pub trait PreferenceStore: Send + Sync {
    /// Read a stored value.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Write several values in one step.
    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), PreferenceError>;
}

/// Provider, key, and length chosen by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Provider identifier as entered.
    pub provider: String,
    /// API key as entered.
    pub api_key: String,
    /// Length identifier as entered.
    pub length: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            provider: ProviderId::OpenAi.as_str().to_string(),
            api_key: String::new(),
            length: LengthClass::Medium.as_str().to_string(),
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("provider", &self.provider)
            .field("api_key_set", &self.has_api_key())
            .field("length", &self.length)
            .finish()
    }
}

impl Preferences {
    /// Load preferences, keeping defaults for keys that are missing or empty.
    pub fn load(store: &dyn PreferenceStore) -> Result<Self, PreferenceError> {
        let mut preferences = Self::default();
        if let Some(value) = store.get(PROVIDER_KEY)?.filter(|v| !v.is_empty()) {
            preferences.provider = value;
        }
        if let Some(value) = store.get(API_KEY_KEY)?.filter(|v| !v.is_empty()) {
            preferences.api_key = value;
        }
        if let Some(value) = store.get(LENGTH_KEY)?.filter(|v| !v.is_empty()) {
            preferences.length = value;
        }
        tracing::debug!(preferences = ?preferences, "Loaded preferences");
        Ok(preferences)
    }

    /// Write all three fields to `store`.
    pub fn save(&self, store: &dyn PreferenceStore) -> Result<(), PreferenceError> {
        store.set_all(&[
            (PROVIDER_KEY, self.provider.as_str()),
            (API_KEY_KEY, self.api_key.as_str()),
            (LENGTH_KEY, self.length.as_str()),
        ])
    }

    /// Whether the API key is non-empty after trimming.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Resolve the stored provider.
    pub fn provider_id(&self) -> Result<ProviderId, SummarizeError> {
        self.provider
            .parse()
            .map_err(|()| SummarizeError::UnsupportedProvider(self.provider.clone()))
    }

    /// Resolve the stored length class.
    pub fn length_class(&self) -> Result<LengthClass, SummarizeError> {
        self.length
            .parse()
            .map_err(|()| SummarizeError::UnsupportedLength(self.length.clone()))
    }

    /// Redacted view safe to return to clients.
    pub fn view(&self) -> PreferencesView {
        PreferencesView {
            provider: self.provider.clone(),
            api_key_set: self.has_api_key(),
            length: self.length.clone(),
        }
    }
}

/// Preferences with the API key replaced by a presence flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferencesView {
    /// Provider identifier.
    pub provider: String,
    /// Whether a non-blank API key is stored.
    pub api_key_set: bool,
    /// Length identifier.
    pub length: String,
}

/// Preference store persisted as a flat JSON object on disk.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Use `path` as the backing file; it is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| PreferenceError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> PreferenceError {
        PreferenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), PreferenceError> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut map = self.read_map()?;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let encoded = serde_json::to_string_pretty(&map).map_err(|source| {
            PreferenceError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, encoded).map_err(|source| self.io_error(source))?;
        std::fs::rename(&staging, &self.path).map_err(|source| self.io_error(source))?;
        tracing::debug!(path = %self.path.display(), keys = entries.len(), "Saved preferences");
        Ok(())
    }
}

/// In-memory preference store.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set_all(&self, entries: &[(&str, &str)]) -> Result<(), PreferenceError> {
        let mut map = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }
}
