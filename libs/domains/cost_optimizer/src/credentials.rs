//! Credential handling.
//!
//! The API key is process-wide configuration with an explicit lifecycle:
//! loaded once at startup, saved on every change, handed to the service as
//! a [`CredentialProvider`]. Persistence goes through the [`KeyValueStore`]
//! trait so the backing store can be swapped (file on disk, memory in tests).

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{OptimizerError, OptimizerResult};
use crate::models::{CredentialSource, CredentialStatus};

/// Preference key under which the API key is stored
pub const API_KEY_PREFERENCE: &str = "gemini-api-key";

/// An API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Masked form showing at most the last four characters
    pub fn hint(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let visible = if chars.len() > 8 { 4 } else { 0 };
        let tail: String = chars[chars.len() - visible..].iter().collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.hint())
    }
}

/// String key-value persistence for user preferences
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> OptimizerResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> OptimizerResult<()>;

    fn remove(&self, key: &str) -> OptimizerResult<()>;
}

/// Volatile store, lost on restart
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> OptimizerResult<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> OptimizerResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> OptimizerResult<()> {
        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Preferences kept as a flat JSON object in a single file.
///
/// Writes go to a sibling temp file that is renamed into place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, action: &str, err: impl fmt::Display) -> OptimizerError {
        OptimizerError::Store(format!(
            "failed to {} {}: {}",
            action,
            self.path.display(),
            err
        ))
    }

    fn read_all(&self) -> OptimizerResult<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.store_error("read", e)),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&contents).map_err(|e| self.store_error("parse", e))
    }

    fn write_all(&self, entries: &Map<String, Value>) -> OptimizerResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.store_error("create directory for", e))?;
        }

        let body =
            serde_json::to_string_pretty(entries).map_err(|e| self.store_error("encode", e))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| self.store_error("write", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.store_error("replace", e))
    }

    fn update(&self, apply: impl FnOnce(&mut Map<String, Value>)) -> OptimizerResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut entries = self.read_all()?;
        apply(&mut entries);
        self.write_all(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> OptimizerResult<Option<String>> {
        let entries = self.read_all()?;
        Ok(entries
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> OptimizerResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), Value::String(value.to_string()));
        })
    }

    fn remove(&self, key: &str) -> OptimizerResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

/// The credential configuration object handed to the analysis service.
///
/// The source is fixed at construction. Under
/// [`CredentialSource::Preference`] the key lives in the store and can be
/// changed at runtime; under [`CredentialSource::Environment`] it is the
/// value resolved at startup and is read-only.
pub struct CredentialProvider {
    source: CredentialSource,
    store: Option<Arc<dyn KeyValueStore>>,
    current: RwLock<Option<ApiKey>>,
    /// Held across the store write and the in-memory swap
    writes: Mutex<()>,
}

impl CredentialProvider {
    /// Load the stored preference once, at startup
    pub fn from_preference(store: Arc<dyn KeyValueStore>) -> OptimizerResult<Self> {
        let current = store.get(API_KEY_PREFERENCE)?.and_then(ApiKey::new);

        tracing::debug!(configured = current.is_some(), "Loaded API key preference");

        Ok(Self {
            source: CredentialSource::Preference,
            store: Some(store),
            current: RwLock::new(current),
            writes: Mutex::new(()),
        })
    }

    /// Use a key resolved from the process environment
    pub fn from_environment(raw: Option<String>) -> Self {
        Self {
            source: CredentialSource::Environment,
            store: None,
            current: RwLock::new(raw.and_then(ApiKey::new)),
            writes: Mutex::new(()),
        }
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Credential to use for the next request, if any
    pub fn current(&self) -> Option<ApiKey> {
        self.current
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn status(&self) -> CredentialStatus {
        let current = self.current();
        CredentialStatus {
            configured: current.is_some(),
            source: self.source,
            hint: current.as_ref().map(ApiKey::hint),
        }
    }

    /// Replace the stored key. A blank value clears it.
    ///
    /// Writers are serialized so the persisted value and the in-memory
    /// value always come from the same call.
    pub fn set(&self, raw: &str) -> OptimizerResult<CredentialStatus> {
        let store = self.writable_store()?;
        let _writer = self.writes.lock().unwrap_or_else(|p| p.into_inner());

        let key = ApiKey::new(raw);
        match &key {
            Some(key) => store.set(API_KEY_PREFERENCE, key.expose())?,
            None => store.remove(API_KEY_PREFERENCE)?,
        }

        let configured = key.is_some();
        *self.current.write().unwrap_or_else(|p| p.into_inner()) = key;

        if configured {
            tracing::info!("API key preference updated");
        } else {
            tracing::info!("API key preference cleared");
        }

        Ok(self.status())
    }

    pub fn clear(&self) -> OptimizerResult<CredentialStatus> {
        self.set("")
    }

    fn writable_store(&self) -> OptimizerResult<&Arc<dyn KeyValueStore>> {
        self.store.as_ref().ok_or(OptimizerError::CredentialLocked)
    }
}
