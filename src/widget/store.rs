//! # Preferences Store
//!
//! Durable key/value document backing every widget preference. Values are
//! stored as JSON under string keys; the whole document lives in one file.
//!
//! ## Behaviour
//!
//! - The file is loaded lazily on first access; a missing file is an empty store
//! - Every `put` rewrites the document atomically (temp file, then rename)
//! - A store without a path never touches the filesystem
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wifiwidget::widget::store::PreferencesStore;
//!
//! # async fn example() -> Result<(), wifiwidget::shared::PersistenceError> {
//! let store = PreferencesStore::open("/tmp/wifiwidget/preferences.json");
//! store.put("opacity", &0.8f32).await?;
//! let opacity: Option<f32> = store.get("opacity").await?;
//! # Ok(())
//! # }
//! ```

use crate::shared::error::PersistenceError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Keyed JSON document, optionally persisted to a file
#[derive(Debug)]
pub struct PreferencesStore {
    path: Option<PathBuf>,
    document: Mutex<Option<Map<String, Value>>>,
}

impl PreferencesStore {
    /// Store persisted at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            document: Mutex::new(None),
        }
    }

    /// Store that only lives in memory
    pub fn in_memory() -> Self {
        Self {
            path: None,
            document: Mutex::new(Some(Map::new())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Decode the value stored under `key`, if any
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistenceError> {
        let mut guard = self.document.lock().await;
        let document = self.loaded(&mut guard).await?;
        match document.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Store `value` under `key` and persist the document
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_value(value)?;
        let mut guard = self.document.lock().await;
        let document = self.loaded(&mut guard).await?;

        let mut updated = document.clone();
        updated.insert(key.to_string(), encoded);
        self.persist(&updated).await?;
        *document = updated;

        tracing::debug!(key, path = ?self.path, "stored preference");
        Ok(())
    }

    /// Snapshot of the whole document
    pub async fn snapshot(&self) -> Result<Map<String, Value>, PersistenceError> {
        let mut guard = self.document.lock().await;
        Ok(self.loaded(&mut guard).await?.clone())
    }

    async fn loaded<'a>(
        &self,
        slot: &'a mut Option<Map<String, Value>>,
    ) -> Result<&'a mut Map<String, Value>, PersistenceError> {
        if slot.is_none() {
            *slot = Some(self.read_file().await?);
        }
        Ok(slot.get_or_insert_with(Map::new))
    }

    async fn read_file(&self) -> Result<Map<String, Value>, PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(Map::new());
        };
        match tokio::fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Map::new()),
            Ok(bytes) => {
                let document = serde_json::from_slice(&bytes)?;
                tracing::debug!(?path, "loaded preferences");
                Ok(document)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(?path, "no preferences file yet, starting empty");
                Ok(Map::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, document: &Map<String, Value>) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
