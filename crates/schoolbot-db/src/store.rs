//! JSON document store.
//!
//! A document is a single JSON object with one top-level list key:
//!
//! ```text
//! { "students": [ { ... }, { ... } ] }
//! ```
//!
//! Writes go to a sibling temp file that is then renamed over the document,
//! so a crash mid-write leaves the previous version intact.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

/// Error type for document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document '{path}': {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document '{path}' is not an object with a '{key}' list")]
    Shape { path: PathBuf, key: &'static str },
}

/// One collection persisted as a JSON document.
pub struct JsonStore<T> {
    path: PathBuf,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for JsonStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("path", &self.path)
            .field("key", &self.key)
            .finish()
    }
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>, key: &'static str) -> Self {
        Self {
            path: path.into(),
            key,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole collection. A missing file is an empty collection.
    #[instrument(skip(self), fields(store.key = self.key))]
    pub async fn load(&self) -> Result<Vec<T>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Document missing, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            warn!(path = %self.path.display(), "Document is empty, starting empty");
            return Ok(Vec::new());
        }

        let mut document: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Serialization {
                path: self.path.clone(),
                source,
            })?;

        let list = document
            .as_object_mut()
            .and_then(|obj| obj.remove(self.key))
            .ok_or_else(|| StoreError::Shape {
                path: self.path.clone(),
                key: self.key,
            })?;

        serde_json::from_value(list).map_err(|source| StoreError::Serialization {
            path: self.path.clone(),
            source,
        })
    }

    /// Rewrite the whole collection.
    #[instrument(skip(self, items), fields(store.key = self.key, store.len = items.len()))]
    pub async fn save(&self, items: &[T]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let mut document = serde_json::Map::new();
        document.insert(
            self.key.to_string(),
            serde_json::to_value(items).map_err(|source| StoreError::Serialization {
                path: self.path.clone(),
                source,
            })?,
        );
        let body = serde_json::to_vec_pretty(&serde_json::Value::Object(document)).map_err(
            |source| StoreError::Serialization {
                path: self.path.clone(),
                source,
            },
        )?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &body).await.map_err(io_err)?;
        fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        debug!(path = %self.path.display(), "Document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        name: String,
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Row> = JsonStore::new(dir.path().join("rows.json"), "rows");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonStore<Row> = JsonStore::new(dir.path().join("nested/rows.json"), "rows");
        let rows = vec![
            Row {
                id: 1,
                name: "a".into(),
            },
            Row {
                id: 2,
                name: "b".into(),
            },
        ];
        store.save(&rows).await.unwrap();
        assert_eq!(store.load().await.unwrap(), rows);

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert!(raw["rows"].is_array());
        assert!(!dir.path().join("nested/rows.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_wrong_shape_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, r#"{"other": []}"#).unwrap();
        let store: JsonStore<Row> = JsonStore::new(&path, "rows");
        assert!(matches!(
            store.load().await,
            Err(StoreError::Shape { key: "rows", .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "{not json").unwrap();
        let store: JsonStore<Row> = JsonStore::new(&path, "rows");
        assert!(matches!(
            store.load().await,
            Err(StoreError::Serialization { .. })
        ));
    }
}
