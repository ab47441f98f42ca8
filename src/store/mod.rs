//! Single-file JSON document store.
//!
//! The whole mapping of key -> document lives in one JSON object that is read
//! once at startup and rewritten in full on every save. A missing file is an
//! empty store; a file that exists but does not parse is an error. There is no
//! cross-process locking: one writer per file is assumed.


use std::path::Path;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use tracing::info;

use crate::StorageError;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the full mapping, preserving key order as written.
    pub async fn load<D: DeserializeOwned>(&self) -> Result<IndexMap<String, D>, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No store at {:?}, starting empty", self.path);
                return Ok(IndexMap::new());
            }
            Err(e) => {
                return Err(StorageError::PathError {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        let documents: IndexMap<String, D> =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                path: self.path.clone(),
                source: e,
            })?;
        info!("Loaded {} documents from {:?}", documents.len(), self.path);
        Ok(documents)
    }

    /// Replaces the file contents with `documents`.
    ///
    /// Writes a sibling temp file and renames it into place so a crash mid-write
    /// leaves the previous version intact.
    pub async fn save<D: Serialize>(
        &self,
        documents: &IndexMap<String, D>,
    ) -> Result<(), StorageError> {
        let buf = serde_json::to_vec_pretty(documents)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.path_error(parent, e))?;
            }
        }

        let tmp_path = self.tmp_path();
        if let Err(e) = self.replace_with(&tmp_path, &buf).await {
            if let Err(rm) = fs::remove_file(&tmp_path).await {
                debug!("Leftover {:?} not removed: {}", tmp_path, rm);
            }
            return Err(e);
        }

        debug!(
            documents = documents.len(),
            bytes = buf.len(),
            "Store rewritten"
        );
        Ok(())
    }

    async fn replace_with(
        &self,
        tmp_path: &Path,
        buf: &[u8],
    ) -> Result<(), StorageError> {
        let mut file = fs::File::create(tmp_path)
            .await
            .map_err(|e| self.path_error(tmp_path, e))?;
        file.write_all(buf).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(tmp_path, &self.path)
            .await
            .map_err(|e| self.path_error(&self.path, e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn path_error(
        &self,
        path: &Path,
        source: std::io::Error,
    ) -> StorageError {
        StorageError::PathError {
            path: path.to_path_buf(),
            source,
        }
    }
}
