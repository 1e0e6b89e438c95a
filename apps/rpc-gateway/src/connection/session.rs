// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session-scoped key/value storage the UI bootstraps from.
//!
//! Two backends: in-memory (default) and one JSON file per key under a
//! directory. File access runs on `tokio::fs`; writes go through a temp
//! file and a rename.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("Invalid session key `{0}`")]
    InvalidKey(String),

    #[error("Session storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Session storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn set(&self, key: &str, value: Value) -> Result<(), SessionStorageError>;

    async fn get(&self, key: &str) -> Result<Option<Value>, SessionStorageError>;

    /// Whether the backing store is usable.
    async fn is_available(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn set(&self, key: &str, value: Value) -> Result<(), SessionStorageError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, SessionStorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}

#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Storage rooted at `dir`, created if missing. Called once at startup.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SessionStorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SessionStorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(SessionStorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn set(&self, key: &str, value: Value) -> Result<(), SessionStorageError> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension("tmp");
        let bytes = serde_json::to_vec(&value)?;
        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, &path).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, SessionStorageError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn is_available(&self) -> bool {
        fs::metadata(&self.dir)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
    }
}
