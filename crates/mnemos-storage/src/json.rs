// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed JSON documents on disk (facts list, conversation context).

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use mnemos_core::MnemosError;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::atomic::atomic_write;

/// A JSON file holding one value of type `T`.
///
/// Loading distinguishes an absent file (`Ok(None)`) from one that exists but
/// does not decode (`StorageCorruption`). Blocking file I/O runs on the
/// blocking thread pool.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    pretty: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFile<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            pretty: self.pretty,
            _marker: PhantomData,
        }
    }
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    /// Compact JSON at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: false,
            _marker: PhantomData,
        }
    }

    /// Pretty-printed (two-space indent) JSON at `path`.
    pub fn pretty(path: impl Into<PathBuf>) -> Self {
        Self {
            pretty: true,
            ..Self::new(path)
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and decode the file. `Ok(None)` when it does not exist.
    pub fn load_blocking(&self) -> Result<Option<T>, MnemosError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MnemosError::storage(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| MnemosError::StorageCorruption {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    /// Encode and atomically write `value`.
    pub fn save_blocking(&self, value: &T) -> Result<(), MnemosError> {
        let bytes = self.encode(value)?;
        atomic_write(&self.path, &bytes)
    }

    pub async fn load(&self) -> Result<Option<T>, MnemosError> {
        let file = self.clone();
        tokio::task::spawn_blocking(move || file.load_blocking())
            .await
            .map_err(|e| MnemosError::Internal(format!("load task failed: {e}")))?
    }

    /// Encodes on the calling task, writes on the blocking pool.
    pub async fn save(&self, value: &T) -> Result<(), MnemosError> {
        let bytes = self.encode(value)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, &bytes))
            .await
            .map_err(|e| MnemosError::Internal(format!("save task failed: {e}")))?
    }

    fn encode(&self, value: &T) -> Result<Vec<u8>, MnemosError> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        encoded.map_err(|e| MnemosError::Internal(format!("failed to encode {}: {e}", self.path.display())))
    }
}
