// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed implementation of the StorageAdapter trait.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use mnemos_config::model::StorageConfig;
use mnemos_core::types::{AdapterType, HealthStatus};
use mnemos_core::{MnemosError, PluginAdapter, StorageAdapter};

use crate::index::IndexFile;
use crate::json::JsonFile;

/// Storage rooted at a data directory holding the facts, index, and context files.
///
/// The three files are independent: each is loaded and written on its own,
/// so callers decide the write order that keeps them consistent.
#[derive(Debug, Clone)]
pub struct FileStorage {
    config: StorageConfig,
}

impl FileStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.data_dir)
    }

    /// JSON array of fact texts, in id order.
    pub fn facts_file(&self) -> JsonFile<Vec<String>> {
        JsonFile::new(self.config.knowledge_path())
    }

    /// Vector rows, one per fact.
    pub fn index_file(&self) -> IndexFile {
        IndexFile::new(self.config.index_path())
    }

    /// Pretty-printed conversation context.
    pub fn context_file<T>(&self) -> JsonFile<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        JsonFile::pretty(self.config.context_path())
    }
}

#[async_trait]
impl PluginAdapter for FileStorage {
    fn name(&self) -> &str {
        "file"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        let dir = self.data_dir();
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => Ok(HealthStatus::Healthy),
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Degraded(format!(
                "{} is read-only",
                dir.display()
            ))),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                dir.display()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "{}: {e}",
                dir.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        self.close().await
    }
}

#[async_trait]
impl StorageAdapter for FileStorage {
    async fn initialize(&self) -> Result<(), MnemosError> {
        let dir = self.data_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(MnemosError::storage)?;
        debug!(data_dir = %dir.display(), "file storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), MnemosError> {
        // Every write is synced before rename; nothing is buffered here.
        debug!("file storage closed");
        Ok(())
    }
}
