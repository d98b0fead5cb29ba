// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for persistence backends.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Prepares the backend (creates the data directory, etc.).
    async fn initialize(&self) -> Result<(), MnemosError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), MnemosError>;
}
