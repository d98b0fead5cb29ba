// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Mnemos.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all Mnemos adapter traits and core operations.
#[derive(Debug, Error)]
pub enum MnemosError {
    /// Configuration errors (invalid TOML, missing API key, out-of-range limits).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (unwritable data directory, failed rename, I/O).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted file exists but cannot be decoded.
    #[error("corrupt file {}: {message}", path.display())]
    StorageCorruption { path: PathBuf, message: String },

    /// Generative model or embedding service errors (HTTP failure, bad payload).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Caller supplied input the operation cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemosError {
    /// Shorthand for a [`MnemosError::Provider`] without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an I/O (or other) failure as a [`MnemosError::Storage`].
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// True for failures of the model or embedding services, including timeouts.
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider { .. } | Self::Timeout { .. })
    }

    /// True for persistence failures, including corrupt files.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::StorageCorruption { .. })
    }
}
