// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Mnemos.
//!
//! Provides the error taxonomy, adapter traits, and the request/response
//! types shared by the knowledge store, the context manager, and the
//! answering loop. Every external service (generative model, embedding
//! model, persistence backend) is reached through a trait defined here.

pub mod error;
pub mod timeout;
pub mod traits;
pub mod types;

pub use error::MnemosError;
pub use timeout::with_timeout;
pub use types::{AdapterType, HealthStatus};

pub use traits::{
    EmbeddingAdapter, PluginAdapter, ProviderAdapter, ProviderStream, StorageAdapter,
};
