// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File persistence layer for Mnemos.
//!
//! Three independently loadable files live under the data directory: the
//! facts list (JSON), the vector index (binary `MNIX`), and the conversation
//! context (pretty JSON). Every write replaces the whole file atomically.

pub mod adapter;
pub mod atomic;
pub mod index;
pub mod json;

pub use adapter::FileStorage;
pub use atomic::atomic_write;
pub use index::{IndexFile, StoredIndex};
pub use json::JsonFile;
