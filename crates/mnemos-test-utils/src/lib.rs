// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemos integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock generative model with scripted replies
//! - [`MockEmbedder`] - Deterministic embedder that counts calls and can fail on demand
//! - [`TestHarness`] - Assistant over a temp data directory wired to both mocks

pub mod harness;
pub mod mock_embedder;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_embedder::MockEmbedder;
pub use mock_provider::{MockProvider, MockReply};
