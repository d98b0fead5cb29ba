// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Mnemos.
//!
//! Exposes one shared [`Assistant`](mnemos_agent::Assistant) over a small
//! REST API. Answers stream back as Server-Sent Events carrying the growing
//! answer text.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{router, start_server, GatewayState};
