// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded waits for network-facing futures.

use std::future::Future;
use std::time::Duration;

use crate::error::MnemosError;

/// Awaits `fut`, failing with [`MnemosError::Timeout`] once `duration` elapses.
pub async fn with_timeout<F, T>(duration: Duration, fut: F) -> Result<T, MnemosError>
where
    F: Future<Output = Result<T, MnemosError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(?duration, "operation exceeded deadline");
            Err(MnemosError::Timeout { duration })
        }
    }
}
