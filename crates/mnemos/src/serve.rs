// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos serve` command implementation.
//!
//! Starts the HTTP gateway over one shared assistant and runs until SIGINT
//! or SIGTERM, then flushes both stores before exiting.

use std::sync::Arc;

use tracing::{error, info};

use mnemos_agent::shutdown;
use mnemos_config::MnemosConfig;
use mnemos_core::MnemosError;
use mnemos_gateway::{start_server, GatewayState};

use crate::runtime::open_assistant;

pub async fn run_serve(config: MnemosConfig) -> Result<(), MnemosError> {
    info!("starting mnemos serve");

    let assistant = Arc::new(open_assistant(&config).await?);
    let cancel = shutdown::install_signal_handler();

    let served = start_server(
        &config.gateway,
        GatewayState::new(assistant.clone()),
        cancel.clone(),
    )
    .await;
    if let Err(e) = &served {
        error!(error = %e, "gateway stopped with an error");
    }

    // Stop the signal task if the server ended on its own.
    cancel.cancel();
    assistant.shutdown().await?;
    info!("mnemos serve stopped");
    served
}
