// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter selection and process-wide setup shared by every subcommand.

use std::sync::Arc;

use tracing::info;

use mnemos_agent::Assistant;
use mnemos_config::model::EmbeddingProviderKind;
use mnemos_config::MnemosConfig;
use mnemos_core::{EmbeddingAdapter, MnemosError, ProviderAdapter};
use mnemos_knowledge::HashingEmbedder;
use mnemos_openai::{embedder_from_config, OpenAiProvider};

/// Logs go to stderr so answers on stdout stay clean.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemos={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

pub fn build_provider(config: &MnemosConfig) -> Result<Arc<dyn ProviderAdapter>, MnemosError> {
    Ok(Arc::new(OpenAiProvider::new(config)?))
}

/// The embedder named by `embedding.provider`.
pub fn build_embedder(config: &MnemosConfig) -> Result<Arc<dyn EmbeddingAdapter>, MnemosError> {
    let embedder: Arc<dyn EmbeddingAdapter> = match config.embedding.provider {
        EmbeddingProviderKind::Hashing => {
            info!(dimensions = config.embedding.dimensions, "using hashing embedder");
            Arc::new(HashingEmbedder::new(config.embedding.dimensions)?)
        }
        EmbeddingProviderKind::Openai => Arc::new(embedder_from_config(config)?),
    };
    Ok(embedder)
}

/// Build both adapters and initialize the assistant over the configured data directory.
pub async fn open_assistant(config: &MnemosConfig) -> Result<Assistant, MnemosError> {
    let provider = build_provider(config)?;
    let embedder = build_embedder(config)?;
    Assistant::initialize(config, provider, embedder).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemos_core::PluginAdapter;

    #[test]
    fn hashing_embedder_uses_configured_dimensions() {
        let mut config = MnemosConfig::default();
        config.embedding.dimensions = 32;
        let embedder = build_embedder(&config).unwrap();
        assert_eq!(embedder.dimensions(), 32);
        assert_eq!(embedder.name(), "hashing-embedder");
    }

    #[test]
    fn openai_embedder_is_selected_by_config() {
        let mut config = MnemosConfig::default();
        config.openai.api_key = Some("sk-test".into());
        config.embedding.provider = EmbeddingProviderKind::Openai;
        config.embedding.dimensions = 256;
        let embedder = build_embedder(&config).unwrap();
        assert_eq!(embedder.dimensions(), 256);
        assert_eq!(embedder.name(), "openai-embeddings");
    }

    #[test]
    fn provider_builds_with_configured_key() {
        let mut config = MnemosConfig::default();
        config.openai.api_key = Some("sk-test".into());
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }
}
