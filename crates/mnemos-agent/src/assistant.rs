// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The assistant service object tying knowledge, context, and the model together.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use mnemos_config::MnemosConfig;
use mnemos_context::{ContextManager, Role};
use mnemos_core::types::HealthStatus;
use mnemos_core::{EmbeddingAdapter, MnemosError, PluginAdapter, ProviderAdapter, StorageAdapter};
use mnemos_knowledge::{Fact, KnowledgeStore, ScoredFact};
use mnemos_storage::FileStorage;

use crate::answer::{answer_stream, AnswerDeps, AnswerStream, ERROR_MARKER};
use crate::prompt::DEFAULT_PREAMBLE;

/// Health of each adapter behind an [`Assistant`].
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub provider: HealthStatus,
    pub embedder: HealthStatus,
    pub storage: HealthStatus,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        [&self.provider, &self.embedder, &self.storage]
            .iter()
            .all(|s| **s == HealthStatus::Healthy)
    }
}

/// Retrieval-augmented assistant over one knowledge store and one shared
/// conversation context.
pub struct Assistant {
    storage: FileStorage,
    provider: Arc<dyn ProviderAdapter>,
    knowledge: Arc<KnowledgeStore>,
    context: Arc<ContextManager>,
    deps: Arc<AnswerDeps>,
    command_prefix: String,
}

impl Assistant {
    /// Prepare storage, then load (or seed) the knowledge store and load the context.
    pub async fn initialize(
        config: &MnemosConfig,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Self, MnemosError> {
        let timeout = Duration::from_secs(config.openai.request_timeout_secs);

        let storage = FileStorage::new(config.storage.clone());
        storage.initialize().await?;

        let knowledge = Arc::new(KnowledgeStore::initialize(&storage, embedder, timeout).await?);
        let context = Arc::new(
            ContextManager::load(
                &storage,
                provider.clone(),
                config.context.clone(),
                config.openai.chat_model.clone(),
                timeout,
            )
            .await?,
        );

        let deps = Arc::new(AnswerDeps {
            provider: provider.clone(),
            knowledge: knowledge.clone(),
            context: context.clone(),
            preamble: config
                .agent
                .system_prompt
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PREAMBLE.to_string()),
            model: config.openai.chat_model.clone(),
            temperature: config.generation.temperature,
            max_tokens: config.generation.max_tokens,
            top_k: config.knowledge.top_k,
            window: config.context.summary_limit,
            timeout,
        });

        info!(
            facts = knowledge.len().await,
            context_entries = context.len().await,
            model = config.openai.chat_model,
            "assistant ready"
        );

        Ok(Self {
            storage,
            provider,
            knowledge,
            context,
            deps,
            command_prefix: config.knowledge.command_prefix.clone(),
        })
    }

    /// Answer `input` as a stream of growing prefixes.
    ///
    /// Blank input yields nothing and leaves the context untouched. Input
    /// starting with the add-command prefix (any case) stores the rest as a
    /// fact and yields one confirmation line instead of asking the model.
    pub fn answer(&self, input: &str) -> AnswerStream {
        let question = input.trim();
        if question.is_empty() {
            return AnswerStream::empty();
        }

        if let Some(fact) = self.strip_command(question) {
            let knowledge = self.knowledge.clone();
            let context = self.context.clone();
            let command = question.to_string();
            let fact = fact.to_string();
            return AnswerStream::from_stream(futures::stream::once(async move {
                let reply = match knowledge.add(&fact).await {
                    Ok(added) => format!("**Knowledge added:** `{}`", added.text),
                    Err(e) => format!("{ERROR_MARKER} {e}"),
                };
                context.append(Role::User, command).await;
                context.append(Role::Assistant, reply.clone()).await;
                reply
            }));
        }

        answer_stream(self.deps.clone(), question.to_string())
    }

    /// The text after the add-command prefix, when `input` starts with it.
    fn strip_command<'a>(&self, input: &'a str) -> Option<&'a str> {
        let len = self.command_prefix.len();
        let head = input.get(..len)?;
        if head.to_lowercase() == self.command_prefix.to_lowercase() {
            input.get(len..).map(str::trim)
        } else {
            None
        }
    }

    /// Store a new fact.
    pub async fn add_knowledge(&self, text: &str) -> Result<Fact, MnemosError> {
        self.knowledge.add(text).await
    }

    /// The `k` facts closest to `query`.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredFact>, MnemosError> {
        self.knowledge.search(query, k).await
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeStore> {
        &self.knowledge
    }

    pub fn context(&self) -> &Arc<ContextManager> {
        &self.context
    }

    pub async fn health(&self) -> HealthReport {
        HealthReport {
            provider: status_of(self.provider.health_check().await),
            embedder: status_of(self.knowledge.embedder().health_check().await),
            storage: status_of(self.storage.health_check().await),
        }
    }

    /// Flush both stores, then shut the adapters down.
    ///
    /// Every step runs; the first error is returned.
    pub async fn shutdown(&self) -> Result<(), MnemosError> {
        let results = [
            self.knowledge.flush().await,
            self.context.flush().await,
            self.provider.shutdown().await,
            self.knowledge.embedder().shutdown().await,
            self.storage.close().await,
        ];

        let mut first = None;
        for result in results {
            if let Err(e) = result {
                warn!(error = %e, "shutdown step failed");
                first.get_or_insert(e);
            }
        }
        info!("assistant shut down");
        first.map_or(Ok(()), Err)
    }
}

fn status_of(result: Result<HealthStatus, MnemosError>) -> HealthStatus {
    result.unwrap_or_else(|e| HealthStatus::Unhealthy(e.to_string()))
}
