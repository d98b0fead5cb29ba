// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Mnemos.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Mnemos configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemosConfig {
    /// Assistant identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// OpenAI-compatible API settings (chat and embeddings).
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Embedding backend selection.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Knowledge store retrieval settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Conversation context limits and summarization.
    #[serde(default)]
    pub context: ContextConfig,

    /// Answer generation parameters.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// On-disk file locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Replaces the built-in instruction line at the top of every answer prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
        }
    }
}

fn default_agent_name() -> String {
    "mnemos".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// OpenAI-compatible API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API, with or without the `/v1` suffix.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Chat model used for answers and summaries.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Upper bound on a single request, and on the gap between streamed chunks.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Which embedding backend produces knowledge vectors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    /// Local feature-hashing embedder. Needs no network access.
    #[default]
    Hashing,
    /// OpenAI `/embeddings` endpoint.
    Openai,
}

/// Embedding backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderKind,

    /// Remote embedding model (ignored by the hashing backend).
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension. Changing it invalidates an existing index file.
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::default(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

/// Knowledge store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    /// Number of facts retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Case-insensitive input prefix that adds a fact instead of asking a question.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            command_prefix: default_command_prefix(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_command_prefix() -> String {
    "add ".to_string()
}

/// Conversation context configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Entry count above which older entries are summarized.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,

    /// Entries kept verbatim after a summary, and the window shown to the model.
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,

    #[serde(default = "default_summary_temperature")]
    pub summary_temperature: f32,

    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            memory_limit: default_memory_limit(),
            summary_limit: default_summary_limit(),
            summary_temperature: default_summary_temperature(),
            summary_max_tokens: default_summary_max_tokens(),
        }
    }
}

fn default_memory_limit() -> usize {
    50
}

fn default_summary_limit() -> usize {
    20
}

fn default_summary_temperature() -> f32 {
    0.3
}

fn default_summary_max_tokens() -> u32 {
    200
}

/// Answer generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output cap for answers. `None` leaves the model default.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}

/// File locations. Relative file names resolve against `data_dir`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// JSON array of fact texts.
    #[serde(default = "default_knowledge_file")]
    pub knowledge_file: String,

    /// Binary vector index, one row per fact.
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// JSON conversation context.
    #[serde(default = "default_context_file")]
    pub context_file: String,
}

impl StorageConfig {
    /// Storage rooted at `dir` with the default file names.
    pub fn in_dir(dir: impl Into<String>) -> Self {
        Self {
            data_dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn knowledge_path(&self) -> PathBuf {
        self.resolve(&self.knowledge_file)
    }

    pub fn index_path(&self) -> PathBuf {
        self.resolve(&self.index_file)
    }

    pub fn context_path(&self) -> PathBuf {
        self.resolve(&self.context_file)
    }

    fn resolve(&self, file: &str) -> PathBuf {
        PathBuf::from(&self.data_dir).join(file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            knowledge_file: default_knowledge_file(),
            index_file: default_index_file(),
            context_file: default_context_file(),
        }
    }
}

fn default_data_dir() -> String {
    ".".to_string()
}

fn default_knowledge_file() -> String {
    "knowledge.json".to_string()
}

fn default_index_file() -> String {
    "knowledge.index".to_string()
}

fn default_context_file() -> String {
    "context.json".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8760
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_paths_join_data_dir() {
        let storage = StorageConfig::in_dir("/var/lib/mnemos");
        assert_eq!(
            storage.knowledge_path(),
            PathBuf::from("/var/lib/mnemos/knowledge.json")
        );
        assert_eq!(
            storage.index_path(),
            PathBuf::from("/var/lib/mnemos/knowledge.index")
        );
        assert_eq!(
            storage.context_path(),
            PathBuf::from("/var/lib/mnemos/context.json")
        );
    }

    #[test]
    fn embedding_provider_parses_lowercase() {
        let cfg: EmbeddingConfig = toml::from_str("provider = \"openai\"").unwrap();
        assert_eq!(cfg.provider, EmbeddingProviderKind::Openai);
        assert_eq!(cfg.dimensions, 384);
    }
}
