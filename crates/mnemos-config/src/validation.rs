// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express, such as the relation
//! between `context.summary_limit` and `context.memory_limit`.

use crate::diagnostic::ConfigError;
use crate::model::{EmbeddingProviderKind, MnemosConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing on the first one.
pub fn validate_config(config: &MnemosConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        )));
    }

    if config.openai.chat_model.trim().is_empty() {
        errors.push(ConfigError::validation("openai.chat_model must not be empty"));
    }
    if config.openai.base_url.trim().is_empty() {
        errors.push(ConfigError::validation("openai.base_url must not be empty"));
    }
    if config.openai.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "openai.request_timeout_secs must be greater than 0",
        ));
    }

    if config.embedding.dimensions < 8 {
        errors.push(ConfigError::validation(format!(
            "embedding.dimensions must be at least 8, got {}",
            config.embedding.dimensions
        )));
    }
    if config.embedding.provider == EmbeddingProviderKind::Openai
        && config.embedding.model.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "embedding.model must not be empty when embedding.provider = \"openai\"",
        ));
    }

    if config.knowledge.top_k == 0 {
        errors.push(ConfigError::validation("knowledge.top_k must be at least 1"));
    }
    if config.knowledge.command_prefix.trim().is_empty() {
        errors.push(ConfigError::validation(
            "knowledge.command_prefix must not be blank",
        ));
    }

    let ctx = &config.context;
    if ctx.summary_limit == 0 {
        errors.push(ConfigError::validation(
            "context.summary_limit must be at least 1",
        ));
    }
    if ctx.summary_limit >= ctx.memory_limit {
        errors.push(ConfigError::validation(format!(
            "context.summary_limit ({}) must be less than context.memory_limit ({})",
            ctx.summary_limit, ctx.memory_limit
        )));
    }
    check_temperature(&mut errors, "context.summary_temperature", ctx.summary_temperature);
    if ctx.summary_max_tokens == 0 {
        errors.push(ConfigError::validation(
            "context.summary_max_tokens must be greater than 0",
        ));
    }

    check_temperature(&mut errors, "generation.temperature", config.generation.temperature);
    if config.generation.max_tokens == Some(0) {
        errors.push(ConfigError::validation(
            "generation.max_tokens must be greater than 0 when set",
        ));
    }

    let storage = &config.storage;
    for (key, value) in [
        ("storage.data_dir", &storage.data_dir),
        ("storage.knowledge_file", &storage.knowledge_file),
        ("storage.index_file", &storage.index_file),
        ("storage.context_file", &storage.context_file),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(format!("{key} must not be empty")));
        }
    }
    let files = [
        &storage.knowledge_file,
        &storage.index_file,
        &storage.context_file,
    ];
    if files[0] == files[1] || files[0] == files[2] || files[1] == files[2] {
        errors.push(ConfigError::validation(
            "storage.knowledge_file, storage.index_file and storage.context_file must differ",
        ));
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_temperature(errors: &mut Vec<ConfigError>, key: &str, value: f32) {
    if !(0.0..=2.0).contains(&value) {
        errors.push(ConfigError::validation(format!(
            "{key} must be between 0.0 and 2.0, got {value}"
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(validate_config(&MnemosConfig::default()).is_ok());
    }

    #[test]
    fn summary_limit_must_be_below_memory_limit() {
        let mut config = MnemosConfig::default();
        config.context.memory_limit = 10;
        config.context.summary_limit = 10;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("summary_limit"));
    }

    #[test]
    fn collects_every_violation() {
        let mut config = MnemosConfig::default();
        config.knowledge.top_k = 0;
        config.generation.temperature = 3.5;
        config.openai.request_timeout_secs = 0;
        config.agent.log_level = "loud".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4, "got: {errors:?}");
    }

    #[test]
    fn storage_files_must_be_distinct() {
        let mut config = MnemosConfig::default();
        config.storage.index_file = config.storage.context_file.clone();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("must differ"));
    }
}
