// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy `./mnemos.toml` > `~/.config/mnemos/mnemos.toml`
//! > `/etc/mnemos/mnemos.toml`, then the bare operator variables
//! (`OPENAI_API_KEY`, `TOP_K`, ...), then `MNEMOS_*` overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MnemosConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mnemos/mnemos.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "mnemos.toml";

/// Unprefixed environment variables an operator may set, and the key each one feeds.
const OPERATOR_ENV: &[(&str, &str)] = &[
    ("openai_api_key", "openai.api_key"),
    ("openai_model", "openai.chat_model"),
    ("openai_base_url", "openai.base_url"),
    ("embedding_model", "embedding.model"),
    ("top_k", "knowledge.top_k"),
    ("memory_limit", "context.memory_limit"),
    ("summary_limit", "context.summary_limit"),
    ("temperature", "generation.temperature"),
];

/// Config sections reachable through `MNEMOS_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &[
    "agent",
    "openai",
    "embedding",
    "knowledge",
    "context",
    "generation",
    "storage",
    "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mnemos/mnemos.toml` (system-wide)
/// 3. `~/.config/mnemos/mnemos.toml` (user XDG config)
/// 4. `./mnemos.toml` (local directory)
/// 5. Operator variables (`OPENAI_API_KEY`, `OPENAI_MODEL`, `TOP_K`, ...)
/// 6. `MNEMOS_*` environment variables
pub fn load_config() -> Result<MnemosConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<MnemosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::file(path))
        .merge(operator_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(operator_env_provider())
        .merge(env_provider())
}

/// `~/.config/mnemos/mnemos.toml`, when a config directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mnemos").join(LOCAL_CONFIG_FILE))
}

/// Provider for the unprefixed operator variables.
fn operator_env_provider() -> Env {
    let names: Vec<&str> = OPERATOR_ENV.iter().map(|(env, _)| *env).collect();
    Env::raw().only(&names).map(|key| {
        let key_str = key.as_str();
        OPERATOR_ENV
            .iter()
            .find(|(env, _)| *env == key_str)
            .map(|(_, dotted)| (*dotted).into())
            .unwrap_or_else(|| key_str.to_string().into())
    })
}

/// Create the `MNEMOS_` provider using explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys survive: `MNEMOS_CONTEXT_MEMORY_LIMIT` maps to `context.memory_limit`,
/// not `context.memory.limit`.
fn env_provider() -> Env {
    Env::prefixed("MNEMOS_").map(|key| {
        let key_str = key.as_str();
        SECTIONS
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|rest| format!("{section}.{rest}"))
            })
            .unwrap_or_else(|| key_str.to_string())
            .into()
    })
}
