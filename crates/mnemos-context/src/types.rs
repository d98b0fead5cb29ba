// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation context entries.

use serde::{Deserialize, Serialize};

/// Who produced a context entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Condensed stand-in for older turns.
    #[serde(alias = "system_summary")]
    Summary,
}

/// One turn of the conversation, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: Role,
    pub content: String,
}

impl ContextEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn summary(content: impl Into<String>) -> Self {
        Self::new(Role::Summary, content)
    }
}

/// What a summarization check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The context is within its limit.
    NotNeeded,
    /// `replaced` older entries were folded into one summary entry.
    Summarized { replaced: usize },
    /// Another summarization is in flight, or the context was cleared while
    /// this one ran.
    Skipped,
    /// The model call failed; the context was left as it was.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_serialize_with_lowercase_roles() {
        let json = serde_json::to_string(&ContextEntry::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn legacy_summary_role_is_accepted() {
        let entry: ContextEntry =
            serde_json::from_str(r#"{"role":"system_summary","content":"- earlier"}"#).unwrap();
        assert_eq!(entry, ContextEntry::summary("- earlier"));
        let rewritten = serde_json::to_string(&entry).unwrap();
        assert!(rewritten.contains(r#""role":"summary""#));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<ContextEntry>(r#"{"role":"tool","content":"x"}"#).is_err());
    }

    #[test]
    fn role_display_matches_wire_name() {
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!("summary".parse::<Role>().unwrap(), Role::Summary);
    }
}
