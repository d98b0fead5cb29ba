// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compaction: folds older conversation turns into a short summary via a
//! model call.

use mnemos_config::model::ContextConfig;
use mnemos_core::types::{ProviderMessage, ProviderRequest};
use mnemos_core::{MnemosError, ProviderAdapter};

/// Instruction placed ahead of the transcript being summarized.
const SUMMARY_PROMPT: &str =
    "Summarize this conversation concisely (bullet points) for coding assistant context:";

/// Build the summarization request for `transcript`.
pub fn summary_request(transcript: &str, model: &str, settings: &ContextConfig) -> ProviderRequest {
    ProviderRequest {
        model: model.to_string(),
        system_prompt: None,
        messages: vec![ProviderMessage::user(format!(
            "{SUMMARY_PROMPT}\n\n{transcript}"
        ))],
        temperature: Some(settings.summary_temperature),
        max_tokens: Some(settings.summary_max_tokens),
        stream: false,
    }
}

/// Ask the model to summarize `transcript` and return the summary text.
///
/// A blank reply counts as a failure so it never replaces real history.
pub async fn generate_summary(
    provider: &dyn ProviderAdapter,
    transcript: &str,
    model: &str,
    settings: &ContextConfig,
) -> Result<String, MnemosError> {
    let response = provider
        .complete(summary_request(transcript, model, settings))
        .await?;

    let summary = response.content.trim();
    if summary.is_empty() {
        return Err(MnemosError::provider("model returned an empty summary"));
    }

    tracing::info!(
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        model = model,
        transcript_chars = transcript.len(),
        "compaction summary generated"
    );

    Ok(summary.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_prompt_and_sampling_settings() {
        let settings = ContextConfig::default();
        let request = summary_request("hello\nworld", "gpt-4o-mini", &settings);

        assert_eq!(request.model, "gpt-4o-mini");
        assert!(!request.stream);
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(200));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert!(request.messages[0].content.starts_with(SUMMARY_PROMPT));
        assert!(request.messages[0].content.ends_with("\n\nhello\nworld"));
    }
}
