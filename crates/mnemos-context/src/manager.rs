// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversation context and its summarization policy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use mnemos_config::model::ContextConfig;
use mnemos_core::{with_timeout, MnemosError, ProviderAdapter};
use mnemos_storage::{FileStorage, JsonFile};

use crate::compaction::generate_summary;
use crate::types::{ContextEntry, Role, SummaryOutcome};

struct State {
    entries: Vec<ContextEntry>,
    /// Bumped by `clear`; a summary computed for an older epoch is discarded.
    epoch: u64,
}

/// Ordered conversation history, persisted after every change.
///
/// When the history grows past `memory_limit` entries, everything but the
/// last `summary_limit` entries is replaced by a single summary entry. The
/// model call runs without holding the lock, so appends made meanwhile are
/// kept after the summary.
pub struct ContextManager {
    provider: Arc<dyn ProviderAdapter>,
    file: JsonFile<Vec<ContextEntry>>,
    settings: ContextConfig,
    model: String,
    timeout: Duration,
    summarizing: AtomicBool,
    state: Mutex<State>,
}

/// Clears the in-flight flag however the summarization ends.
struct SummarizingGuard<'a>(&'a AtomicBool);

impl Drop for SummarizingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ContextManager {
    /// Load the persisted context, starting empty if there is none.
    pub async fn load(
        storage: &FileStorage,
        provider: Arc<dyn ProviderAdapter>,
        settings: ContextConfig,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MnemosError> {
        let file = storage.context_file::<Vec<ContextEntry>>();
        let entries = file.load().await?.unwrap_or_default();
        info!(entries = entries.len(), "conversation context loaded");

        Ok(Self {
            provider,
            file,
            settings,
            model: model.into(),
            timeout,
            summarizing: AtomicBool::new(false),
            state: Mutex::new(State { entries, epoch: 0 }),
        })
    }

    /// Append an entry, persist, then summarize if the context is over its limit.
    pub async fn append(&self, role: Role, content: impl Into<String>) -> SummaryOutcome {
        self.push(role, content).await;
        self.summarize_if_needed().await
    }

    /// Append an entry and persist it without running the summarization check.
    pub async fn push(&self, role: Role, content: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.entries.push(ContextEntry::new(role, content));
        self.persist_logged(&state).await;
    }

    /// Fold older entries into a summary when the context exceeds `memory_limit`.
    ///
    /// Failures are logged and leave the context untouched.
    pub async fn summarize_if_needed(&self) -> SummaryOutcome {
        let (cut, epoch, transcript, _guard) = {
            let state = self.state.lock().await;
            if state.entries.len() <= self.settings.memory_limit {
                return SummaryOutcome::NotNeeded;
            }
            let cut = state
                .entries
                .len()
                .saturating_sub(self.settings.summary_limit);
            if cut == 0 {
                return SummaryOutcome::NotNeeded;
            }
            if self
                .summarizing
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                debug!("summarization already in flight");
                return SummaryOutcome::Skipped;
            }
            let transcript = state.entries[..cut]
                .iter()
                .map(|e| e.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            (
                cut,
                state.epoch,
                transcript,
                SummarizingGuard(&self.summarizing),
            )
        };

        let result = with_timeout(
            self.timeout,
            generate_summary(
                self.provider.as_ref(),
                &transcript,
                &self.model,
                &self.settings,
            ),
        )
        .await;

        let summary = match result {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "summarization failed, keeping context unchanged");
                return SummaryOutcome::Failed(e.to_string());
            }
        };

        let mut state = self.state.lock().await;
        if state.epoch != epoch || state.entries.len() < cut {
            debug!("context changed during summarization, discarding summary");
            return SummaryOutcome::Skipped;
        }
        let tail = state.entries.split_off(cut);
        state.entries = std::iter::once(ContextEntry::summary(summary))
            .chain(tail)
            .collect();
        self.persist_logged(&state).await;
        info!(
            replaced = cut,
            remaining = state.entries.len(),
            "context summarized"
        );
        SummaryOutcome::Summarized { replaced: cut }
    }

    /// The last `n` entries, oldest first.
    pub async fn recent_window(&self, n: usize) -> Vec<ContextEntry> {
        let state = self.state.lock().await;
        let start = state.entries.len().saturating_sub(n);
        state.entries[start..].to_vec()
    }

    /// Snapshot of the whole context.
    pub async fn entries(&self) -> Vec<ContextEntry> {
        self.state.lock().await.entries.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }

    /// Drop every entry and persist the empty context.
    pub async fn clear(&self) -> Result<(), MnemosError> {
        let mut state = self.state.lock().await;
        let dropped = state.entries.len();
        state.entries.clear();
        state.epoch += 1;
        self.file.save(&state.entries).await?;
        info!(dropped, "conversation context cleared");
        Ok(())
    }

    /// Write the current context to disk.
    pub async fn flush(&self) -> Result<(), MnemosError> {
        let state = self.state.lock().await;
        self.file.save(&state.entries).await
    }

    /// Memory stays authoritative when the write fails.
    async fn persist_logged(&self, state: &State) {
        if let Err(e) = self.file.save(&state.entries).await {
            warn!(error = %e, path = %self.file.path().display(), "failed to persist context");
        }
    }
}
