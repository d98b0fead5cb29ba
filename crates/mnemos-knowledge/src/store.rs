// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent fact store with semantic search.
//!
//! Fact texts live in a JSON array and their embeddings in the binary index
//! file; row `i` of the index always belongs to fact `i`. Both are held in
//! memory behind one lock so an insertion is never visible half-done.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use mnemos_core::types::EmbeddingInput;
use mnemos_core::{with_timeout, EmbeddingAdapter, MnemosError};
use mnemos_storage::{FileStorage, IndexFile, JsonFile};

use crate::index::FlatIndex;
use crate::types::{Fact, ScoredFact, SEED_FACTS};

struct Inner {
    facts: Vec<String>,
    index: FlatIndex,
}

/// Facts plus their nearest-neighbour index.
pub struct KnowledgeStore {
    embedder: Arc<dyn EmbeddingAdapter>,
    facts_file: JsonFile<Vec<String>>,
    index_file: IndexFile,
    embed_timeout: Duration,
    inner: RwLock<Inner>,
}

impl KnowledgeStore {
    /// Load the store from `storage`, seeding it when nothing is on disk.
    ///
    /// Unreadable files are fatal and never trigger a reseed. An index that
    /// lags the facts file (a crash between the two writes) is repaired by
    /// embedding the missing facts.
    pub async fn initialize(
        storage: &FileStorage,
        embedder: Arc<dyn EmbeddingAdapter>,
        embed_timeout: Duration,
    ) -> Result<Self, MnemosError> {
        let facts_file = storage.facts_file();
        let index_file = storage.index_file();
        let dimension = embedder.dimensions();

        let facts = facts_file.load().await?;
        let stored = index_file.load().await?;

        let store = Self {
            embedder,
            facts_file,
            index_file,
            embed_timeout,
            inner: RwLock::new(Inner {
                facts: Vec::new(),
                index: FlatIndex::new(dimension),
            }),
        };

        match (facts, stored) {
            (None, None) => store.seed().await?,
            (None, Some(_)) => {
                return Err(MnemosError::StorageCorruption {
                    path: store.facts_file.path().to_path_buf(),
                    message: "index file exists but the facts file is missing".into(),
                });
            }
            (Some(facts), stored) => {
                let mut index = match stored {
                    Some(stored) => {
                        if stored.dimension != dimension {
                            return Err(MnemosError::StorageCorruption {
                                path: store.index_file.path().to_path_buf(),
                                message: format!(
                                    "index dimension {} does not match embedder dimension {dimension}",
                                    stored.dimension
                                ),
                            });
                        }
                        if stored.count() > facts.len() {
                            return Err(MnemosError::StorageCorruption {
                                path: store.index_file.path().to_path_buf(),
                                message: format!(
                                    "index holds {} vectors for {} facts",
                                    stored.count(),
                                    facts.len()
                                ),
                            });
                        }
                        FlatIndex::from_stored(stored)
                    }
                    None => FlatIndex::new(dimension),
                };

                if index.len() < facts.len() {
                    let missing = &facts[index.len()..];
                    warn!(
                        indexed = index.len(),
                        facts = facts.len(),
                        "index lags facts file, re-embedding missing facts"
                    );
                    for vector in store.embed_batch(missing).await? {
                        index.add(&vector)?;
                    }
                    store.index_file.save(dimension, index.as_slice()).await?;
                }

                info!(facts = facts.len(), "knowledge store loaded");
                *store.inner.write().await = Inner { facts, index };
            }
        }

        Ok(store)
    }

    async fn seed(&self) -> Result<(), MnemosError> {
        let facts: Vec<String> = SEED_FACTS.iter().map(|s| s.to_string()).collect();
        let mut index = FlatIndex::new(self.embedder.dimensions());
        for vector in self.embed_batch(&facts).await? {
            index.add(&vector)?;
        }

        self.facts_file.save(&facts).await?;
        self.index_file
            .save(index.dimension(), index.as_slice())
            .await?;

        info!(facts = facts.len(), "knowledge store seeded");
        *self.inner.write().await = Inner { facts, index };
        Ok(())
    }

    /// Embed `texts` in one call and check the shape of the result.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MnemosError> {
        let output = with_timeout(
            self.embed_timeout,
            self.embedder.embed(EmbeddingInput {
                texts: texts.to_vec(),
            }),
        )
        .await?;

        if output.embeddings.len() != texts.len() {
            return Err(MnemosError::provider(format!(
                "embedding service returned {} vectors for {} texts",
                output.embeddings.len(),
                texts.len()
            )));
        }
        let dimension = self.embedder.dimensions();
        if let Some(bad) = output.embeddings.iter().find(|v| v.len() != dimension) {
            return Err(MnemosError::provider(format!(
                "embedding has dimension {}, expected {dimension}",
                bad.len()
            )));
        }
        Ok(output.embeddings)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MnemosError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| MnemosError::provider("embedding service returned no vectors"))
    }

    /// Up to `k` facts nearest to `query`, closest first.
    ///
    /// Returns an empty list without calling the embedder when `k` is zero,
    /// the query is blank, or the store holds nothing.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredFact>, MnemosError> {
        if k == 0 || query.trim().is_empty() || self.is_empty().await {
            return Ok(Vec::new());
        }

        let vector = self.embed_one(query).await?;

        let inner = self.inner.read().await;
        let hits = inner
            .index
            .search(&vector, k)
            .into_iter()
            .filter_map(|(id, distance)| {
                inner.facts.get(id).map(|text| ScoredFact {
                    fact: Fact {
                        id,
                        text: text.clone(),
                    },
                    distance,
                })
            })
            .collect::<Vec<_>>();
        debug!(k, hits = hits.len(), "knowledge search");
        Ok(hits)
    }

    /// Store a new fact and persist both files.
    ///
    /// Persistence failures are logged; the fact stays searchable in memory.
    pub async fn add(&self, text: &str) -> Result<Fact, MnemosError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MnemosError::InvalidInput(
                "cannot add an empty fact".into(),
            ));
        }

        let vector = self.embed_one(text).await?;

        let mut inner = self.inner.write().await;
        let id = inner.index.add(&vector)?;
        inner.facts.push(text.to_string());

        if let Err(e) = self.persist(&inner).await {
            warn!(error = %e, id, "failed to persist knowledge, keeping it in memory");
        }
        info!(id, "knowledge added");

        Ok(Fact {
            id,
            text: text.to_string(),
        })
    }

    /// Facts first, then the index, so the index never runs ahead of the facts.
    async fn persist(&self, inner: &Inner) -> Result<(), MnemosError> {
        self.facts_file.save(&inner.facts).await?;
        self.index_file
            .save(inner.index.dimension(), inner.index.as_slice())
            .await
    }

    /// Write the current state to disk.
    pub async fn flush(&self) -> Result<(), MnemosError> {
        let inner = self.inner.read().await;
        self.persist(&inner).await
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.facts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.facts.is_empty()
    }

    /// Snapshot of every fact in id order.
    pub async fn facts(&self) -> Vec<Fact> {
        self.inner
            .read()
            .await
            .facts
            .iter()
            .enumerate()
            .map(|(id, text)| Fact {
                id,
                text: text.clone(),
            })
            .collect()
    }

    pub async fn get(&self, id: usize) -> Option<Fact> {
        self.inner.read().await.facts.get(id).map(|text| Fact {
            id,
            text: text.clone(),
        })
    }

    /// The embedding service behind this store.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingAdapter> {
        &self.embedder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashingEmbedder;
    use mnemos_config::model::StorageConfig;

    fn storage_in(dir: &std::path::Path) -> FileStorage {
        FileStorage::new(StorageConfig::in_dir(dir.to_string_lossy()))
    }

    async fn open(storage: &FileStorage) -> Result<KnowledgeStore, MnemosError> {
        let embedder: Arc<dyn EmbeddingAdapter> = Arc::new(HashingEmbedder::new(64)?);
        KnowledgeStore::initialize(storage, embedder, Duration::from_secs(5)).await
    }

    #[tokio::test]
    async fn fresh_store_is_seeded_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        let store = open(&storage).await.unwrap();

        assert_eq!(store.len().await, 4);
        assert_eq!(store.get(0).await.unwrap().text, SEED_FACTS[0]);
        assert!(storage.facts_file().exists());
        assert!(storage.index_file().exists());
    }

    #[tokio::test]
    async fn blank_fact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&storage_in(dir.path())).await.unwrap();
        assert!(matches!(
            store.add("   ").await,
            Err(MnemosError::InvalidInput(_))
        ));
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn added_fact_is_trimmed_and_findable() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&storage_in(dir.path())).await.unwrap();

        let fact = store.add("  Rust borrow checker rules  ").await.unwrap();
        assert_eq!(fact.id, 4);
        assert_eq!(fact.text, "Rust borrow checker rules");

        let hits = store.search("borrow checker", 1).await.unwrap();
        assert_eq!(hits[0].fact, fact);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn missing_index_is_rebuilt_from_facts() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        drop(open(&storage).await.unwrap());
        std::fs::remove_file(storage.index_file().path()).unwrap();

        let store = open(&storage).await.unwrap();
        assert_eq!(store.len().await, 4);
        assert!(storage.index_file().exists());
        assert!(logs_contain("index lags facts file"));
    }

    #[tokio::test]
    async fn index_without_facts_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        drop(open(&storage).await.unwrap());
        std::fs::remove_file(storage.facts_file().path()).unwrap();

        assert!(matches!(
            open(&storage).await,
            Err(MnemosError::StorageCorruption { .. })
        ));
    }
}
