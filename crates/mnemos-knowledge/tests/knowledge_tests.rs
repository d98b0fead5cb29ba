// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the knowledge store: seeding, search, persistence,
//! and startup recovery.

use std::sync::Arc;
use std::time::Duration;

use mnemos_config::model::StorageConfig;
use mnemos_core::{EmbeddingAdapter, MnemosError};
use mnemos_knowledge::{HashingEmbedder, KnowledgeStore, SEED_FACTS};
use mnemos_storage::FileStorage;
use mnemos_test_utils::MockEmbedder;

const TIMEOUT: Duration = Duration::from_secs(5);

fn storage_in(dir: &tempfile::TempDir) -> FileStorage {
    FileStorage::new(StorageConfig::in_dir(dir.path().to_string_lossy()))
}

async fn hashing_store(storage: &FileStorage) -> KnowledgeStore {
    let embedder: Arc<dyn EmbeddingAdapter> = Arc::new(HashingEmbedder::new(384).unwrap());
    KnowledgeStore::initialize(storage, embedder, TIMEOUT)
        .await
        .unwrap()
}

#[tokio::test]
async fn two_fresh_stores_seed_identical_facts() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let first = hashing_store(&storage_in(&a)).await.facts().await;
    let second = hashing_store(&storage_in(&b)).await.facts().await;

    assert_eq!(first, second);
    let texts: Vec<_> = first.iter().map(|f| f.text.as_str()).collect();
    assert_eq!(texts, SEED_FACTS);
}

#[tokio::test]
async fn reopening_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    hashing_store(&storage).await.add("Use cargo fmt before committing.").await.unwrap();

    let reopened = hashing_store(&storage).await;
    assert_eq!(reopened.len().await, 5);
}

#[tokio::test]
async fn debugging_query_ranks_the_debugging_fact_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = hashing_store(&storage_in(&dir)).await;

    let hits = store.search("debugging tips", 3).await.unwrap();
    assert!(hits.len() <= 3);
    assert_eq!(hits[0].fact.text, "Python programming and debugging tips.");
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn blank_query_and_zero_k_skip_the_embedder() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockEmbedder::new(16));
    let store = KnowledgeStore::initialize(&storage_in(&dir), mock.clone(), TIMEOUT)
        .await
        .unwrap();
    let calls_after_seed = mock.calls();

    assert!(store.search("", 3).await.unwrap().is_empty());
    assert!(store.search("   ", 3).await.unwrap().is_empty());
    assert!(store.search("errors", 0).await.unwrap().is_empty());
    assert_eq!(mock.calls(), calls_after_seed);
}

#[tokio::test]
async fn k_beyond_count_returns_every_fact_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = hashing_store(&storage_in(&dir)).await;

    let hits = store.search("code", 50).await.unwrap();
    let mut ids: Vec<_> = hits.iter().map(|h| h.fact.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn reload_gives_identical_results() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    let store = hashing_store(&storage).await;
    store.add("Tokio tasks must be Send to spawn.").await.unwrap();
    store.add("Prefer iterators over index loops.").await.unwrap();
    let before = store.search("spawn tokio tasks", 3).await.unwrap();
    drop(store);

    let reloaded = hashing_store(&storage).await;
    let after = reloaded.search("spawn tokio tasks", 3).await.unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn embedding_failure_on_add_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockEmbedder::new(16));
    let store = KnowledgeStore::initialize(&storage_in(&dir), mock.clone(), TIMEOUT)
        .await
        .unwrap();

    mock.set_failing(true);
    let err = store.add("never stored").await.unwrap_err();
    assert!(err.is_provider());
    assert_eq!(store.len().await, 4);
}

#[tokio::test]
async fn lagging_index_is_repaired_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    drop(hashing_store(&storage).await);

    // Simulate a crash after the facts write but before the index write.
    let mut facts = storage.facts_file().load().await.unwrap().unwrap();
    facts.push("Added just before the crash.".to_string());
    storage.facts_file().save(&facts).await.unwrap();

    let store = hashing_store(&storage).await;
    assert_eq!(store.len().await, 5);
    let hits = store.search("added just before the crash", 1).await.unwrap();
    assert_eq!(hits[0].fact.id, 4);

    let index = storage.index_file().load().await.unwrap().unwrap();
    assert_eq!(index.count(), 5);
}

#[tokio::test]
async fn index_ahead_of_facts_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    drop(hashing_store(&storage).await);

    let facts = vec![SEED_FACTS[0].to_string()];
    storage.facts_file().save(&facts).await.unwrap();

    assert!(matches!(
        KnowledgeStore::initialize(
            &storage,
            Arc::new(HashingEmbedder::new(384).unwrap()),
            TIMEOUT
        )
        .await,
        Err(MnemosError::StorageCorruption { .. })
    ));
}

#[tokio::test]
async fn dimension_change_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    drop(hashing_store(&storage).await);

    let result = KnowledgeStore::initialize(
        &storage,
        Arc::new(HashingEmbedder::new(128).unwrap()),
        TIMEOUT,
    )
    .await;
    assert!(matches!(result, Err(MnemosError::StorageCorruption { .. })));
}

#[tokio::test]
async fn corrupt_facts_file_is_never_reseeded() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    drop(hashing_store(&storage).await);
    std::fs::write(storage.facts_file().path(), b"[\"unterminated").unwrap();

    let result = KnowledgeStore::initialize(
        &storage,
        Arc::new(HashingEmbedder::new(384).unwrap()),
        TIMEOUT,
    )
    .await;
    assert!(matches!(result, Err(MnemosError::StorageCorruption { .. })));
    let raw = std::fs::read_to_string(storage.facts_file().path()).unwrap();
    assert_eq!(raw, "[\"unterminated");
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn search_only_returns_stored_facts(
            texts in proptest::collection::vec("[a-z]{3,8}( [a-z]{3,8}){0,3}", 1..8),
            query in "[a-z]{3,8}",
            k in 1usize..20,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let dir = tempfile::tempdir().unwrap();
                let store = hashing_store(&storage_in(&dir)).await;
                for text in &texts {
                    store.add(text).await.unwrap();
                }
                let count = store.len().await;
                let stored: Vec<String> =
                    store.facts().await.into_iter().map(|f| f.text).collect();

                let hits = store.search(&query, k).await.unwrap();
                prop_assert_eq!(hits.len(), k.min(count));
                for hit in &hits {
                    prop_assert!(stored.contains(&hit.fact.text));
                }
                if k >= count {
                    let mut ids: Vec<_> = hits.iter().map(|h| h.fact.id).collect();
                    ids.sort_unstable();
                    ids.dedup();
                    prop_assert_eq!(ids.len(), count);
                }
                Ok(())
            })?;
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_and_searches_stay_consistent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = storage_in(&dir);
    let store = Arc::new(hashing_store(&storage).await);
    let added: Vec<String> = (0..20).map(|i| format!("Concurrent fact number {i}")).collect();

    let mut handles = Vec::new();
    for text in added.clone() {
        let adder = store.clone();
        handles.push(tokio::spawn(async move {
            adder.add(&text).await.unwrap();
            Vec::new()
        }));
        let searcher = store.clone();
        handles.push(tokio::spawn(async move {
            searcher.search("concurrent fact number", 50).await.unwrap()
        }));
    }

    for handle in handles {
        let hits = handle.await.unwrap();
        let mut ids: Vec<_> = hits.iter().map(|h| h.fact.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), hits.len());
        for hit in hits {
            assert!(
                SEED_FACTS.contains(&hit.fact.text.as_str()) || added.contains(&hit.fact.text),
                "unexpected hit {:?}",
                hit.fact
            );
            assert_eq!(store.get(hit.fact.id).await, Some(hit.fact));
        }
    }

    let expected = SEED_FACTS.len() + added.len();
    assert_eq!(store.len().await, expected);
    let ids: Vec<_> = store.facts().await.into_iter().map(|f| f.id).collect();
    assert_eq!(ids, (0..expected).collect::<Vec<_>>());
    assert_eq!(store.search("concurrent fact number", 50).await.unwrap().len(), expected);

    let index = storage.index_file().load().await.unwrap().unwrap();
    assert_eq!(index.count(), expected);
    let reopened = hashing_store(&storage).await;
    assert_eq!(reopened.len().await, expected);
}
