use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use lru::LruCache;

use crate::model::Card;

use super::embedding::{cosine_similarity, EmbeddingModel, HashEmbeddingModel};
use super::strategic_tags::build_semantic_document;

const UPSERT_BATCH_SIZE: usize = 100;
const SEARCH_MEMO_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct VectorStoreError {
    pub message: String,
}

impl std::fmt::Display for VectorStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for VectorStoreError {}

/// Similarity search over card embeddings.
#[async_trait]
pub trait VectorStore: Send + Sync {
    fn is_enabled(&self) -> bool;
    async fn upsert_cards(&self, cards: &[Card]) -> Result<(), VectorStoreError>;
    /// `metadata_filter` is accepted for interface parity with the outbound
    /// contract but is not applied here: the Repository applies hard
    /// filters in code after resolving ids, which is where filter exactness
    /// actually comes from regardless of embedding choice.
    async fn search(
        &self,
        query: &str,
        k: usize,
        metadata_filter: Option<&str>,
    ) -> Result<Vec<String>, VectorStoreError>;
    async fn count(&self) -> Result<u64, VectorStoreError>;
}

struct Entry {
    id: String,
    embedding: Vec<f32>,
}

/// Default backend: holds card embeddings in memory and answers cosine
/// similarity queries. Upserts batch in groups of 100 to mirror the
/// original system's batching discipline even though this backend has no
/// network round-trip to amortize.
pub struct InMemoryVectorStore {
    embedder: Box<dyn EmbeddingModel>,
    entries: Mutex<Vec<Entry>>,
    memo: Mutex<LruCache<(String, usize), Vec<String>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::with_embedder(Box::new(HashEmbeddingModel))
    }

    pub fn with_embedder(embedder: Box<dyn EmbeddingModel>) -> Self {
        Self {
            embedder,
            entries: Mutex::new(Vec::new()),
            memo: Mutex::new(LruCache::new(
                NonZeroUsize::new(SEARCH_MEMO_CAPACITY).unwrap(),
            )),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn upsert_cards(&self, cards: &[Card]) -> Result<(), VectorStoreError> {
        let mut entries = self.entries.lock().unwrap();
        for batch in cards.chunks(UPSERT_BATCH_SIZE) {
            for card in batch {
                let document = build_semantic_document(card);
                let embedding = self.embedder.embed(&document);
                entries.retain(|e| e.id != card.id);
                entries.push(Entry {
                    id: card.id.clone(),
                    embedding,
                });
            }
        }
        // A fresh upsert invalidates any cached result that might now be
        // stale; simplest correct behavior is to drop the whole memo.
        self.memo.lock().unwrap().clear();
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        k: usize,
        _metadata_filter: Option<&str>,
    ) -> Result<Vec<String>, VectorStoreError> {
        let cache_key = (query.to_string(), k);
        if let Some(hit) = self.memo.lock().unwrap().get(&cache_key) {
            return Ok(hit.clone());
        }

        let query_embedding = self.embedder.embed(query);
        let entries = self.entries.lock().unwrap();

        let mut scored: Vec<(f32, &str)> = entries
            .iter()
            .map(|e| (cosine_similarity(&query_embedding, &e.embedding), e.id.as_str()))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let ids: Vec<String> = scored.into_iter().take(k).map(|(_, id)| id.to_string()).collect();

        self.memo.lock().unwrap().put(cache_key, ids.clone());
        Ok(ids)
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        Ok(self.entries.lock().unwrap().len() as u64)
    }
}

/// Stands in for a store that has no embedding-provider credentials
/// configured. Every query fails with `VectorStoreUnavailable`; the
/// Repository is responsible for catching that and falling back to text
/// search.
pub struct DisabledVectorStore;

#[async_trait]
impl VectorStore for DisabledVectorStore {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn upsert_cards(&self, _cards: &[Card]) -> Result<(), VectorStoreError> {
        Err(VectorStoreError {
            message: "vector store is disabled".to_string(),
        })
    }

    async fn search(
        &self,
        _query: &str,
        _k: usize,
        _metadata_filter: Option<&str>,
    ) -> Result<Vec<String>, VectorStoreError> {
        Err(VectorStoreError {
            message: "vector store is disabled".to_string(),
        })
    }

    async fn count(&self) -> Result<u64, VectorStoreError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Color;

    fn card_named(name: &str, oracle_text: &str) -> Card {
        let mut card = Card::basic_land(Color::Red);
        card.id = name.to_lowercase();
        card.name = name.to_string();
        card.oracle_text = oracle_text.to_string();
        card
    }

    #[tokio::test]
    async fn search_returns_closest_match_first() {
        let store = InMemoryVectorStore::new();
        store
            .upsert_cards(&[
                card_named("Bolt", "deals damage to any target"),
                card_named("Counterspell", "counter target spell"),
            ])
            .await
            .unwrap();

        let results = store.search("deals damage to any target", 1, None).await.unwrap();
        assert_eq!(results, vec!["bolt".to_string()]);
    }

    #[tokio::test]
    async fn repeated_queries_are_served_from_memo() {
        let store = InMemoryVectorStore::new();
        store.upsert_cards(&[card_named("Bolt", "deals damage")]).await.unwrap();
        let first = store.search("deals damage", 1, None).await.unwrap();
        let second = store.search("deals damage", 1, None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn disabled_store_errors_on_every_operation() {
        let store = DisabledVectorStore;
        assert!(!store.is_enabled());
        assert!(store.search("anything", 1, None).await.is_err());
    }
}
