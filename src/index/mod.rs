//! Embedding index over one vector store collection.
//!
//! Owns the build path (embed chunks in bounded batches, append atomically)
//! and the retrieval path (embed a query, over-fetch nearest neighbors for
//! the reranker). A collection is written once and read-only afterwards.

use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{ChunkMetadata, VectorRecord, VectorStore};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default maximum number of texts per embedding request.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 100;

/// Outcome of indexing a chunk list.
#[derive(Debug, Clone, Default)]
pub struct IndexReport {
    /// Total chunks stored (including degraded ones).
    pub chunks_stored: usize,
    /// Zero-based indices of batches stored with zero vectors because the
    /// embedding provider failed.
    pub degraded_batches: Vec<usize>,
}

impl IndexReport {
    /// Whether any batch fell back to zero vectors.
    pub fn is_degraded(&self) -> bool {
        !self.degraded_batches.is_empty()
    }
}

/// A raw nearest-neighbor candidate, before reranking.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    /// Chunk id.
    pub id: String,
    /// Chunk text content.
    pub content: String,
    /// Chunk metadata.
    pub metadata: ChunkMetadata,
    /// Vector similarity (`1 - distance`), higher is closer.
    pub similarity: f32,
}

/// Embedding index bound to one named collection.
pub struct EmbeddingIndex {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    batch_size: usize,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("collection", &self.collection)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl EmbeddingIndex {
    /// Create a new collection and an index over it.
    ///
    /// Fails with `AlreadyExists` if the collection name is already live.
    pub async fn create(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: &str,
    ) -> Result<Self> {
        store.create_collection(collection).await?;
        Ok(Self {
            store,
            embedder,
            collection: collection.to_string(),
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        })
    }

    /// Open an index over an existing collection.
    ///
    /// Fails with `NotFound` if the collection was never built or was deleted.
    pub async fn open(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: &str,
    ) -> Result<Self> {
        if !store.has_collection(collection).await? {
            return Err(crate::error::VitenError::NotFound(format!(
                "Collection '{}'",
                collection
            )));
        }
        Ok(Self {
            store,
            embedder,
            collection: collection.to_string(),
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
        })
    }

    /// Override the embedding batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The collection this index reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed and store chunks in batches.
    ///
    /// Batches are embedded concurrently (the provider is stateless) but
    /// appended in order, and each append is atomic. A provider failure on one
    /// batch substitutes zero vectors of the right dimension for that batch
    /// and is reported rather than raised: indexing never aborts wholesale on
    /// a transient failure.
    #[instrument(skip(self, chunks), fields(collection = %self.collection, count = chunks.len()))]
    pub async fn add_batch(&self, chunks: &[Chunk]) -> Result<IndexReport> {
        if chunks.is_empty() {
            return Ok(IndexReport::default());
        }

        let batches: Vec<&[Chunk]> = chunks.chunks(self.batch_size).collect();

        let embed_futures = batches.iter().map(|batch| {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embedder = self.embedder.clone();
            async move { embedder.embed_batch(&texts).await }
        });
        let embedded = join_all(embed_futures).await;

        let mut report = IndexReport::default();

        for (batch_index, (batch, embeddings)) in batches.iter().zip(embedded).enumerate() {
            let vectors = match embeddings {
                Ok(vectors) => vectors,
                Err(e) => {
                    warn!(
                        "Embedding failed for batch {} ({} chunks), storing zero vectors: {}",
                        batch_index,
                        batch.len(),
                        e
                    );
                    report.degraded_batches.push(batch_index);
                    vec![vec![0.0; self.embedder.dimensions()]; batch.len()]
                }
            };

            let records: Vec<VectorRecord> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, embedding)| VectorRecord {
                    id: chunk.id.clone(),
                    content: chunk.content.clone(),
                    metadata: ChunkMetadata::from(chunk),
                    embedding,
                })
                .collect();

            report.chunks_stored += self.store.add_vectors(&self.collection, &records).await?;
        }

        info!(
            "Indexed {} chunks into {} ({} degraded batches)",
            report.chunks_stored,
            self.collection,
            report.degraded_batches.len()
        );
        Ok(report)
    }

    /// Embed a query and fetch `2k` nearest-neighbor candidates.
    ///
    /// The over-fetch gives the reranker material to work with; callers
    /// truncate to `k` after reranking.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let embedding = self.embedder.embed(text).await?;

        let hits = self
            .store
            .query(&self.collection, &embedding, k.saturating_mul(2))
            .await?;

        debug!("Retrieved {} candidates", hits.len());

        Ok(hits
            .into_iter()
            .map(|hit| RetrievedChunk {
                id: hit.id,
                content: hit.content,
                metadata: hit.metadata,
                similarity: 1.0 - hit.distance,
            })
            .collect())
    }

    /// Number of chunks stored in the collection.
    pub async fn count(&self) -> Result<usize> {
        self.store.count(&self.collection).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::chunking::SourceType;
    use crate::error::VitenError;
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;

    /// Deterministic embedder for tests: counts occurrences of marker words.
    pub struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            let count = |needle: &str| lower.matches(needle).count() as f32;
            Ok(vec![count("ai"), count("learning"), count("test") + 0.01])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    /// Embedder that always fails, to exercise degradation.
    pub struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(VitenError::Provider("embedding backend unreachable".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(VitenError::Provider("embedding backend unreachable".to_string()))
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    pub fn chunk(id: &str, content: &str, source_type: SourceType) -> Chunk {
        Chunk {
            id: id.to_string(),
            content: content.to_string(),
            source_type,
            section_title: None,
            timestamp: "00:00".to_string(),
            speaker: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_query() {
        let store = Arc::new(MemoryVectorStore::new());
        let index = EmbeddingIndex::create(store, Arc::new(StubEmbedder), "kb_1")
            .await
            .unwrap();

        let chunks = vec![
            chunk("transcript_0", "We discuss AI today", SourceType::TranscriptSegment),
            chunk("transcript_1", "Unrelated test content", SourceType::TranscriptSegment),
        ];
        let report = index.add_batch(&chunks).await.unwrap();
        assert_eq!(report.chunks_stored, 2);
        assert!(!report.is_degraded());

        let candidates = index.query("what about AI?", 1).await.unwrap();
        // Over-fetch: asks the store for 2k, so both chunks come back.
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "transcript_0");
        assert!(candidates[0].similarity > candidates[1].similarity);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_zero_vectors() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let index = EmbeddingIndex::create(store.clone(), Arc::new(FailingEmbedder), "kb_1")
            .await
            .unwrap();

        let chunks = vec![
            chunk("transcript_0", "one", SourceType::TranscriptSegment),
            chunk("transcript_1", "two", SourceType::TranscriptSegment),
            chunk("transcript_2", "three", SourceType::TranscriptSegment),
        ];
        let report = index.add_batch(&chunks).await.unwrap();

        assert_eq!(report.chunks_stored, 3);
        assert_eq!(report.degraded_batches, vec![0]);
        assert_eq!(store.count("kb_1").await.unwrap(), 3);

        let hits = store.query("kb_1", &[1.0, 0.0, 0.0], 3).await.unwrap();
        assert_eq!(hits.len(), 3);
        // Zero vectors sit at distance 1.0 from any query.
        assert!(hits.iter().all(|h| (h.distance - 1.0).abs() < 0.001));
    }

    #[tokio::test]
    async fn test_duplicate_collection_rejected() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        EmbeddingIndex::create(store.clone(), Arc::new(StubEmbedder), "kb_1")
            .await
            .unwrap();

        let err = EmbeddingIndex::create(store, Arc::new(StubEmbedder), "kb_1")
            .await
            .unwrap_err();
        assert!(matches!(err, VitenError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_open_missing_collection() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let err = EmbeddingIndex::open(store, Arc::new(StubEmbedder), "never_built")
            .await
            .unwrap_err();
        assert!(matches!(err, VitenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_batching_splits_input() {
        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let index = EmbeddingIndex::create(store.clone(), Arc::new(StubEmbedder), "kb_1")
            .await
            .unwrap()
            .with_batch_size(2);

        let chunks: Vec<Chunk> = (0..5)
            .map(|i| {
                chunk(
                    &format!("transcript_{}", i),
                    &format!("content {}", i),
                    SourceType::TranscriptSegment,
                )
            })
            .collect();

        let report = index.add_batch(&chunks).await.unwrap();
        assert_eq!(report.chunks_stored, 5);
        assert_eq!(index.count().await.unwrap(), 5);
    }
}
