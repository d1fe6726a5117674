//! Vector store abstraction for Viten.
//!
//! Provides a trait-based interface for collection-oriented vector database
//! backends. A collection is immutable after build: records are appended in
//! batches while indexing and never mutated afterwards, so concurrent readers
//! never race with writers.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::chunking::{Chunk, SourceType};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata stored alongside each vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Origin category of the chunk.
    pub source_type: SourceType,
    /// Section title, when the chunk came from notes.
    pub section_title: Option<String>,
    /// Timestamp string (MM:SS or HH:MM:SS).
    pub timestamp: String,
    /// Speaker label, if present on the source segment.
    pub speaker: Option<String>,
}

impl From<&Chunk> for ChunkMetadata {
    fn from(chunk: &Chunk) -> Self {
        Self {
            source_type: chunk.source_type,
            section_title: chunk.section_title.clone(),
            timestamp: chunk.timestamp.clone(),
            speaker: chunk.speaker.clone(),
        }
    }
}

/// One id + content + metadata + vector entry, appended as part of a batch.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Chunk id.
    pub id: String,
    /// Chunk text content.
    pub content: String,
    /// Chunk metadata.
    pub metadata: ChunkMetadata,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

/// A nearest-neighbor hit returned by a query.
#[derive(Debug, Clone)]
pub struct ScoredHit {
    /// Chunk id.
    pub id: String,
    /// Chunk text content.
    pub content: String,
    /// Chunk metadata.
    pub metadata: ChunkMetadata,
    /// Cosine distance to the query vector (lower is closer).
    pub distance: f32,
}

/// Summary information about a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Number of stored chunks.
    pub chunk_count: usize,
    /// When the collection was created.
    pub created_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
///
/// Implementations must make `add_vectors` atomic per call: either every
/// record in the batch is stored, or none are.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a new, empty collection. Fails with `AlreadyExists` if the name
    /// collides with a live collection.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Append a batch of records to a collection, atomically.
    async fn add_vectors(&self, collection: &str, records: &[VectorRecord]) -> Result<usize>;

    /// Return the `top_k` nearest neighbors to the query vector, closest
    /// first. Fails with `NotFound` if the collection does not exist.
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredHit>>;

    /// Delete a collection and all its records.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Check whether a collection exists.
    async fn has_collection(&self, name: &str) -> Result<bool>;

    /// List all collections, newest first.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>>;

    /// Number of records in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance (`1 - similarity`), the distance reported on hits.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_distance_of_zero_vector() {
        // Zero vectors (degraded batches) have no direction; they end up at
        // distance 1.0 from every query.
        let zero = vec![0.0, 0.0, 0.0];
        let q = vec![1.0, 0.0, 0.0];
        assert!((cosine_distance(&q, &zero) - 1.0).abs() < 0.001);
    }
}
