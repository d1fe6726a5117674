//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_distance, CollectionInfo, ScoredHit, VectorRecord, VectorStore};
use crate::error::{Result, VitenError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

struct Collection {
    created_at: DateTime<Utc>,
    records: Vec<VectorRecord>,
}

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        if collections.contains_key(name) {
            return Err(VitenError::AlreadyExists(name.to_string()));
        }
        collections.insert(
            name.to_string(),
            Collection {
                created_at: Utc::now(),
                records: Vec::new(),
            },
        );
        Ok(())
    }

    async fn add_vectors(&self, collection: &str, records: &[VectorRecord]) -> Result<usize> {
        let mut collections = self.collections.write().unwrap();
        let entry = collections
            .get_mut(collection)
            .ok_or_else(|| VitenError::NotFound(format!("Collection '{}'", collection)))?;
        entry.records.extend_from_slice(records);
        Ok(records.len())
    }

    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredHit>> {
        let collections = self.collections.read().unwrap();
        let entry = collections
            .get(collection)
            .ok_or_else(|| VitenError::NotFound(format!("Collection '{}'", collection)))?;

        let mut hits: Vec<ScoredHit> = entry
            .records
            .iter()
            .map(|record| ScoredHit {
                id: record.id.clone(),
                content: record.content.clone(),
                metadata: record.metadata.clone(),
                distance: cosine_distance(embedding, &record.embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);

        Ok(hits)
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        collections
            .remove(name)
            .ok_or_else(|| VitenError::NotFound(format!("Collection '{}'", name)))?;
        Ok(())
    }

    async fn has_collection(&self, name: &str) -> Result<bool> {
        let collections = self.collections.read().unwrap();
        Ok(collections.contains_key(name))
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let collections = self.collections.read().unwrap();

        let mut infos: Vec<CollectionInfo> = collections
            .iter()
            .map(|(name, c)| CollectionInfo {
                name: name.clone(),
                chunk_count: c.records.len(),
                created_at: c.created_at,
            })
            .collect();

        infos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(infos)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().unwrap();
        let entry = collections
            .get(collection)
            .ok_or_else(|| VitenError::NotFound(format!("Collection '{}'", collection)))?;
        Ok(entry.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::SourceType;
    use crate::vector_store::ChunkMetadata;

    fn record(id: &str, content: &str, embedding: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            content: content.to_string(),
            metadata: ChunkMetadata {
                source_type: SourceType::TranscriptSegment,
                section_title: None,
                timestamp: "00:00".to_string(),
                speaker: None,
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        store.create_collection("kb_test").await.unwrap();
        store
            .add_vectors(
                "kb_test",
                &[
                    record("transcript_0", "Hello world", vec![1.0, 0.0, 0.0]),
                    record("transcript_1", "Goodbye world", vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.count("kb_test").await.unwrap(), 2);

        let hits = store.query("kb_test", &[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "transcript_0");
        assert!(hits[0].distance < hits[1].distance);
    }

    #[tokio::test]
    async fn test_create_collision_fails() {
        let store = MemoryVectorStore::new();
        store.create_collection("kb_test").await.unwrap();

        let err = store.create_collection("kb_test").await.unwrap_err();
        assert!(matches!(err, VitenError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_query_missing_collection_is_not_found() {
        let store = MemoryVectorStore::new();
        let err = store.query("missing", &[1.0], 5).await.unwrap_err();
        assert!(matches!(err, VitenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let store = MemoryVectorStore::new();
        store.create_collection("kb_test").await.unwrap();
        store.delete_collection("kb_test").await.unwrap();

        assert!(!store.has_collection("kb_test").await.unwrap());
        let err = store.query("kb_test", &[1.0], 5).await.unwrap_err();
        assert!(matches!(err, VitenError::NotFound(_)));
    }
}
