//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine distance computed in Rust for simplicity.
//! For production use cases with large datasets, consider using sqlite-vec
//! extension or a dedicated vector database.

use super::{cosine_distance, ChunkMetadata, CollectionInfo, ScoredHit, VectorRecord, VectorStore};
use crate::error::{Result, VitenError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    content TEXT NOT NULL,
    metadata_json TEXT NOT NULL,
    embedding BLOB NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| VitenError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn collection_exists(conn: &Connection, name: &str) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM collections WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;

        if Self::collection_exists(&conn, name)? {
            return Err(VitenError::AlreadyExists(name.to_string()));
        }

        conn.execute(
            "INSERT INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, Utc::now().to_rfc3339()],
        )?;

        info!("Created collection {}", name);
        Ok(())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn add_vectors(&self, collection: &str, records: &[VectorRecord]) -> Result<usize> {
        let conn = self.lock()?;

        if !Self::collection_exists(&conn, collection)? {
            return Err(VitenError::NotFound(format!("Collection '{}'", collection)));
        }

        let base_position: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;

        // One transaction per batch: either every record lands or none do.
        let tx = conn.unchecked_transaction()?;

        for (i, record) in records.iter().enumerate() {
            let metadata_json = serde_json::to_string(&record.metadata)?;
            let embedding_bytes = Self::embedding_to_bytes(&record.embedding);

            tx.execute(
                r#"
                INSERT INTO chunks (collection, id, content, metadata_json, embedding, position)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    collection,
                    record.id,
                    record.content,
                    metadata_json,
                    embedding_bytes,
                    base_position + i as i64,
                ],
            )?;
        }

        tx.commit()?;
        debug!("Appended {} records to {}", records.len(), collection);
        Ok(records.len())
    }

    #[instrument(skip(self, embedding))]
    async fn query(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredHit>> {
        let conn = self.lock()?;

        if !Self::collection_exists(&conn, collection)? {
            return Err(VitenError::NotFound(format!("Collection '{}'", collection)));
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT id, content, metadata_json, embedding
            FROM chunks
            WHERE collection = ?1
            ORDER BY position
            "#,
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let id: String = row.get(0)?;
            let content: String = row.get(1)?;
            let metadata_json: String = row.get(2)?;
            let embedding_bytes: Vec<u8> = row.get(3)?;
            Ok((id, content, metadata_json, embedding_bytes))
        })?;

        let mut hits: Vec<ScoredHit> = Vec::new();
        for row in rows {
            let (id, content, metadata_json, embedding_bytes) = row?;
            let metadata: ChunkMetadata = serde_json::from_str(&metadata_json)?;
            let stored = Self::bytes_to_embedding(&embedding_bytes);
            hits.push(ScoredHit {
                id,
                content,
                metadata,
                distance: cosine_distance(embedding, &stored),
            });
        }

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);

        debug!("Found {} hits in {}", hits.len(), collection);
        Ok(hits)
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;

        if !Self::collection_exists(&conn, name)? {
            return Err(VitenError::NotFound(format!("Collection '{}'", name)));
        }

        conn.execute("DELETE FROM chunks WHERE collection = ?1", params![name])?;
        conn.execute("DELETE FROM collections WHERE name = ?1", params![name])?;

        info!("Deleted collection {}", name);
        Ok(())
    }

    async fn has_collection(&self, name: &str) -> Result<bool> {
        let conn = self.lock()?;
        Self::collection_exists(&conn, name)
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT c.name, c.created_at, COUNT(k.id) AS chunk_count
            FROM collections c
            LEFT JOIN chunks k ON k.collection = c.name
            GROUP BY c.name
            ORDER BY c.created_at DESC
            "#,
        )?;

        let infos = stmt.query_map([], |row| {
            let name: String = row.get(0)?;
            let created_at_str: String = row.get(1)?;
            let chunk_count: i64 = row.get(2)?;
            Ok((name, created_at_str, chunk_count))
        })?;

        let mut result = Vec::new();
        for info in infos {
            let (name, created_at_str, chunk_count) = info?;
            result.push(CollectionInfo {
                name,
                chunk_count: chunk_count as usize,
                created_at: DateTime::parse_from_rfc3339(&created_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            });
        }

        Ok(result)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;

        if !Self::collection_exists(&conn, collection)? {
            return Err(VitenError::NotFound(format!("Collection '{}'", collection)));
        }

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
