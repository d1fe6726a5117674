//! The knowledge base facade.
//!
//! Ties the pipeline together: chunking, indexing into a named collection,
//! and question answering over whichever collection is current. Each build
//! writes a fresh collection and swaps the current-collection handle only
//! after the build succeeds, so readers always see a complete collection.

use crate::chunking::ChunkBuilder;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, VitenError};
use crate::index::EmbeddingIndex;
use crate::media::{Notes, Transcript};
use crate::rag::parse::Parsed;
use crate::rag::{QaEngine, QueryResult, RankedChunk};
use crate::synthesis::{OpenAISynthesizer, Synthesizer};
use crate::vector_store::{CollectionInfo, MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Prefix for build collections.
const COLLECTION_PREFIX: &str = "kb_";

/// Statistics for the collection queries run against.
#[derive(Debug, Clone)]
pub struct CollectionStats {
    /// Collection name.
    pub collection: String,
    /// Number of chunks stored.
    pub chunk_count: usize,
    /// Embedding model the knowledge base is configured with.
    pub embedding_model: String,
}

/// Outcome of one build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Name of the collection that was created.
    pub collection: String,
    /// Number of chunks indexed into it.
    pub chunks_indexed: usize,
    /// Number of embedding batches that degraded to zero vectors.
    pub degraded_batches: usize,
}

/// A queryable knowledge base over transcripts and notes.
pub struct KnowledgeBase {
    settings: Settings,
    prompts: Prompts,
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    synthesizer: Arc<dyn Synthesizer>,
    current: RwLock<Option<String>>,
}

impl KnowledgeBase {
    /// Create a knowledge base from settings, wiring up the configured
    /// providers.
    pub fn new(settings: Settings) -> Result<Self> {
        let store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
            "memory" => Arc::new(MemoryVectorStore::new()),
            "sqlite" => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
            other => {
                return Err(VitenError::Config(format!(
                    "Unknown vector store provider: {}",
                    other
                )))
            }
        };

        let embedder = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
            Duration::from_secs(settings.embedding.timeout_seconds),
        ));
        let synthesizer = Arc::new(OpenAISynthesizer::with_timeout(
            &settings.synthesis.model,
            Duration::from_secs(settings.synthesis.timeout_seconds),
        ));

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self {
            settings,
            prompts,
            store,
            embedder,
            synthesizer,
            current: RwLock::new(None),
        })
    }

    /// Create a knowledge base from explicit components. Used by tests and
    /// by callers that bring their own providers.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            settings,
            prompts,
            store,
            embedder,
            synthesizer,
            current: RwLock::new(None),
        }
    }

    /// Build a new collection from a transcript and notes, with a
    /// timestamp-derived build id.
    pub async fn build(&self, transcript: &Transcript, notes: &Notes) -> Result<BuildResult> {
        let id = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        self.build_with_id(&id, transcript, notes).await
    }

    /// Build a new collection from a transcript and notes.
    ///
    /// The current-collection handle is swapped only after the collection is
    /// fully written. A failed build cleans up its partial collection and
    /// leaves the previous one current.
    #[instrument(skip(self, transcript, notes))]
    pub async fn build_with_id(
        &self,
        id: &str,
        transcript: &Transcript,
        notes: &Notes,
    ) -> Result<BuildResult> {
        transcript.validate()?;
        notes.validate()?;

        let builder = ChunkBuilder::with_max_chunk_size(self.settings.chunking.max_chunk_size);
        let chunks = builder.build(transcript, notes);
        if chunks.is_empty() {
            return Err(VitenError::InvalidInput(
                "No content to index: transcript and notes are empty".to_string(),
            ));
        }

        let collection = format!("{}{}", COLLECTION_PREFIX, id);
        let index = EmbeddingIndex::create(
            self.store.clone(),
            self.embedder.clone(),
            &collection,
        )
        .await?
        .with_batch_size(self.settings.embedding.max_batch_size);

        let report = match index.add_batch(&chunks).await {
            Ok(report) => report,
            Err(e) => {
                // Leave no partial collection behind.
                if let Err(cleanup) = self.store.delete_collection(&collection).await {
                    warn!("Failed to clean up partial collection: {}", cleanup);
                }
                return Err(e);
            }
        };

        *self.current.write().await = Some(collection.clone());
        info!(
            "Built collection {} with {} chunks",
            collection, report.chunks_stored
        );

        Ok(BuildResult {
            collection,
            chunks_indexed: report.chunks_stored,
            degraded_batches: report.degraded_batches.len(),
        })
    }

    /// The collection queries currently run against.
    pub async fn current_collection(&self) -> Option<String> {
        self.current.read().await.clone()
    }

    /// Point queries at an existing collection.
    pub async fn use_collection(&self, name: &str) -> Result<()> {
        if !self.store.has_collection(name).await? {
            return Err(VitenError::NotFound(format!("Collection '{}'", name)));
        }
        *self.current.write().await = Some(name.to_string());
        Ok(())
    }

    /// Resolve the collection to query: the current one, else the newest on
    /// record.
    pub async fn resolve_collection(&self) -> Result<String> {
        if let Some(name) = self.current.read().await.clone() {
            return Ok(name);
        }

        let collections = self.store.list_collections().await?;
        collections
            .into_iter()
            .next()
            .map(|c| c.name)
            .ok_or_else(|| {
                VitenError::NotFound("No knowledge base has been built yet".to_string())
            })
    }

    async fn engine(&self) -> Result<QaEngine> {
        let collection = self.resolve_collection().await?;
        let index = EmbeddingIndex::open(self.store.clone(), self.embedder.clone(), &collection)
            .await?;
        Ok(QaEngine::new(
            index,
            self.synthesizer.clone(),
            self.prompts.clone(),
            &self.settings,
        ))
    }

    /// Answer a question against the current collection.
    pub async fn ask(&self, question: &str) -> Result<QueryResult> {
        self.engine().await?.ask(question).await
    }

    /// Retrieve and rerank matching chunks without synthesizing an answer.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RankedChunk>> {
        self.engine().await?.search(query, k).await
    }

    /// Extract key takeaways from a transcript.
    pub async fn takeaways(&self, transcript: &Transcript) -> Result<Parsed<Vec<String>>> {
        crate::rag::extract_takeaways(
            self.synthesizer.as_ref(),
            &self.prompts,
            &transcript.format_with_timestamps(),
        )
        .await
    }

    /// Delete a collection. Clears the current handle if it pointed there.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        self.store.delete_collection(name).await?;

        let mut current = self.current.write().await;
        if current.as_deref() == Some(name) {
            *current = None;
        }
        Ok(())
    }

    /// All built collections, newest first.
    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        self.store.list_collections().await
    }

    /// Statistics for the collection queries currently resolve to.
    pub async fn stats(&self) -> Result<CollectionStats> {
        let collection = self.resolve_collection().await?;
        let chunk_count = self.store.count(&collection).await?;
        Ok(CollectionStats {
            collection,
            chunk_count,
            embedding_model: self.settings.embedding.model.clone(),
        })
    }

    /// Settings this knowledge base was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::tests::{FailingEmbedder, StubEmbedder};
    use crate::media::{NotesSection, TranscriptSegment};
    use async_trait::async_trait;

    struct EchoSynthesizer;

    #[async_trait]
    impl Synthesizer for EchoSynthesizer {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String> {
            Ok("A synthesized answer about AI and learning.".to_string())
        }
    }

    fn transcript() -> Transcript {
        Transcript {
            segments: vec![
                TranscriptSegment {
                    start: "00:00".to_string(),
                    end: "00:30".to_string(),
                    text: "Welcome to our discussion of AI.".to_string(),
                    speaker: None,
                },
                TranscriptSegment {
                    start: "00:30".to_string(),
                    end: "01:00".to_string(),
                    text: "Machine learning changes how we build software.".to_string(),
                    speaker: Some("Host".to_string()),
                },
            ],
        }
    }

    fn notes() -> Notes {
        Notes {
            sections: vec![NotesSection {
                title: "Introduction".to_string(),
                timestamp: "00:00".to_string(),
                content: "Overview of AI topics.".to_string(),
                key_points: vec!["AI is reshaping software development".to_string()],
                quotes: vec!["Learning never stops".to_string()],
            }],
        }
    }

    fn kb(embedder: Arc<dyn Embedder>) -> KnowledgeBase {
        KnowledgeBase::with_components(
            Settings::default(),
            Prompts::default(),
            Arc::new(MemoryVectorStore::new()),
            embedder,
            Arc::new(EchoSynthesizer),
        )
    }

    #[tokio::test]
    async fn test_build_then_ask() {
        let kb = kb(Arc::new(StubEmbedder));

        let result = kb.build_with_id("1", &transcript(), &notes()).await.unwrap();
        assert_eq!(result.collection, "kb_1");
        // 2 transcript segments + 1 section + 1 key point + 1 quote.
        assert_eq!(result.chunks_indexed, 5);
        assert_eq!(result.degraded_batches, 0);
        assert_eq!(kb.current_collection().await.as_deref(), Some("kb_1"));

        let answer = kb.ask("What is said about AI?").await.unwrap();
        assert!(!answer.answer.is_empty());
        assert!(!answer.sources.is_empty());
    }

    #[tokio::test]
    async fn test_ask_without_build_is_not_found() {
        let kb = kb(Arc::new(StubEmbedder));
        let err = kb.ask("anything?").await.unwrap_err();
        assert!(matches!(err, VitenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rebuild_swaps_current_handle() {
        let kb = kb(Arc::new(StubEmbedder));

        kb.build_with_id("1", &transcript(), &notes()).await.unwrap();
        kb.build_with_id("2", &transcript(), &notes()).await.unwrap();

        assert_eq!(kb.current_collection().await.as_deref(), Some("kb_2"));
        assert_eq!(kb.list_collections().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_build_id_keeps_old_collection_current() {
        let kb = kb(Arc::new(StubEmbedder));

        kb.build_with_id("1", &transcript(), &notes()).await.unwrap();
        let err = kb.build_with_id("1", &transcript(), &notes()).await.unwrap_err();

        assert!(matches!(err, VitenError::AlreadyExists(_)));
        assert_eq!(kb.current_collection().await.as_deref(), Some("kb_1"));
    }

    #[tokio::test]
    async fn test_degraded_build_still_succeeds() {
        let kb = kb(Arc::new(FailingEmbedder));

        let result = kb.build_with_id("1", &transcript(), &notes()).await.unwrap();
        assert_eq!(result.chunks_indexed, 5);
        assert_eq!(result.degraded_batches, 1);
    }

    #[tokio::test]
    async fn test_empty_build_rejected() {
        let kb = kb(Arc::new(StubEmbedder));
        let empty_transcript = Transcript { segments: vec![] };
        let empty_notes = Notes { sections: vec![] };

        let err = kb
            .build_with_id("1", &empty_transcript, &empty_notes)
            .await
            .unwrap_err();
        assert!(matches!(err, VitenError::InvalidInput(_)));
        assert!(kb.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_clears_current() {
        let kb = kb(Arc::new(StubEmbedder));
        kb.build_with_id("1", &transcript(), &notes()).await.unwrap();

        kb.delete_collection("kb_1").await.unwrap();

        assert!(kb.current_collection().await.is_none());
        let err = kb.ask("anything?").await.unwrap_err();
        assert!(matches!(err, VitenError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stats_follow_current_collection() {
        let kb = kb(Arc::new(StubEmbedder));
        kb.build_with_id("1", &transcript(), &notes()).await.unwrap();

        let stats = kb.stats().await.unwrap();
        assert_eq!(stats.collection, "kb_1");
        assert_eq!(stats.chunk_count, 5);
        assert_eq!(stats.embedding_model, "text-embedding-3-small");
    }

    #[tokio::test]
    async fn test_use_collection() {
        let kb = kb(Arc::new(StubEmbedder));
        kb.build_with_id("1", &transcript(), &notes()).await.unwrap();
        kb.build_with_id("2", &transcript(), &notes()).await.unwrap();

        kb.use_collection("kb_1").await.unwrap();
        assert_eq!(kb.current_collection().await.as_deref(), Some("kb_1"));

        let err = kb.use_collection("kb_missing").await.unwrap_err();
        assert!(matches!(err, VitenError::NotFound(_)));
    }
}
