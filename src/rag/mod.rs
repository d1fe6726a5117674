//! Retrieval-augmented question answering.
//!
//! Covers everything between a built index and a final answer: reranking
//! raw nearest-neighbor candidates, assembling the prompt context, invoking
//! synthesis, and scoring confidence.

pub mod confidence;
pub mod context;
mod engine;
pub mod parse;
pub mod rerank;

pub use confidence::ConfidenceEstimator;
pub use engine::{extract_takeaways, QaEngine};
pub use rerank::Reranker;

use crate::chunking::SourceType;
use crate::vector_store::ChunkMetadata;
use serde::{Deserialize, Serialize};

/// A candidate after reranking, carrying every score component.
#[derive(Debug, Clone)]
pub struct RankedChunk {
    /// Chunk id.
    pub id: String,
    /// Chunk text content.
    pub content: String,
    /// Chunk metadata.
    pub metadata: ChunkMetadata,
    /// Vector similarity from the retrieval pass.
    pub similarity: f32,
    /// Fraction of distinct query terms found in the chunk.
    pub keyword_overlap: f32,
    /// Final relevance after blending and source-type boost.
    pub final_score: f32,
}

/// A cited source on a query result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Chunk id.
    pub chunk_id: String,
    /// Chunk text content.
    pub content: String,
    /// Origin category.
    pub source_type: SourceType,
    /// Section title, if the chunk came from notes.
    pub section_title: Option<String>,
    /// Timestamp string.
    pub timestamp: String,
    /// Final relevance score at query time. Transient: never persisted on
    /// the chunk itself.
    pub relevance_score: f32,
}

impl From<&RankedChunk> for SourceRef {
    fn from(chunk: &RankedChunk) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            content: chunk.content.clone(),
            source_type: chunk.metadata.source_type,
            section_title: chunk.metadata.section_title.clone(),
            timestamp: chunk.metadata.timestamp.clone(),
            relevance_score: chunk.final_score,
        }
    }
}

/// The result of asking one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The generated answer.
    pub answer: String,
    /// Cited sources in rank order.
    pub sources: Vec<SourceRef>,
    /// Suggested follow-up questions.
    pub follow_up_questions: Vec<String>,
    /// Whether the follow-ups came from the lenient fallback parser
    /// (best-effort) rather than a clean structured response.
    pub follow_ups_recovered: bool,
    /// Heuristic reliability score in [0, 1]. Not a calibrated probability.
    pub confidence: f32,
}

impl QueryResult {
    /// The explicit no-relevant-content state: a successful query that found
    /// nothing to cite. Distinct from a failed query, which returns an error.
    pub fn empty(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            sources: Vec::new(),
            follow_up_questions: Vec::new(),
            follow_ups_recovered: false,
            confidence: 0.0,
        }
    }
}
