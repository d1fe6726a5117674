//! The question-answering engine.

use super::confidence::ConfidenceEstimator;
use super::context::assemble_context;
use super::parse::{self, Parsed};
use super::rerank::Reranker;
use super::{QueryResult, RankedChunk, SourceRef};
use crate::config::{Prompts, RetrievalSettings, Settings, SynthesisSettings};
use crate::error::{Result, VitenError};
use crate::index::EmbeddingIndex;
use crate::synthesis::Synthesizer;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Answer returned when retrieval comes back empty.
const NO_RELEVANT_CONTENT: &str =
    "I couldn't find relevant content to answer this question.";

/// Number of top sources fed to follow-up generation.
const FOLLOW_UP_SOURCES: usize = 3;
const FOLLOW_UP_TEMPERATURE: f32 = 0.4;
const FOLLOW_UP_MAX_TOKENS: u32 = 300;

const TAKEAWAY_TEMPERATURE: f32 = 0.3;
const TAKEAWAY_MAX_TOKENS: u32 = 800;

/// Runs the full retrieve-rerank-synthesize pipeline over one index.
pub struct QaEngine {
    index: EmbeddingIndex,
    synthesizer: Arc<dyn Synthesizer>,
    reranker: Reranker,
    confidence: ConfidenceEstimator,
    prompts: Prompts,
    retrieval: RetrievalSettings,
    synthesis: SynthesisSettings,
}

impl QaEngine {
    pub fn new(
        index: EmbeddingIndex,
        synthesizer: Arc<dyn Synthesizer>,
        prompts: Prompts,
        settings: &Settings,
    ) -> Self {
        Self {
            index,
            synthesizer,
            reranker: Reranker::new(&settings.retrieval),
            confidence: ConfidenceEstimator::new(&settings.confidence),
            prompts,
            retrieval: settings.retrieval.clone(),
            synthesis: settings.synthesis.clone(),
        }
    }

    /// The collection this engine answers from.
    pub fn collection(&self) -> &str {
        self.index.collection()
    }

    /// Answer a question from the indexed content.
    ///
    /// Retrieval finding nothing is a valid outcome and returns an empty
    /// result rather than an error. A synthesis failure for the main answer
    /// is an error; a synthesis failure for follow-up suggestions only
    /// degrades the result.
    #[instrument(skip(self))]
    pub async fn ask(&self, question: &str) -> Result<QueryResult> {
        if question.trim().is_empty() {
            return Err(VitenError::InvalidInput("Question is empty".to_string()));
        }

        let candidates = self.index.query(question, self.retrieval.max_sources).await?;
        let ranked = self
            .reranker
            .rerank(question, candidates, self.retrieval.max_sources);

        if ranked.is_empty() {
            debug!("no candidates survived reranking");
            return Ok(QueryResult::empty(NO_RELEVANT_CONTENT));
        }

        let context = assemble_context(&ranked);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context);
        let user_prompt = self.prompts.render_with_custom(&self.prompts.qa.user, &vars);

        let answer = self
            .synthesizer
            .complete(
                &self.prompts.qa.system,
                &user_prompt,
                self.synthesis.temperature,
                self.synthesis.max_tokens,
            )
            .await?;

        let follow_ups = self.follow_up_questions(question, &answer, &ranked).await;
        let confidence = self.confidence.estimate(&answer, &ranked);
        let sources: Vec<SourceRef> = ranked.iter().map(SourceRef::from).collect();

        Ok(QueryResult {
            answer,
            sources,
            follow_up_questions: follow_ups.value,
            follow_ups_recovered: follow_ups.recovered,
            confidence,
        })
    }

    /// Suggest follow-up questions for an answered question.
    ///
    /// The answer already succeeded by the time this runs, so a provider
    /// failure here degrades to no suggestions instead of failing the query.
    async fn follow_up_questions(
        &self,
        question: &str,
        answer: &str,
        ranked: &[RankedChunk],
    ) -> Parsed<Vec<String>> {
        let top = &ranked[..ranked.len().min(FOLLOW_UP_SOURCES)];

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("answer".to_string(), answer.to_string());
        vars.insert("context".to_string(), assemble_context(top));
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.follow_up.user, &vars);

        match self
            .synthesizer
            .complete("", &prompt, FOLLOW_UP_TEMPERATURE, FOLLOW_UP_MAX_TOKENS)
            .await
        {
            Ok(raw) => parse::parse_questions(&raw),
            Err(e) => {
                warn!("Follow-up generation failed: {}", e);
                Parsed {
                    value: Vec::new(),
                    recovered: true,
                }
            }
        }
    }

    /// Retrieve and rerank without synthesizing an answer.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<RankedChunk>> {
        if query.trim().is_empty() {
            return Err(VitenError::InvalidInput("Query is empty".to_string()));
        }

        let candidates = self.index.query(query, k).await?;
        Ok(self.reranker.rerank(query, candidates, k))
    }

    /// Number of chunks in the underlying collection.
    pub async fn chunk_count(&self) -> Result<usize> {
        self.index.count().await
    }
}

/// Extract key takeaways from a full transcript text.
///
/// Works straight off the transcript, so it needs no index.
#[instrument(skip(synthesizer, prompts, transcript))]
pub async fn extract_takeaways(
    synthesizer: &dyn Synthesizer,
    prompts: &Prompts,
    transcript: &str,
) -> Result<Parsed<Vec<String>>> {
    if transcript.trim().is_empty() {
        return Err(VitenError::InvalidInput("Transcript is empty".to_string()));
    }

    let mut vars = HashMap::new();
    vars.insert("transcript".to_string(), transcript.to_string());
    let prompt = prompts.render_with_custom(&prompts.takeaways.user, &vars);

    let raw = synthesizer
        .complete("", &prompt, TAKEAWAY_TEMPERATURE, TAKEAWAY_MAX_TOKENS)
        .await?;

    Ok(parse::parse_takeaways(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::SourceType;
    use crate::index::tests::{chunk, StubEmbedder};
    use crate::vector_store::MemoryVectorStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted synthesizer: first call answers, second call suggests
    /// follow-ups. Configurable per test.
    struct StubSynthesizer {
        responses: Mutex<Vec<Result<String>>>,
    }

    impl StubSynthesizer {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl Synthesizer for StubSynthesizer {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(String::new());
            }
            responses.remove(0)
        }
    }

    async fn engine_with(responses: Vec<Result<String>>) -> QaEngine {
        let store = Arc::new(MemoryVectorStore::new());
        let index = EmbeddingIndex::create(store, Arc::new(StubEmbedder), "kb_test")
            .await
            .unwrap();
        index
            .add_batch(&[
                chunk("transcript_0", "We discuss AI today", SourceType::TranscriptSegment),
                chunk("keypoint_1", "AI is transformative", SourceType::KeyPoint),
                chunk("notes_2", "Unrelated budget planning", SourceType::NotesSection),
            ])
            .await
            .unwrap();

        QaEngine::new(
            index,
            Arc::new(StubSynthesizer::new(responses)),
            Prompts::default(),
            &Settings::default(),
        )
    }

    #[tokio::test]
    async fn test_ask_returns_answer_with_sources() {
        let engine = engine_with(vec![
            Ok("AI is discussed as a transformative technology.".to_string()),
            Ok(r#"["What makes AI transformative?", "How is AI applied?"]"#.to_string()),
        ])
        .await;

        let result = engine.ask("What about AI?").await.unwrap();

        assert_eq!(result.answer, "AI is discussed as a transformative technology.");
        assert!(!result.sources.is_empty());
        assert!(result.sources.len() <= 3);
        assert_eq!(result.follow_up_questions.len(), 2);
        assert!(!result.follow_ups_recovered);
        assert!(result.confidence > 0.0 && result.confidence <= 1.0);
    }

    #[tokio::test]
    async fn test_empty_question_rejected() {
        let engine = engine_with(vec![]).await;
        let err = engine.ask("   ").await.unwrap_err();
        assert!(matches!(err, VitenError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_follow_up_failure_degrades() {
        let engine = engine_with(vec![
            Ok("An answer.".to_string()),
            Err(VitenError::Provider("rate limited".to_string())),
        ])
        .await;

        let result = engine.ask("What about AI?").await.unwrap();

        assert_eq!(result.answer, "An answer.");
        assert!(result.follow_up_questions.is_empty());
        assert!(result.follow_ups_recovered);
    }

    #[tokio::test]
    async fn test_answer_failure_propagates() {
        let engine = engine_with(vec![Err(VitenError::Provider(
            "backend down".to_string(),
        ))])
        .await;

        let err = engine.ask("What about AI?").await.unwrap_err();
        assert!(matches!(err, VitenError::Provider(_)));
    }

    #[tokio::test]
    async fn test_search_ranks_key_point_first() {
        let engine = engine_with(vec![]).await;

        let hits = engine.search("tell me about AI", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        // Both AI chunks match equally on the stub embedding; the key-point
        // boost decides the order.
        assert_eq!(hits[0].id, "keypoint_1");
    }

    #[tokio::test]
    async fn test_extract_takeaways() {
        let synthesizer = StubSynthesizer::new(vec![Ok(
            r#"["Learn the basics first", "Iterate quickly on feedback"]"#.to_string(),
        )]);

        let parsed = extract_takeaways(&synthesizer, &Prompts::default(), "A talk on learning.")
            .await
            .unwrap();
        assert!(!parsed.recovered);
        assert_eq!(parsed.value.len(), 2);

        let err = extract_takeaways(&synthesizer, &Prompts::default(), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, VitenError::InvalidInput(_)));
    }
}
