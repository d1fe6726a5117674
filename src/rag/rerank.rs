//! Candidate reranking.
//!
//! Pure vector similarity under-weights exact terminology matches and treats
//! hand-extracted key points and quotes the same as raw transcript prose.
//! The reranker blends similarity with lexical overlap and boosts denser
//! source types, then truncates the over-fetched candidate list to `k`.

use super::RankedChunk;
use crate::chunking::SourceType;
use crate::config::RetrievalSettings;
use crate::index::RetrievedChunk;
use regex::Regex;
use std::collections::HashSet;

/// Reranks retrieval candidates against the question.
pub struct Reranker {
    similarity_weight: f32,
    keyword_weight: f32,
    key_point_boost: f32,
    quote_boost: f32,
    word_pattern: Regex,
}

impl Reranker {
    /// Create a reranker from retrieval settings.
    pub fn new(settings: &RetrievalSettings) -> Self {
        Self {
            similarity_weight: settings.similarity_weight,
            keyword_weight: settings.keyword_weight,
            key_point_boost: settings.key_point_boost,
            quote_boost: settings.quote_boost,
            word_pattern: Regex::new(r"\b\w+\b").expect("static regex"),
        }
    }

    /// Rescore candidates and return the top `k`, best first.
    ///
    /// The sort is stable, so candidates with equal final scores keep their
    /// vector-rank order. Repeated runs over identical input produce
    /// identical output.
    pub fn rerank(
        &self,
        question: &str,
        candidates: Vec<RetrievedChunk>,
        k: usize,
    ) -> Vec<RankedChunk> {
        let query_terms = self.terms(question);

        let mut ranked: Vec<RankedChunk> = candidates
            .into_iter()
            .map(|candidate| {
                let keyword_overlap = if query_terms.is_empty() {
                    0.0
                } else {
                    let chunk_terms = self.terms(&candidate.content);
                    query_terms.intersection(&chunk_terms).count() as f32
                        / query_terms.len() as f32
                };

                let combined = candidate.similarity * self.similarity_weight
                    + keyword_overlap * self.keyword_weight;
                let final_score = combined * self.boost(candidate.metadata.source_type);

                RankedChunk {
                    id: candidate.id,
                    content: candidate.content,
                    metadata: candidate.metadata,
                    similarity: candidate.similarity,
                    keyword_overlap,
                    final_score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(k);

        ranked
    }

    fn boost(&self, source_type: SourceType) -> f32 {
        match source_type {
            SourceType::KeyPoint => self.key_point_boost,
            SourceType::Quote => self.quote_boost,
            _ => 1.0,
        }
    }

    /// Distinct case-insensitive word tokens.
    fn terms(&self, text: &str) -> HashSet<String> {
        let lower = text.to_lowercase();
        self.word_pattern
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::ChunkMetadata;

    fn candidate(id: &str, content: &str, source_type: SourceType, similarity: f32) -> RetrievedChunk {
        RetrievedChunk {
            id: id.to_string(),
            content: content.to_string(),
            metadata: ChunkMetadata {
                source_type,
                section_title: None,
                timestamp: "00:00".to_string(),
                speaker: None,
            },
            similarity,
        }
    }

    fn reranker() -> Reranker {
        Reranker::new(&RetrievalSettings::default())
    }

    #[test]
    fn test_key_point_boost_wins_at_comparable_similarity() {
        let candidates = vec![
            candidate(
                "transcript_0",
                "We discuss AI and machine learning today",
                SourceType::TranscriptSegment,
                0.8,
            ),
            candidate("keypoint_1", "AI is the key point", SourceType::KeyPoint, 0.8),
        ];

        let ranked = reranker().rerank("What is discussed about AI?", candidates, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "keypoint_1");
        assert!(ranked[0].final_score > ranked[1].final_score);
    }

    #[test]
    fn test_keyword_overlap_fraction() {
        let candidates = vec![candidate(
            "transcript_0",
            "machine learning is discussed",
            SourceType::TranscriptSegment,
            0.5,
        )];

        // Distinct query terms: what, is, machine, learning -> 3 of 4 present.
        let ranked = reranker().rerank("what is machine learning", candidates, 1);
        assert!((ranked[0].keyword_overlap - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_empty_query_has_zero_overlap() {
        let candidates = vec![candidate(
            "transcript_0",
            "some content",
            SourceType::TranscriptSegment,
            0.5,
        )];

        let ranked = reranker().rerank("???", candidates, 1);
        assert_eq!(ranked[0].keyword_overlap, 0.0);
        assert!((ranked[0].final_score - 0.5 * 0.7).abs() < 0.001);
    }

    #[test]
    fn test_stable_order_on_ties() {
        let candidates = vec![
            candidate("transcript_0", "alpha", SourceType::TranscriptSegment, 0.6),
            candidate("transcript_1", "beta", SourceType::TranscriptSegment, 0.6),
            candidate("transcript_2", "gamma", SourceType::TranscriptSegment, 0.6),
        ];

        let ranked = reranker().rerank("unrelated query words", candidates, 3);
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["transcript_0", "transcript_1", "transcript_2"]);
    }

    #[test]
    fn test_truncates_to_k() {
        let candidates: Vec<RetrievedChunk> = (0..6)
            .map(|i| {
                candidate(
                    &format!("transcript_{}", i),
                    "content",
                    SourceType::TranscriptSegment,
                    1.0 - i as f32 * 0.1,
                )
            })
            .collect();

        let ranked = reranker().rerank("content", candidates, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].id, "transcript_0");
    }

    #[test]
    fn test_rerank_is_deterministic() {
        let make = || {
            vec![
                candidate("quote_0", "a quote about AI", SourceType::Quote, 0.7),
                candidate("transcript_1", "AI chat", SourceType::TranscriptSegment, 0.75),
                candidate("keypoint_2", "AI key point", SourceType::KeyPoint, 0.65),
            ]
        };

        let r = reranker();
        let first: Vec<String> = r
            .rerank("tell me about AI", make(), 3)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let second: Vec<String> = r
            .rerank("tell me about AI", make(), 3)
            .into_iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(first, second);
    }
}
