//! Answer confidence estimation.

use super::RankedChunk;
use crate::config::ConfidenceSettings;
use std::collections::HashSet;

/// Number of distinct source categories a build can produce.
const SOURCE_TYPE_COUNT: usize = 4;

/// Scores how well-supported an answer is by its retrieved sources.
///
/// The score blends three signals: mean relevance of the cited chunks, answer
/// length (capped at 100 words), and diversity of source types. It is a
/// heuristic in [0, 1], not a calibrated probability.
pub struct ConfidenceEstimator {
    relevance_weight: f32,
    length_weight: f32,
    diversity_weight: f32,
}

impl ConfidenceEstimator {
    pub fn new(settings: &ConfidenceSettings) -> Self {
        Self {
            relevance_weight: settings.relevance_weight,
            length_weight: settings.length_weight,
            diversity_weight: settings.diversity_weight,
        }
    }

    /// Estimate confidence for an answer produced from `sources`.
    ///
    /// Returns 0.0 when no sources were used, regardless of answer length.
    pub fn estimate(&self, answer: &str, sources: &[RankedChunk]) -> f32 {
        if sources.is_empty() {
            return 0.0;
        }

        let avg_relevance =
            sources.iter().map(|s| s.final_score).sum::<f32>() / sources.len() as f32;

        let word_count = answer.split_whitespace().count();
        let length_factor = (word_count as f32 / 100.0).min(1.0);

        let distinct_types: HashSet<_> =
            sources.iter().map(|s| s.metadata.source_type).collect();
        let diversity = distinct_types.len() as f32 / SOURCE_TYPE_COUNT as f32;

        let score = avg_relevance * self.relevance_weight
            + length_factor * self.length_weight
            + diversity * self.diversity_weight;

        score.clamp(0.0, 1.0)
    }
}
