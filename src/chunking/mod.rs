//! Chunk construction for the retrieval index.
//!
//! Turns transcript segments and notes sections into bounded-size retrievable
//! chunks. Oversized candidates are split on sentence boundaries; sub-chunks
//! keep `<parent>_<n>` ids so every chunk stays traceable to its origin.

use crate::media::{Notes, Transcript};
use serde::{Deserialize, Serialize};

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// Origin category of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Raw transcript segment.
    TranscriptSegment,
    /// Main content of a notes section.
    NotesSection,
    /// Hand-extracted key point.
    KeyPoint,
    /// Direct quote.
    Quote,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::TranscriptSegment => write!(f, "transcript_segment"),
            SourceType::NotesSection => write!(f, "notes_section"),
            SourceType::KeyPoint => write!(f, "key_point"),
            SourceType::Quote => write!(f, "quote"),
        }
    }
}

/// Minimal retrievable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique, stable id derived from source kind and sequence.
    pub id: String,
    /// Text content.
    pub content: String,
    /// Origin category.
    pub source_type: SourceType,
    /// Section title, when the chunk came from notes.
    pub section_title: Option<String>,
    /// Timestamp string (MM:SS or HH:MM:SS).
    pub timestamp: String,
    /// Speaker label, when the chunk came from a diarized segment.
    pub speaker: Option<String>,
}

/// Builds chunks from a transcript + notes pair.
pub struct ChunkBuilder {
    max_chunk_size: usize,
}

impl ChunkBuilder {
    /// Create a builder with the default size bound.
    pub fn new() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }

    /// Create a builder with a custom size bound.
    pub fn with_max_chunk_size(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    /// Build the ordered chunk list.
    ///
    /// Each transcript segment becomes one candidate; each notes section
    /// becomes up to three candidate families (content, key points, quotes).
    /// Candidates with empty text are dropped; candidates over the size bound
    /// are split on sentence boundaries.
    pub fn build(&self, transcript: &Transcript, notes: &Notes) -> Vec<Chunk> {
        let mut candidates = Vec::new();
        let mut seq = 0usize;

        for segment in &transcript.segments {
            if segment.text.trim().is_empty() {
                continue;
            }
            candidates.push(Chunk {
                id: format!("transcript_{}", seq),
                content: segment.text.clone(),
                source_type: SourceType::TranscriptSegment,
                section_title: None,
                timestamp: segment.start.clone(),
                speaker: segment.speaker.clone(),
            });
            seq += 1;
        }

        for section in &notes.sections {
            if !section.content.trim().is_empty() {
                candidates.push(Chunk {
                    id: format!("notes_{}", seq),
                    content: section.content.clone(),
                    source_type: SourceType::NotesSection,
                    section_title: Some(section.title.clone()),
                    timestamp: section.timestamp.clone(),
                    speaker: None,
                });
                seq += 1;
            }

            for point in &section.key_points {
                if point.trim().is_empty() {
                    continue;
                }
                candidates.push(Chunk {
                    id: format!("keypoint_{}", seq),
                    content: point.clone(),
                    source_type: SourceType::KeyPoint,
                    section_title: Some(section.title.clone()),
                    timestamp: section.timestamp.clone(),
                    speaker: None,
                });
                seq += 1;
            }

            for quote in &section.quotes {
                if quote.trim().is_empty() {
                    continue;
                }
                candidates.push(Chunk {
                    id: format!("quote_{}", seq),
                    content: quote.clone(),
                    source_type: SourceType::Quote,
                    section_title: Some(section.title.clone()),
                    timestamp: section.timestamp.clone(),
                    speaker: None,
                });
                seq += 1;
            }
        }

        // Split pass: enforce the size bound on every candidate.
        let mut chunks = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.content.len() > self.max_chunk_size {
                chunks.extend(self.split_oversized(candidate));
            } else {
                chunks.push(candidate);
            }
        }

        chunks
    }

    /// Split an oversized candidate into sentence-aligned sub-chunks.
    ///
    /// Sentences are accumulated greedily until adding the next one would
    /// exceed the bound. A single sentence over the bound is emitted whole;
    /// content is never split mid-word.
    fn split_oversized(&self, parent: Chunk) -> Vec<Chunk> {
        let sentences = split_sentences(&parent.content);

        let mut parts: Vec<String> = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            if current.is_empty() {
                current = sentence;
            } else if current.len() + 1 + sentence.len() > self.max_chunk_size {
                parts.push(std::mem::take(&mut current));
                current = sentence;
            } else {
                current.push(' ');
                current.push_str(&sentence);
            }
        }
        if !current.is_empty() {
            parts.push(current);
        }

        parts
            .into_iter()
            .enumerate()
            .map(|(i, content)| Chunk {
                id: format!("{}_{}", parent.id, i),
                content,
                source_type: parent.source_type,
                section_title: parent.section_title.clone(),
                timestamp: parent.timestamp.clone(),
                speaker: parent.speaker.clone(),
            })
            .collect()
    }
}

impl Default for ChunkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into sentences on `.`, `!`, `?`, keeping the terminators.
///
/// Keeping terminators means concatenating the sentences reconstructs the
/// source text modulo whitespace.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut in_terminator = false;

    for ch in text.chars() {
        let is_terminator = matches!(ch, '.' | '!' | '?');

        if in_terminator && !is_terminator {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
            in_terminator = false;
        }

        current.push(ch);
        if is_terminator {
            in_terminator = true;
        }
    }

    let sentence = current.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }

    sentences
}
