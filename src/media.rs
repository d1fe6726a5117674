//! Upstream input types for Viten.
//!
//! Transcripts and notes are produced outside this crate (by a transcription
//! service and a notes generator); Viten only consumes them. Timestamps are
//! carried as `MM:SS` or `HH:MM:SS` strings, matching what those producers
//! emit.

use crate::error::{Result, VitenError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A complete transcript with ordered segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Individual transcript segments, in playback order.
    pub segments: Vec<TranscriptSegment>,
}

/// A single segment of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start timestamp (e.g., "02:34").
    pub start: String,
    /// End timestamp.
    pub end: String,
    /// Transcribed text content.
    pub text: String,
    /// Speaker label, if diarization was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// Structured notes derived from a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notes {
    /// Note sections, in document order.
    pub sections: Vec<NotesSection>,
}

/// One section of the structured notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesSection {
    /// Section title.
    pub title: String,
    /// Timestamp the section refers back to.
    #[serde(default)]
    pub timestamp: String,
    /// Main section content.
    #[serde(default)]
    pub content: String,
    /// Extracted key points.
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Extracted direct quotes.
    #[serde(default)]
    pub quotes: Vec<String>,
}

impl Transcript {
    /// Create a transcript from segments.
    pub fn new(segments: Vec<TranscriptSegment>) -> Self {
        Self { segments }
    }

    /// Load a transcript from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let transcript: Transcript = serde_json::from_str(&content)
            .map_err(|e| VitenError::Parse(format!("{}: {}", path.display(), e)))?;
        transcript.validate()?;
        Ok(transcript)
    }

    /// Validate that every segment carries text.
    pub fn validate(&self) -> Result<()> {
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.text.trim().is_empty() {
                return Err(VitenError::InvalidInput(format!(
                    "Transcript segment {} has no text",
                    i
                )));
            }
        }
        Ok(())
    }

    /// Full transcript text with timestamps, one segment per line.
    pub fn format_with_timestamps(&self) -> String {
        self.segments
            .iter()
            .map(|s| match &s.speaker {
                Some(speaker) => format!("[{}] {}: {}", s.start, speaker, s.text),
                None => format!("[{}] {}", s.start, s.text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start: &str, end: &str, text: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            text: text.to_string(),
            speaker: None,
        }
    }
}

impl Notes {
    /// Create notes from sections.
    pub fn new(sections: Vec<NotesSection>) -> Self {
        Self { sections }
    }

    /// Notes with no sections, for transcript-only builds.
    pub fn empty() -> Self {
        Self { sections: Vec::new() }
    }

    /// Load notes from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let notes: Notes = serde_json::from_str(&content)
            .map_err(|e| VitenError::Parse(format!("{}: {}", path.display(), e)))?;
        notes.validate()?;
        Ok(notes)
    }

    /// Validate that every section has a title.
    pub fn validate(&self) -> Result<()> {
        for (i, section) in self.sections.iter().enumerate() {
            if section.title.trim().is_empty() {
                return Err(VitenError::InvalidInput(format!(
                    "Notes section {} has no title",
                    i
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_validation() {
        let good = Transcript::new(vec![TranscriptSegment::new("00:00", "00:05", "Hello")]);
        assert!(good.validate().is_ok());

        let bad = Transcript::new(vec![TranscriptSegment::new("00:00", "00:05", "   ")]);
        assert!(matches!(
            bad.validate(),
            Err(VitenError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_notes_validation() {
        let bad = Notes::new(vec![NotesSection {
            title: String::new(),
            timestamp: "00:00".to_string(),
            content: "content".to_string(),
            key_points: vec![],
            quotes: vec![],
        }]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_format_with_timestamps() {
        let mut segment = TranscriptSegment::new("01:05", "01:10", "We discuss AI");
        segment.speaker = Some("Host".to_string());
        let transcript = Transcript::new(vec![segment]);

        assert_eq!(transcript.format_with_timestamps(), "[01:05] Host: We discuss AI");
    }

    #[test]
    fn test_notes_deserialize_defaults() {
        let json = r#"{"sections": [{"title": "Intro"}]}"#;
        let notes: Notes = serde_json::from_str(json).unwrap();
        assert_eq!(notes.sections[0].timestamp, "");
        assert!(notes.sections[0].key_points.is_empty());
    }
}
