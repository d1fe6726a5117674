//! Context assembly for answer synthesis.

use super::RankedChunk;

/// Serialize top-ranked chunks into one prompt context block.
///
/// Each entry gets a labeled header ("Source i", plus section title and
/// bracketed timestamp when available) followed by the chunk content;
/// entries are separated by a blank line. This block, with the question and
/// the instruction prompt, is the exact input handed to the synthesizer.
pub fn assemble_context(chunks: &[RankedChunk]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut header = format!("Source {}", i + 1);
            if let Some(title) = &chunk.metadata.section_title {
                header.push_str(&format!(" - {}", title));
            }
            if !chunk.metadata.timestamp.is_empty() {
                header.push_str(&format!(" [{}]", chunk.metadata.timestamp));
            }
            format!("{}:\n{}\n", header, chunk.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::SourceType;
    use crate::vector_store::ChunkMetadata;

    fn ranked(content: &str, section_title: Option<&str>, timestamp: &str) -> RankedChunk {
        RankedChunk {
            id: "test_0".to_string(),
            content: content.to_string(),
            metadata: ChunkMetadata {
                source_type: SourceType::NotesSection,
                section_title: section_title.map(|s| s.to_string()),
                timestamp: timestamp.to_string(),
                speaker: None,
            },
            similarity: 0.9,
            keyword_overlap: 0.5,
            final_score: 0.78,
        }
    }

    #[test]
    fn test_assemble_with_title_and_timestamp() {
        let chunks = vec![
            ranked("First content", Some("Intro"), "00:30"),
            ranked("Second content", None, ""),
        ];

        let context = assemble_context(&chunks);

        assert_eq!(
            context,
            "Source 1 - Intro [00:30]:\nFirst content\n\nSource 2:\nSecond content\n"
        );
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(assemble_context(&[]), "");
    }
}
