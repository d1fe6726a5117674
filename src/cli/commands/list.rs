//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let kb = KnowledgeBase::new(settings)?;

    match kb.list_collections().await {
        Ok(collections) => {
            if collections.is_empty() {
                Output::info(
                    "No collections built yet. Use 'viten build <transcript>' to create one.",
                );
            } else {
                Output::header(&format!("Collections ({})", collections.len()));
                println!();

                for info in &collections {
                    Output::collection_info(&info.name, info.chunk_count, info.created_at);
                }

                let total_chunks: usize = collections.iter().map(|c| c.chunk_count).sum();
                println!();
                Output::kv("Total collections", &collections.len().to_string());
                Output::kv("Total chunks", &total_chunks.to_string());
                Output::kv("Embedding model", &kb.settings().embedding.model);

                if let Ok(stats) = kb.stats().await {
                    Output::kv("Active collection", &stats.collection);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list collections: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
