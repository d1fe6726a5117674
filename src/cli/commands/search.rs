//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    collection: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Query embedding still goes through the provider.
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let kb = KnowledgeBase::new(settings)?;
    if let Some(name) = &collection {
        kb.use_collection(name).await?;
    }

    let spinner = Output::spinner("Searching...");

    match kb.search(query, limit).await {
        Ok(hits) => {
            spinner.finish_and_clear();

            if hits.is_empty() {
                Output::info("No matching content found.");
                return Ok(());
            }

            Output::header(&format!("Results ({})", hits.len()));
            for hit in &hits {
                let label = hit
                    .metadata
                    .section_title
                    .clone()
                    .unwrap_or_else(|| hit.metadata.source_type.to_string());
                Output::search_result(&label, &hit.metadata.timestamp, hit.final_score, &hit.content);
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
