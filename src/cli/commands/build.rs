//! Build command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use crate::media::{Notes, Transcript};
use anyhow::Result;
use std::path::Path;

/// Run the build command.
pub async fn run_build(
    transcript_path: &str,
    notes_path: Option<String>,
    id: Option<String>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Build) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let transcript = Transcript::from_json_file(Path::new(transcript_path))?;
    let notes = match &notes_path {
        Some(path) => Notes::from_json_file(Path::new(path))?,
        None => Notes::empty(),
    };

    Output::info(&format!(
        "Loaded {} transcript segments and {} notes sections",
        transcript.segments.len(),
        notes.sections.len()
    ));

    let kb = KnowledgeBase::new(settings)?;

    let spinner = Output::spinner("Building knowledge base...");
    let result = match &id {
        Some(id) => kb.build_with_id(id, &transcript, &notes).await,
        None => kb.build(&transcript, &notes).await,
    };

    match result {
        Ok(build) => {
            spinner.finish_and_clear();
            Output::success(&format!(
                "Built collection '{}' with {} chunks",
                build.collection, build.chunks_indexed
            ));
            if build.degraded_batches > 0 {
                Output::warning(&format!(
                    "{} embedding batch(es) failed and were stored with zero vectors; \
                     those chunks will not match searches. Rebuild to fix.",
                    build.degraded_batches
                ));
            }
            Output::info("Ask a question with: viten ask \"<question>\"");
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Build failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
