//! Takeaways command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use crate::media::Transcript;
use anyhow::Result;
use std::path::Path;

/// Run the takeaways command.
pub async fn run_takeaways(transcript_path: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Takeaways) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let transcript = Transcript::from_json_file(Path::new(transcript_path))?;
    let kb = KnowledgeBase::new(settings)?;

    let spinner = Output::spinner("Extracting takeaways...");

    match kb.takeaways(&transcript).await {
        Ok(parsed) => {
            spinner.finish_and_clear();

            if parsed.value.is_empty() {
                Output::warning("The model returned no usable takeaways.");
                return Ok(());
            }

            Output::header("Key Takeaways");
            for (i, takeaway) in parsed.value.iter().enumerate() {
                println!("  {}. {}", i + 1, takeaway);
            }
            if parsed.recovered {
                Output::warning("Takeaways were recovered from an unstructured response.");
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Takeaway extraction failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
