//! Delete command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use anyhow::Result;

/// Run the delete command.
pub async fn run_delete(collection: &str, settings: Settings) -> Result<()> {
    let kb = KnowledgeBase::new(settings)?;

    match kb.delete_collection(collection).await {
        Ok(()) => {
            Output::success(&format!("Deleted collection '{}'", collection));
        }
        Err(e) => {
            Output::error(&format!("Failed to delete '{}': {}", collection, e));
            return Err(e.into());
        }
    }

    Ok(())
}
