//! Ask command implementation.

use crate::cache::AnswerCache;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use crate::rag::QueryResult;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    collection: Option<String>,
    sources: Option<usize>,
    no_cache: bool,
    mut settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    if let Some(n) = sources {
        settings.retrieval.max_sources = n;
    }

    let cache = if settings.cache.enabled && !no_cache {
        Some(AnswerCache::new(
            settings.cache_dir(),
            settings.cache.ttl_seconds,
        ))
    } else {
        None
    };

    let kb = KnowledgeBase::new(settings)?;
    if let Some(name) = &collection {
        kb.use_collection(name).await?;
    }
    let collection = kb.resolve_collection().await?;

    let cache_key = AnswerCache::key(&collection, question);
    if let Some(cache) = &cache {
        if let Some(result) = cache.get::<QueryResult>(&cache_key) {
            Output::info("Answer served from cache (use --no-cache to regenerate).");
            print_result(&result);
            return Ok(());
        }
    }

    let spinner = Output::spinner("Searching knowledge base...");

    match kb.ask(question).await {
        Ok(result) => {
            spinner.finish_and_clear();

            if let Some(cache) = &cache {
                if let Err(e) = cache.set(&cache_key, &result) {
                    Output::warning(&format!("Failed to cache answer: {}", e));
                }
            }

            print_result(&result);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

fn print_result(result: &QueryResult) {
    println!("\n{}\n", result.answer);

    if !result.sources.is_empty() {
        Output::header("Sources");
        for source in &result.sources {
            let label = source
                .section_title
                .clone()
                .unwrap_or_else(|| source.source_type.to_string());
            Output::search_result(
                &label,
                &source.timestamp,
                source.relevance_score,
                &source.content,
            );
        }
    }

    if !result.follow_up_questions.is_empty() {
        Output::header("Follow-up questions");
        for question in &result.follow_up_questions {
            Output::list_item(question);
        }
        if result.follow_ups_recovered {
            Output::warning("Follow-up suggestions were recovered from an unstructured response.");
        }
    }

    println!();
    Output::kv("Confidence", &format!("{:.0}%", result.confidence * 100.0));
}
