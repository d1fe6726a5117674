//! Viten CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use viten::cli::{commands, Cli, Commands};
use viten::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("viten={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directories exist
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Build {
            transcript,
            notes,
            id,
        } => {
            commands::run_build(transcript, notes.clone(), id.clone(), settings).await?;
        }

        Commands::Ask {
            question,
            collection,
            sources,
            no_cache,
        } => {
            commands::run_ask(question, collection.clone(), *sources, *no_cache, settings).await?;
        }

        Commands::Search {
            query,
            limit,
            collection,
        } => {
            commands::run_search(query, *limit, collection.clone(), settings).await?;
        }

        Commands::Takeaways { transcript } => {
            commands::run_takeaways(transcript, settings).await?;
        }

        Commands::List => {
            commands::run_list(settings).await?;
        }

        Commands::Delete { collection } => {
            commands::run_delete(collection, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
