//! CLI module for Viten.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Viten - Video Knowledge Base
///
/// A CLI tool for turning video transcripts and notes into a searchable,
/// question-answerable knowledge base. The name "Viten" comes from the
/// Norwegian word for "knowledge."
#[derive(Parser, Debug)]
#[command(name = "viten")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Viten and verify configuration
    Init,

    /// Build a knowledge base from a transcript and notes
    Build {
        /// Path to the transcript JSON file
        transcript: String,

        /// Path to the notes JSON file (optional)
        #[arg(short, long)]
        notes: Option<String>,

        /// Build id for the collection name (default: current timestamp)
        #[arg(long)]
        id: Option<String>,
    },

    /// Ask a question against the knowledge base
    Ask {
        /// The question to ask
        question: String,

        /// Collection to query (default: most recent build)
        #[arg(long)]
        collection: Option<String>,

        /// Maximum number of sources to cite
        #[arg(short, long)]
        sources: Option<usize>,

        /// Bypass the answer cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Search for relevant chunks without generating an answer
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Collection to query (default: most recent build)
        #[arg(long)]
        collection: Option<String>,
    },

    /// Extract key takeaways from a transcript
    Takeaways {
        /// Path to the transcript JSON file
        transcript: String,
    },

    /// List built collections
    List,

    /// Delete a collection
    Delete {
        /// Collection name to delete
        collection: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "retrieval.max_sources")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
