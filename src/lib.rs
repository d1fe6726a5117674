//! Viten - Video Knowledge Base Q&A
//!
//! A CLI tool for turning long-form video transcripts and derived notes into a
//! queryable knowledge base with cited, confidence-scored answers.
//!
//! The name "Viten" comes from the Norwegian word for "knowledge."
//!
//! # Overview
//!
//! Viten allows you to:
//! - Build a searchable vector collection from a transcript + notes pair
//! - Ask questions and get AI-powered answers with cited sources
//! - Get suggested follow-up questions and a confidence score per answer
//! - Search the indexed content semantically
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `media` - Upstream input types (transcripts, notes)
//! - `chunking` - Splitting inputs into bounded-size retrievable chunks
//! - `embedding` - Embedding generation
//! - `vector_store` - Collection-oriented vector database abstraction
//! - `index` - Embedding index (build + query over one collection)
//! - `synthesis` - Answer synthesis abstraction
//! - `rag` - Retrieval, reranking, context assembly, confidence scoring
//! - `knowledge_base` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use viten::config::Settings;
//! use viten::knowledge_base::KnowledgeBase;
//! use viten::media::{Transcript, Notes};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let kb = KnowledgeBase::new(settings)?;
//!
//!     let transcript = Transcript::from_json_file("transcript.json".as_ref())?;
//!     let notes = Notes::from_json_file("notes.json".as_ref())?;
//!
//!     let build = kb.build(&transcript, &notes).await?;
//!     println!("Indexed {} chunks", build.chunks_indexed);
//!
//!     let result = kb.ask("What is the main topic?").await?;
//!     println!("{} (confidence {:.2})", result.answer, result.confidence);
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod knowledge_base;
pub mod media;
pub mod openai;
pub mod rag;
pub mod synthesis;
pub mod vector_store;

pub use error::{Result, VitenError};
