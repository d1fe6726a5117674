//! Configuration module for Viten.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{FollowUpPrompts, Prompts, QaPrompts, TakeawayPrompts};
pub use settings::{
    CacheSettings, ChunkingSettings, ConfidenceSettings, EmbeddingSettings, GeneralSettings,
    PromptSettings, RetrievalSettings, Settings, SynthesisSettings, VectorStoreSettings,
};
