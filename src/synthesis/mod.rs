//! Answer synthesis abstraction.
//!
//! The retrieval core never generates text itself; it hands an assembled
//! context to a `Synthesizer` and consumes the returned text. The same
//! contract serves answer generation, follow-up suggestions, and takeaway
//! extraction.

mod openai;

pub use openai::OpenAISynthesizer;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text synthesis providers.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Generate text from a system + user prompt pair.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;
}
