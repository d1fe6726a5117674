//! Configuration settings for Viten.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub embedding: EmbeddingSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
    pub confidence: ConfidenceSettings,
    pub synthesis: SynthesisSettings,
    pub vector_store: VectorStoreSettings,
    pub cache: CacheSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.viten".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (openai).
    pub provider: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
    /// Maximum texts per embedding request.
    pub max_batch_size: usize,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            max_batch_size: 100,
            timeout_seconds: 300,
        }
    }
}

/// Chunk construction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    /// Maximum chunk size in characters.
    pub max_chunk_size: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
        }
    }
}

/// Retrieval and reranking settings.
///
/// The weights are heuristics carried over from the system this replaces,
/// kept configurable rather than assumed optimal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of sources to cite per answer.
    pub max_sources: usize,
    /// Weight of vector similarity in the combined score.
    pub similarity_weight: f32,
    /// Weight of keyword overlap in the combined score.
    pub keyword_weight: f32,
    /// Score boost for key-point chunks.
    pub key_point_boost: f32,
    /// Score boost for quote chunks.
    pub quote_boost: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            max_sources: 3,
            similarity_weight: 0.7,
            keyword_weight: 0.3,
            key_point_boost: 1.2,
            quote_boost: 1.1,
        }
    }
}

/// Confidence scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceSettings {
    /// Weight of mean source relevance.
    pub relevance_weight: f32,
    /// Weight of the answer-length factor.
    pub length_weight: f32,
    /// Weight of the source-diversity factor.
    pub diversity_weight: f32,
}

impl Default for ConfidenceSettings {
    fn default() -> Self {
        Self {
            relevance_weight: 0.6,
            length_weight: 0.2,
            diversity_weight: 0.2,
        }
    }
}

/// Answer synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    /// Synthesis provider (openai).
    pub provider: String,
    /// Chat model for answer generation.
    pub model: String,
    /// Sampling temperature for answers.
    pub temperature: f32,
    /// Token cap per completion.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 1000,
            timeout_seconds: 300,
        }
    }
}

/// Vector store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.viten/vectors.db".to_string(),
        }
    }
}

/// Answer cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Enable the CLI-side answer cache.
    pub enabled: bool,
    /// Time-to-live for cached answers, in seconds.
    pub ttl_seconds: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 7 * 24 * 60 * 60,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VitenError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("viten")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded cache directory path.
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir().join("cache")
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.vector_store.sqlite_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let settings = Settings::default();
        assert_eq!(settings.chunking.max_chunk_size, 1000);
        assert!((settings.retrieval.similarity_weight - 0.7).abs() < f32::EPSILON);
        assert!((settings.retrieval.key_point_boost - 1.2).abs() < f32::EPSILON);
        assert!((settings.confidence.relevance_weight - 0.6).abs() < f32::EPSILON);
        assert_eq!(settings.embedding.max_batch_size, 100);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [retrieval]
            max_sources = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.retrieval.max_sources, 5);
        assert!((settings.retrieval.keyword_weight - 0.3).abs() < f32::EPSILON);
        assert_eq!(settings.synthesis.model, "gpt-4o-mini");
    }
}
