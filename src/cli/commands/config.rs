//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            set_value(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment to the settings.
fn set_value(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    let parse_err = |key: &str, e: &dyn std::fmt::Display| {
        anyhow::anyhow!("Invalid value for {}: {}", key, e)
    };

    match key {
        "general.log_level" => settings.general.log_level = value.to_string(),
        "embedding.model" => settings.embedding.model = value.to_string(),
        "embedding.dimensions" => {
            settings.embedding.dimensions = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "embedding.max_batch_size" => {
            settings.embedding.max_batch_size = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "chunking.max_chunk_size" => {
            settings.chunking.max_chunk_size = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "retrieval.max_sources" => {
            settings.retrieval.max_sources = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "retrieval.similarity_weight" => {
            settings.retrieval.similarity_weight = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "retrieval.keyword_weight" => {
            settings.retrieval.keyword_weight = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "retrieval.key_point_boost" => {
            settings.retrieval.key_point_boost = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "retrieval.quote_boost" => {
            settings.retrieval.quote_boost = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "synthesis.model" => settings.synthesis.model = value.to_string(),
        "synthesis.temperature" => {
            settings.synthesis.temperature = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "synthesis.max_tokens" => {
            settings.synthesis.max_tokens = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "vector_store.provider" => settings.vector_store.provider = value.to_string(),
        "vector_store.sqlite_path" => settings.vector_store.sqlite_path = value.to_string(),
        "cache.enabled" => {
            settings.cache.enabled = value.parse().map_err(|e| parse_err(key, &e))?
        }
        "cache.ttl_seconds" => {
            settings.cache.ttl_seconds = value.parse().map_err(|e| parse_err(key, &e))?
        }
        _ => {
            return Err(anyhow::anyhow!(
                "Unknown config key '{}'. Run 'viten config show' to see available keys.",
                key
            ))
        }
    }
    Ok(())
}
