//! Prompt templates for Viten.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub qa: QaPrompts,
    pub follow_up: FollowUpPrompts,
    pub takeaways: TakeawayPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    pub system: String,
    pub user: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert video content analyst. Your task is to answer questions based on the provided video content context.

Guidelines:
1. Use only the information provided in the context
2. Be accurate and factual
3. Include specific details and examples when available
4. If the context doesn't contain enough information, say so
5. Maintain a helpful and informative tone
6. Reference timestamps when relevant
7. Prioritize key points and direct quotes"#
                .to_string(),

            user: r#"Based on the following video content, please answer this question: {{question}}

Context from video:
{{context}}

Please provide a comprehensive answer based on the available information."#
                .to_string(),
        }
    }
}

/// Prompt for follow-up question generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FollowUpPrompts {
    pub user: String,
}

impl Default for FollowUpPrompts {
    fn default() -> Self {
        Self {
            user: r#"Based on the following question, answer, and context, suggest 3 relevant follow-up questions:

Original Question: {{question}}
Answer: {{answer}}
Context: {{context}}

Please provide 3 follow-up questions that would help the user explore the topic further.
Format as a JSON array of strings."#
                .to_string(),
        }
    }
}

/// Prompt for key-takeaway extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TakeawayPrompts {
    pub user: String,
}

impl Default for TakeawayPrompts {
    fn default() -> Self {
        Self {
            user: r#"Please extract 5-8 key takeaways from the following video transcript:

{{transcript}}

Format as a JSON array of strings. Each takeaway should be a concise, actionable insight."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory
    /// and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load QA prompts if file exists
            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }

            // Load follow-up prompts if file exists
            let follow_up_path = custom_path.join("follow_up.toml");
            if follow_up_path.exists() {
                let content = std::fs::read_to_string(&follow_up_path)?;
                prompts.follow_up = toml::from_str(&content)?;
            }

            // Load takeaway prompts if file exists
            let takeaways_path = custom_path.join("takeaways.toml");
            if takeaways_path.exists() {
                let content = std::fs::read_to_string(&takeaways_path)?;
                prompts.takeaways = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config
    /// variables. Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.qa.system.is_empty());
        assert!(prompts.qa.user.contains("{{question}}"));
        assert!(prompts.follow_up.user.contains("{{answer}}"));
        assert!(prompts.takeaways.user.contains("{{transcript}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }
}
