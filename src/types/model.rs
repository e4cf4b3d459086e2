//! Model types
//!
//! A discovered model artifact and the prompt template that goes with it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A model artifact paired with its configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAsset {
    /// Base file name shared by both files, e.g. `llama-7b` for `llama-7b.bin`
    pub name: String,
    /// Path to the weights (`<name>.bin`)
    pub artifact_path: PathBuf,
    /// Path to the prompt template (`<name>.json`)
    pub config_path: PathBuf,
}

/// Model-specific prompt template
///
/// Each model has its own developer-recommended framing around the user prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Text placed before everything else (system instructions)
    pub pre_prompt: String,
    /// Text placed immediately before the user prompt
    pub prompt_prepend: String,
    /// Text that opens the model's answer
    pub answer_prepend: String,
}

impl ModelConfig {
    pub const REQUIRED_FIELDS: [&'static str; 3] = ["pre_prompt", "prompt_prepend", "answer_prepend"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_match_struct() {
        let config = ModelConfig {
            pre_prompt: String::new(),
            prompt_prepend: String::new(),
            answer_prepend: String::new(),
        };
        let value = serde_json::to_value(&config).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), ModelConfig::REQUIRED_FIELDS.len());
        for field in ModelConfig::REQUIRED_FIELDS {
            assert!(object.contains_key(field), "missing {}", field);
        }
    }
}
