//! Prompt template
//!
//! Wraps a user prompt in the model's own framing.

use crate::types::ModelConfig;

/// Build the exact text sent to the engine
///
/// Layout: `pre_prompt`, blank line, `prompt_prepend` + prompt, blank line,
/// `answer_prepend`. Fields are inserted verbatim.
pub fn compose(user_prompt: &str, config: &ModelConfig) -> String {
    format!(
        "{}\n\n{}{}\n\n{}",
        config.pre_prompt, config.prompt_prepend, user_prompt, config.answer_prepend
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ModelConfig {
        ModelConfig {
            pre_prompt: "Below is an instruction.".to_string(),
            prompt_prepend: "### Instruction:\n".to_string(),
            answer_prepend: "### Response:".to_string(),
        }
    }

    #[test]
    fn test_compose_layout() {
        let text = compose("Name three colors.", &config());
        assert_eq!(
            text,
            "Below is an instruction.\n\n### Instruction:\nName three colors.\n\n### Response:"
        );
    }

    #[test]
    fn test_compose_deterministic() {
        let a = compose("hello", &config());
        let b = compose("hello", &config());
        assert_eq!(a, b);
    }

    #[test]
    fn test_compose_contains_prompt_verbatim() {
        let prompt = "  {braces} and \\n escapes \n stay put  ";
        let text = compose(prompt, &config());
        assert!(text.contains(prompt));
    }

    #[test]
    fn test_compose_empty_fields() {
        let empty = ModelConfig {
            pre_prompt: String::new(),
            prompt_prepend: String::new(),
            answer_prepend: String::new(),
        };
        assert_eq!(compose("hi", &empty), "\n\nhi\n\n");
    }
}
