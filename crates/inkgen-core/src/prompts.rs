//! Prompt construction.
//!
//! Prompts are fully resolved strings; the backends add the system
//! instruction on their side.

use crate::config::{Config, OperationMode, Tone};

const RETURN_ONLY_TEXT: &str =
    "IMPORTANT: Return ONLY the text content, no explanations or formatting markers.";

/// Tone sentence appended to creation prompts.
fn create_tone_sentence(tone: Tone) -> Option<&'static str> {
    Some(match tone {
        Tone::None => return None,
        Tone::Formal => "Use formal language and professional tone.",
        Tone::Casual => "Use casual, conversational language.",
        Tone::Professional => "Use professional business language.",
        Tone::Friendly => "Use friendly and warm tone.",
        Tone::Enthusiastic => "Use enthusiastic and energetic language.",
        Tone::Humorous => "Add humor and wit.",
        Tone::Serious => "Use serious and straightforward tone.",
        Tone::Poetic => "Use poetic and artistic language.",
    })
}

/// Shorter tone sentence appended to prompts that carry existing text.
fn context_tone_sentence(tone: Tone) -> Option<&'static str> {
    Some(match tone {
        Tone::None => return None,
        Tone::Formal => "Use formal language.",
        Tone::Casual => "Use casual language.",
        Tone::Professional => "Use professional tone.",
        Tone::Friendly => "Use friendly tone.",
        Tone::Enthusiastic => "Use enthusiastic tone.",
        Tone::Humorous => "Add humor.",
        Tone::Serious => "Use serious tone.",
        Tone::Poetic => "Use poetic language.",
    })
}

/// Prompt for generating new text from the user's request.
pub fn build_create_prompt(config: &Config) -> String {
    let mut parts = vec![config.prompt.clone()];
    if let Some(sentence) = create_tone_sentence(config.tone) {
        parts.push(sentence.to_string());
    }
    parts.push(format!("\n{RETURN_ONLY_TEXT}"));
    parts.join("\n")
}

/// Prompt for transforming `existing` according to the operation mode.
///
/// In `create` mode there is no template and the existing text is passed
/// through as the request.
pub fn build_context_prompt(config: &Config, existing: &str) -> String {
    let mut prompt = match config.operation_mode {
        OperationMode::Modify => format!(
            "Modify the following text based on this instruction: {}\n\nOriginal text: {existing}",
            config.prompt
        ),
        OperationMode::Translate => format!(
            "Translate the following text to {}. Maintain the meaning and tone.\n\nOriginal text: {existing}",
            config.target_language
        ),
        OperationMode::Summarize => format!(
            "Summarize the following text to be shorter and more concise while keeping key points.\n\nOriginal text: {existing}"
        ),
        OperationMode::Expand => format!(
            "Expand and elaborate on the following text with more detail and examples.\n\nOriginal text: {existing}"
        ),
        OperationMode::Rewrite => format!(
            "Rewrite and improve the following text for better grammar, clarity, and style.\n\nOriginal text: {existing}"
        ),
        OperationMode::Create => existing.to_string(),
    };

    if let Some(sentence) = context_tone_sentence(config.tone) {
        prompt.push('\n');
        prompt.push_str(sentence);
    }
    prompt.push_str("\n\n");
    prompt.push_str(RETURN_ONLY_TEXT);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: OperationMode, tone: Tone) -> Config {
        Config {
            operation_mode: mode,
            tone,
            prompt: "Make it shorter".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_create_prompt_without_tone() {
        let cfg = Config {
            prompt: "A slogan for a bakery".to_string(),
            ..Config::default()
        };
        assert_eq!(
            build_create_prompt(&cfg),
            "A slogan for a bakery\n\nIMPORTANT: Return ONLY the text content, no explanations or formatting markers."
        );
    }

    #[test]
    fn test_create_prompt_with_tone() {
        let cfg = Config {
            prompt: "A slogan".to_string(),
            tone: Tone::Humorous,
            ..Config::default()
        };
        let prompt = build_create_prompt(&cfg);
        assert!(prompt.starts_with("A slogan\nAdd humor and wit.\n\nIMPORTANT:"));
    }

    #[test]
    fn test_translate_prompt_embeds_language_and_text() {
        let prompt = build_context_prompt(
            &config(OperationMode::Translate, Tone::None),
            "Hello world",
        );
        assert!(prompt.contains("Translate the following text to French"));
        assert!(prompt.contains("Hello world"));
        assert!(prompt.ends_with("\n\nIMPORTANT: Return ONLY the text content, no explanations or formatting markers."));
    }

    #[test]
    fn test_modify_prompt_uses_instruction() {
        let prompt = build_context_prompt(&config(OperationMode::Modify, Tone::None), "Long text");
        assert!(prompt.starts_with(
            "Modify the following text based on this instruction: Make it shorter\n\nOriginal text: Long text"
        ));
    }

    #[test]
    fn test_context_prompt_uses_short_tone_sentence() {
        let prompt = build_context_prompt(&config(OperationMode::Rewrite, Tone::Formal), "txt");
        assert!(prompt.contains("Original text: txt\nUse formal language.\n\nIMPORTANT"));
    }

    #[test]
    fn test_create_mode_context_prompt_echoes_text() {
        let prompt = build_context_prompt(&config(OperationMode::Create, Tone::None), "as is");
        assert!(prompt.starts_with("as is\n\nIMPORTANT"));
    }
}
