//! OpenAI-compatible `/v1/models` + `/v1/chat/completions` helpers.

use serde::Serialize;
use serde_json::Value;

use crate::shared::{ProviderError, ProviderResult, SYSTEM_INSTRUCTION, SamplingParams, parse_json};

/// Model id reported by llamafile builds that omit `id` from `/v1/models`.
const FALLBACK_MODEL_ID: &str = "LLaMA_CPP";

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    messages: [ChatCompletionMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatCompletionRequest<'a> {
    pub(crate) fn new(model: Option<&'a str>, prompt: &'a str, sampling: SamplingParams) -> Self {
        Self {
            messages: [
                ChatCompletionMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatCompletionMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            model: model.filter(|m| !m.trim().is_empty()),
        }
    }
}

/// Extracts `choices[0].message.content`.
pub(crate) fn extract_message_content(label: &str, body: &str) -> ProviderResult<String> {
    let value = parse_json(label, body)?;
    let first_choice = value
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| ProviderError::missing_field(label, "choices[0]", &value))?;

    first_choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| ProviderError::missing_field(label, "choices[0].message.content", &value))
}

/// Extracts model ids from a `/v1/models` body (`data[].id`).
pub(crate) fn extract_model_ids(label: &str, body: &str) -> ProviderResult<Vec<String>> {
    let value = parse_json(label, body)?;
    let data = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::missing_field(label, "data", &value))?;

    Ok(data
        .iter()
        .map(|entry| {
            entry
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or(FALLBACK_MODEL_ID)
                .to_string()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ProviderErrorKind;

    #[test]
    fn test_request_omits_unset_model() {
        let request = ChatCompletionRequest::new(None, "hi", SamplingParams::default());
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_INSTRUCTION);
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
        assert_eq!(json["max_tokens"], 500);
    }

    #[test]
    fn test_request_includes_model_when_set() {
        let request = ChatCompletionRequest::new(Some("qwen"), "hi", SamplingParams::default());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen");

        let blank = ChatCompletionRequest::new(Some("  "), "hi", SamplingParams::default());
        assert!(serde_json::to_value(&blank).unwrap().get("model").is_none());
    }

    #[test]
    fn test_extract_message_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" Bonjour "}}]}"#;
        assert_eq!(extract_message_content("llamafile", body).unwrap(), "Bonjour");
    }

    #[test]
    fn test_extract_message_content_empty_choices() {
        let err = extract_message_content("llamafile", r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::UnexpectedShape);
        assert!(err.message.contains("`choices[0]`"));
    }

    #[test]
    fn test_extract_message_content_missing_content() {
        let err =
            extract_message_content("Custom API", r#"{"choices":[{"text":"hi"}]}"#).unwrap_err();
        assert!(err.message.contains("choices[0].message.content"));
    }

    #[test]
    fn test_model_ids_fall_back_for_missing_id() {
        let body = r#"{"data":[{"object":"model"},{"id":"phi"}]}"#;
        assert_eq!(
            extract_model_ids("llamafile", body).unwrap(),
            vec![FALLBACK_MODEL_ID.to_string(), "phi".to_string()]
        );
    }
}
