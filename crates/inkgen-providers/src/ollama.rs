//! Ollama `/api/tags` + `/api/generate` request builders and extractors.

use serde::Serialize;
use serde_json::Value;

use crate::shared::{
    ProviderError, ProviderErrorKind, ProviderResult, SYSTEM_INSTRUCTION, SamplingParams,
    parse_json,
};

const LABEL: &str = "Ollama";

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

impl<'a> GenerateRequest<'a> {
    pub(crate) fn new(model: &'a str, prompt: &str, sampling: SamplingParams, stream: bool) -> Self {
        Self {
            model,
            prompt: format!("{SYSTEM_INSTRUCTION}\n\nUser request: {prompt}"),
            stream,
            options: GenerateOptions {
                temperature: sampling.temperature,
                num_predict: sampling.max_tokens,
            },
        }
    }
}

/// Extracts `response` from a non-streaming generate body.
pub(crate) fn extract_response(body: &str) -> ProviderResult<String> {
    let value = parse_json(LABEL, body)?;
    value
        .get("response")
        .and_then(Value::as_str)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| ProviderError::missing_field(LABEL, "response", &value))
}

/// Folds a newline-delimited JSON body by concatenating each chunk's `response`.
///
/// Lines that are not JSON are skipped. A chunk carrying `error` aborts.
pub(crate) fn extract_streamed_response(body: &str) -> ProviderResult<String> {
    let mut text = String::new();
    let mut chunks = 0usize;

    for line in body.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Ok(chunk) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        if let Some(error) = chunk.get("error").and_then(Value::as_str) {
            return Err(ProviderError::new(
                ProviderErrorKind::Other,
                format!("Error streaming from {LABEL}: {error}"),
            ));
        }
        if let Some(piece) = chunk.get("response").and_then(Value::as_str) {
            text.push_str(piece);
            chunks += 1;
        }
    }

    if chunks == 0 {
        return Err(ProviderError::new(
            ProviderErrorKind::UnexpectedShape,
            format!("Unexpected {LABEL} stream: no chunk carried field `response`"),
        ));
    }
    Ok(text.trim().to_string())
}

/// Extracts model names from a `/api/tags` body (`models[].name`).
pub(crate) fn extract_model_names(body: &str) -> ProviderResult<Vec<String>> {
    let value = parse_json(LABEL, body)?;
    let models = value
        .get("models")
        .and_then(Value::as_array)
        .ok_or_else(|| ProviderError::missing_field(LABEL, "models", &value))?;

    Ok(models
        .iter()
        .filter_map(|model| model.get("name").and_then(Value::as_str))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}
