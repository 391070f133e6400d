//! Backend kinds and their per-kind protocol details.

use serde::{Deserialize, Serialize};

use crate::shared::ProviderErrorKind;

/// Wire protocol spoken by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// `/api/tags` + `/api/generate`
    OllamaGenerate,
    /// `/v1/models` + `/v1/chat/completions`
    ChatCompletions,
}

/// Local LLM server kinds inkgen knows how to speak to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Ollama,
    Llamafile,
    Custom,
}

/// Values interpolated into remediation hints.
#[derive(Debug, Clone, Copy)]
pub struct HintContext<'a> {
    pub base_url: &'a str,
    pub url: &'a str,
    pub model: Option<&'a str>,
}

impl BackendKind {
    /// Returns all backend kinds.
    pub fn all() -> &'static [BackendKind] {
        &[
            BackendKind::Ollama,
            BackendKind::Llamafile,
            BackendKind::Custom,
        ]
    }

    /// Returns the string identifier used in config files and flags.
    pub fn id(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "ollama",
            BackendKind::Llamafile => "llamafile",
            BackendKind::Custom => "custom",
        }
    }

    /// Returns the `BackendKind` for a given id string.
    pub fn from_id(id: &str) -> Option<BackendKind> {
        match id.trim().to_lowercase().as_str() {
            "ollama" => Some(BackendKind::Ollama),
            "llamafile" => Some(BackendKind::Llamafile),
            "custom" | "openai" => Some(BackendKind::Custom),
            _ => None,
        }
    }

    /// Returns the human-readable label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            BackendKind::Ollama => "Ollama",
            BackendKind::Llamafile => "llamafile",
            BackendKind::Custom => "Custom API",
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            BackendKind::Ollama => Protocol::OllamaGenerate,
            BackendKind::Llamafile | BackendKind::Custom => Protocol::ChatCompletions,
        }
    }

    pub fn models_path(&self) -> &'static str {
        match self.protocol() {
            Protocol::OllamaGenerate => "/api/tags",
            Protocol::ChatCompletions => "/v1/models",
        }
    }

    pub fn generate_path(&self) -> &'static str {
        match self.protocol() {
            Protocol::OllamaGenerate => "/api/generate",
            Protocol::ChatCompletions => "/v1/chat/completions",
        }
    }

    /// Whether a request cannot be issued without a model name.
    ///
    /// Chat-completions servers fall back to their loaded model when the
    /// `model` field is omitted.
    pub fn requires_model(&self) -> bool {
        matches!(self.protocol(), Protocol::OllamaGenerate)
    }

    /// Returns the remediation hint shown under an error of the given kind.
    pub fn hint(&self, kind: ProviderErrorKind, ctx: &HintContext<'_>) -> Option<String> {
        let model = ctx.model.unwrap_or("<model>");
        match (self, kind) {
            (
                BackendKind::Ollama,
                ProviderErrorKind::Connection | ProviderErrorKind::Timeout,
            ) => Some(format!(
                "Make sure:\n1. Ollama is running: ollama serve\n2. URL is correct: {}\n3. Model is pulled: ollama pull {model}",
                ctx.base_url
            )),
            (BackendKind::Ollama, ProviderErrorKind::HttpStatus) => Some(format!(
                "URL: {}\nModel: {model}\n\nMake sure:\n1. Ollama is running: ollama serve\n2. Model is pulled: ollama pull {model}",
                ctx.url
            )),
            (BackendKind::Ollama, ProviderErrorKind::Parse) => Some(
                "This usually means Ollama returned an error message instead of JSON.".to_string(),
            ),
            (
                BackendKind::Llamafile,
                ProviderErrorKind::Connection | ProviderErrorKind::Timeout,
            ) => Some(format!(
                "Make sure:\n1. llamafile executable is running\n2. Server is accessible at {}",
                ctx.base_url
            )),
            (BackendKind::Llamafile, ProviderErrorKind::HttpStatus) => Some(format!(
                "Make sure llamafile is running at {}",
                ctx.base_url
            )),
            (BackendKind::Custom, ProviderErrorKind::Connection | ProviderErrorKind::Timeout) => {
                Some(format!(
                    "Make sure the server is running and serves an OpenAI-compatible API at {}",
                    ctx.base_url
                ))
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        BackendKind::from_id(value).ok_or_else(|| {
            let known: Vec<_> = BackendKind::all().iter().map(BackendKind::id).collect();
            format!(
                "Unknown API provider: {value} (expected one of: {})",
                known.join(", ")
            )
        })
    }
}
