//! Model client: one generation request per call against the configured backend.

use std::future::Future;

use crate::backend::{BackendKind, HintContext, Protocol};
use crate::chat::{self, ChatCompletionRequest};
use crate::ollama::{self, GenerateRequest};
use crate::shared::{
    GENERATE_TIMEOUT, PROBE_TIMEOUT, ProviderError, ProviderErrorKind, ProviderResult,
    SamplingParams, build_http_client, execute,
};

/// Anything that turns a resolved prompt into generated text.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = ProviderResult<String>> + Send;
}

/// Model client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub backend: BackendKind,
    pub base_url: String,
    pub model: Option<String>,
    pub sampling: SamplingParams,
    /// Ask Ollama for a newline-delimited JSON stream instead of one object.
    pub stream: bool,
}

/// HTTP client for a single local backend.
#[derive(Debug, Clone)]
pub struct ModelClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ModelClient {
    /// Creates a client, validating and normalizing the base URL.
    ///
    /// # Errors
    /// Returns a `Config` error if the base URL does not parse or the HTTP
    /// client cannot be built.
    pub fn new(mut config: ClientConfig) -> ProviderResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::Config,
                format!("Invalid {} base URL: {base_url} ({e})", config.backend.label()),
            )
        })?;
        config.base_url = base_url;
        config.model = config
            .model
            .map(|model| model.trim().to_string())
            .filter(|model| !model.is_empty());

        Ok(Self {
            config,
            http: build_http_client()?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> BackendKind {
        self.config.backend
    }

    pub fn model(&self) -> Option<&str> {
        self.config.model.as_deref()
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.config.model = Some(model.into());
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn annotate(&self, err: ProviderError, url: &str) -> ProviderError {
        let ctx = HintContext {
            base_url: &self.config.base_url,
            url,
            model: self.model(),
        };
        let hint = self.config.backend.hint(err.kind, &ctx);
        err.with_hint(hint)
    }

    /// Lists the model identifiers the backend advertises, in server order.
    ///
    /// # Errors
    /// Returns an error if the backend is unreachable or the body has an
    /// unexpected shape.
    pub async fn list_models(&self) -> ProviderResult<Vec<String>> {
        let backend = self.config.backend;
        let url = self.endpoint(backend.models_path());
        let request = self.http.get(&url).timeout(PROBE_TIMEOUT);

        let result = match backend.protocol() {
            Protocol::OllamaGenerate => {
                execute(backend, &url, request, ollama::extract_model_names).await
            }
            Protocol::ChatCompletions => {
                execute(backend, &url, request, |body| {
                    chat::extract_model_ids(backend.label(), body)
                })
                .await
            }
        };
        result.map_err(|err| self.annotate(err, &url))
    }

    /// Probes the backend for a default model: the first listed entry wins.
    ///
    /// # Errors
    /// Returns an error if listing fails or the list is empty.
    pub async fn detect_model(&self) -> ProviderResult<String> {
        let models = self.list_models().await?;
        models.into_iter().next().ok_or_else(|| {
            ProviderError::new(
                ProviderErrorKind::UnexpectedShape,
                format!("{} reported no models", self.config.backend.label()),
            )
        })
    }

    async fn generate_text(&self, prompt: &str) -> ProviderResult<String> {
        let backend = self.config.backend;
        let url = self.endpoint(backend.generate_path());
        let sampling = self.config.sampling;

        tracing::debug!("=== {} Request ===", backend.label());
        tracing::debug!("URL: {url}");
        tracing::debug!("Model: {}", self.model().unwrap_or("<server default>"));
        tracing::debug!("Temperature: {}", sampling.temperature);
        tracing::debug!("Max tokens: {}", sampling.max_tokens);

        let result = match backend.protocol() {
            Protocol::OllamaGenerate => {
                let Some(model) = self.model() else {
                    return Err(ProviderError::new(
                        ProviderErrorKind::Config,
                        "Please specify a local model name for Ollama.",
                    ));
                };
                let stream = self.config.stream;
                let body = GenerateRequest::new(model, prompt, sampling, stream);
                let request = self.http.post(&url).json(&body).timeout(GENERATE_TIMEOUT);
                if stream {
                    execute(backend, &url, request, ollama::extract_streamed_response).await
                } else {
                    execute(backend, &url, request, ollama::extract_response).await
                }
            }
            Protocol::ChatCompletions => {
                let body = ChatCompletionRequest::new(self.model(), prompt, sampling);
                let request = self.http.post(&url).json(&body).timeout(GENERATE_TIMEOUT);
                execute(backend, &url, request, |body| {
                    chat::extract_message_content(backend.label(), body)
                })
                .await
            }
        };
        result.map_err(|err| self.annotate(err, &url))
    }
}

impl TextGenerator for ModelClient {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        self.generate_text(prompt).await
    }
}
