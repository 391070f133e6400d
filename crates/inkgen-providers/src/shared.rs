//! Backend-agnostic types and the request-execution routine shared by every backend.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

use crate::backend::BackendKind;

/// Standard User-Agent header for inkgen API requests.
pub const USER_AGENT: &str = concat!("inkgen/", env!("CARGO_PKG_VERSION"));

/// Instruction placed ahead of every user prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful text generator. You respond with only the requested text content, without any explanations, formatting markers, or additional commentary.";

/// Timeout for the model-list probe used by auto-detection.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a generation request. Local inference can be slow.
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

/// Sampling parameters forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Categories of provider errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Backend unreachable (refused, DNS, TLS handshake)
    Connection,
    /// Connect or read timeout
    Timeout,
    /// Non-2xx HTTP status
    HttpStatus,
    /// Body was not valid JSON
    Parse,
    /// Valid JSON, but an expected field is missing
    UnexpectedShape,
    /// Invalid client configuration (e.g. malformed base URL)
    Config,
    /// Anything else reported by the transport
    Other,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Connection => write!(f, "connection"),
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::HttpStatus => write!(f, "http_status"),
            ProviderErrorKind::Parse => write!(f, "parse"),
            ProviderErrorKind::UnexpectedShape => write!(f, "unexpected_shape"),
            ProviderErrorKind::Config => write!(f, "config"),
            ProviderErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Structured error from a backend with kind and user-facing details.
#[derive(Debug, Clone)]
pub struct ProviderError {
    /// Error category
    pub kind: ProviderErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// HTTP status code, for `HttpStatus` errors
    pub status: Option<u16>,
    /// Raw diagnostic detail (e.g. response body)
    pub details: Option<String>,
    /// Backend-specific remediation hint
    pub hint: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
            hint: None,
        }
    }

    /// Creates an HTTP status error carrying the raw body.
    ///
    /// When the body is JSON with an `error.message` field, that message is
    /// lifted into the summary.
    pub fn http_status(label: &str, status: u16, body: &str) -> Self {
        let message = match error_message(body) {
            Some(msg) => format!("{label} HTTP error {status}: {msg}"),
            None => format!("{label} HTTP error {status}"),
        };
        Self {
            kind: ProviderErrorKind::HttpStatus,
            message,
            status: Some(status),
            details: (!body.is_empty()).then(|| body.to_string()),
            hint: None,
        }
    }

    /// Creates an error for a JSON body missing an expected field.
    pub fn missing_field(label: &str, field: &str, value: &Value) -> Self {
        let keys = value
            .as_object()
            .map(|obj| obj.keys().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        Self::new(
            ProviderErrorKind::UnexpectedShape,
            format!("Unexpected {label} response format: expected field `{field}`"),
        )
        .with_details(format!("Keys: [{keys}]"))
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint;
        self
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(details) = &self.details {
            write!(f, "\n{details}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\n\n{hint}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {}

/// Result type for provider operations.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Extracts `error.message` (or a bare string `error`) from a JSON error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let json = serde_json::from_str::<Value>(body).ok()?;
    let error = json.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

/// Builds the HTTP client used for every backend.
///
/// Certificate validation is disabled: targets are local-network services,
/// often behind self-signed certificates.
pub(crate) fn build_http_client() -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .danger_accept_invalid_certs(true)
        .build()
        .map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::Config,
                format!("Failed to build HTTP client: {e}"),
            )
        })
}

/// Sends a prepared request and hands the body to a backend-specific extractor.
///
/// Transport failures, non-2xx statuses and body decoding errors are mapped
/// to [`ProviderError`] here; the extractor only deals with response shape.
pub(crate) async fn execute<T>(
    backend: BackendKind,
    url: &str,
    request: reqwest::RequestBuilder,
    extract: impl FnOnce(&str) -> ProviderResult<T>,
) -> ProviderResult<T> {
    let label = backend.label();
    let response = request
        .send()
        .await
        .map_err(|e| classify_reqwest_error(label, url, &e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| classify_reqwest_error(label, url, &e))?;

    if !status.is_success() {
        return Err(ProviderError::http_status(label, status.as_u16(), &body));
    }

    tracing::debug!(
        "{label} response (first 300 chars): {}",
        body.chars().take(300).collect::<String>()
    );
    extract(&body)
}

/// Parses a response body as JSON, mapping failures to `Parse` errors.
pub(crate) fn parse_json(label: &str, body: &str) -> ProviderResult<Value> {
    serde_json::from_str::<Value>(body).map_err(|e| {
        ProviderError::new(
            ProviderErrorKind::Parse,
            format!("Invalid JSON response from {label}: {e}"),
        )
    })
}

fn classify_reqwest_error(label: &str, url: &str, e: &reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::new(
            ProviderErrorKind::Timeout,
            format!("Request to {label} at {url} timed out: {e}"),
        )
    } else if e.is_connect() {
        ProviderError::new(
            ProviderErrorKind::Connection,
            format!("Cannot connect to {label} at {url}: {e}"),
        )
    } else if e.is_decode() || e.is_body() {
        ProviderError::new(
            ProviderErrorKind::Parse,
            format!("Failed to read {label} response body: {e}"),
        )
    } else {
        ProviderError::new(
            ProviderErrorKind::Other,
            format!("Unexpected error calling {label} at {url}: {e}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_http_status_lifts_json_error_message() {
        let err = ProviderError::http_status(
            "llamafile",
            400,
            r#"{"error":{"message":"context too long"}}"#,
        );
        assert_eq!(err.kind, ProviderErrorKind::HttpStatus);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "llamafile HTTP error 400: context too long");
        assert!(err.details.unwrap().contains("context too long"));
    }

    #[test]
    fn test_http_status_keeps_plain_body() {
        let err = ProviderError::http_status("Ollama", 404, "model 'x' not found");
        assert_eq!(err.message, "Ollama HTTP error 404");
        assert_eq!(err.details.as_deref(), Some("model 'x' not found"));
        let rendered = err.to_string();
        assert!(rendered.contains("404"));
        assert!(rendered.contains("model 'x' not found"));
    }

    #[test]
    fn test_error_message_accepts_string_error() {
        assert_eq!(
            error_message(r#"{"error":"model not found"}"#).as_deref(),
            Some("model not found")
        );
        assert_eq!(error_message("not json"), None);
    }

    #[test]
    fn test_missing_field_lists_keys() {
        let err = ProviderError::missing_field("Ollama", "response", &json!({"done": true}));
        assert_eq!(err.kind, ProviderErrorKind::UnexpectedShape);
        assert!(err.message.contains("`response`"));
        assert_eq!(err.details.as_deref(), Some("Keys: [done]"));
    }

    #[test]
    fn test_display_appends_hint() {
        let err = ProviderError::new(ProviderErrorKind::Connection, "Cannot connect")
            .with_hint(Some("Start the server".to_string()));
        assert_eq!(err.to_string(), "Cannot connect\n\nStart the server");
    }
}
