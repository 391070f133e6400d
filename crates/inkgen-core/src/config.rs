//! Configuration management for inkgen.
//!
//! One flat record per invocation. Values come from `${INKGEN_HOME}/config.toml`
//! (defaults when absent) and are then overridden by command-line flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use inkgen_providers::{BackendKind, ClientConfig, SamplingParams};
use serde::{Deserialize, Serialize};

/// Action requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OperationMode {
    /// Generate new text from the prompt
    #[default]
    Create,
    /// Apply a free-form instruction to the selected text
    Modify,
    Translate,
    Summarize,
    Expand,
    Rewrite,
}

impl OperationMode {
    pub fn all() -> &'static [OperationMode] {
        &[
            OperationMode::Create,
            OperationMode::Modify,
            OperationMode::Translate,
            OperationMode::Summarize,
            OperationMode::Expand,
            OperationMode::Rewrite,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            OperationMode::Create => "create",
            OperationMode::Modify => "modify",
            OperationMode::Translate => "translate",
            OperationMode::Summarize => "summarize",
            OperationMode::Expand => "expand",
            OperationMode::Rewrite => "rewrite",
        }
    }

    pub fn from_id(id: &str) -> Option<OperationMode> {
        let id = id.trim().to_lowercase();
        Self::all().iter().copied().find(|mode| mode.id() == id)
    }

    /// Parses a mode, falling back to `create` for unknown names.
    pub fn from_id_lenient(id: &str) -> OperationMode {
        Self::from_id(id).unwrap_or_else(|| {
            tracing::warn!("Unknown operation mode '{id}', using 'create'");
            OperationMode::Create
        })
    }

    /// Whether this mode transforms existing selected text.
    pub fn needs_selection(&self) -> bool {
        !matches!(self, OperationMode::Create)
    }
}

impl From<String> for OperationMode {
    fn from(value: String) -> Self {
        Self::from_id_lenient(&value)
    }
}

impl From<OperationMode> for String {
    fn from(value: OperationMode) -> Self {
        value.id().to_string()
    }
}

/// Optional style modifier appended to prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tone {
    #[default]
    None,
    Formal,
    Casual,
    Professional,
    Friendly,
    Enthusiastic,
    Humorous,
    Serious,
    Poetic,
}

impl Tone {
    pub fn all() -> &'static [Tone] {
        &[
            Tone::None,
            Tone::Formal,
            Tone::Casual,
            Tone::Professional,
            Tone::Friendly,
            Tone::Enthusiastic,
            Tone::Humorous,
            Tone::Serious,
            Tone::Poetic,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Tone::None => "none",
            Tone::Formal => "formal",
            Tone::Casual => "casual",
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Humorous => "humorous",
            Tone::Serious => "serious",
            Tone::Poetic => "poetic",
        }
    }

    /// Unmapped names contribute nothing to the prompt.
    pub fn from_id(id: &str) -> Tone {
        let id = id.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|tone| tone.id() == id)
            .unwrap_or(Tone::None)
    }
}

impl From<String> for Tone {
    fn from(value: String) -> Self {
        Self::from_id(&value)
    }
}

impl From<Tone> for String {
    fn from(value: Tone) -> Self {
        value.id().to_string()
    }
}

/// Where newly created text is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PositionMode {
    #[default]
    Center,
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    MiddleLeft,
    MiddleRight,
    /// Center of the first selected element's bounding box
    Cursor,
}

impl PositionMode {
    pub fn all() -> &'static [PositionMode] {
        &[
            PositionMode::Center,
            PositionMode::TopLeft,
            PositionMode::TopCenter,
            PositionMode::TopRight,
            PositionMode::BottomLeft,
            PositionMode::BottomCenter,
            PositionMode::BottomRight,
            PositionMode::MiddleLeft,
            PositionMode::MiddleRight,
            PositionMode::Cursor,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            PositionMode::Center => "center",
            PositionMode::TopLeft => "top_left",
            PositionMode::TopCenter => "top_center",
            PositionMode::TopRight => "top_right",
            PositionMode::BottomLeft => "bottom_left",
            PositionMode::BottomCenter => "bottom_center",
            PositionMode::BottomRight => "bottom_right",
            PositionMode::MiddleLeft => "middle_left",
            PositionMode::MiddleRight => "middle_right",
            PositionMode::Cursor => "cursor",
        }
    }

    /// Unknown names fall back to `center`.
    pub fn from_id(id: &str) -> PositionMode {
        let id = id.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.id() == id)
            .unwrap_or_default()
    }
}

impl From<String> for PositionMode {
    fn from(value: String) -> Self {
        Self::from_id(&value)
    }
}

impl From<PositionMode> for String {
    fn from(value: PositionMode) -> Self {
        value.id().to_string()
    }
}

/// SVG `text-anchor` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Start,
    Middle,
    End,
}

impl TextAlign {
    pub fn id(&self) -> &'static str {
        match self {
            TextAlign::Start => "start",
            TextAlign::Middle => "middle",
            TextAlign::End => "end",
        }
    }
}

impl std::str::FromStr for TextAlign {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "start" => Ok(TextAlign::Start),
            "middle" => Ok(TextAlign::Middle),
            "end" => Ok(TextAlign::End),
            other => Err(format!(
                "Unknown text alignment: {other} (expected start, middle or end)"
            )),
        }
    }
}

/// Text decorations written to style; anything else is dropped.
pub const VALID_DECORATIONS: &[&str] = &["underline", "overline", "line-through"];

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub operation_mode: OperationMode,

    // Backend
    pub api_provider: BackendKind,
    pub api_url: String,
    pub local_model: String,
    pub auto_detect_model: bool,
    pub stream_response: bool,
    pub temperature: f64,
    pub max_tokens: u32,

    // Prompt
    pub prompt: String,
    pub target_language: String,
    pub tone: Tone,

    // Style
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: String,
    pub font_style: String,
    pub text_decoration: String,
    pub text_scale: f64,
    pub text_color: String,
    pub letter_spacing: f64,
    pub word_spacing: f64,
    pub preserve_style: bool,

    // Background panel
    pub use_background: bool,
    pub bg_color: String,
    pub bg_opacity: f64,
    pub bg_padding: f64,

    // Layout
    pub text_align: TextAlign,
    pub line_height: f64,
    pub max_width: f64,
    pub position_mode: PositionMode,
    pub x_offset: f64,
    pub y_offset: f64,

    // Response cleanup
    pub remove_asterisks: bool,
    pub remove_quotes: bool,
    pub capitalize_first: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            operation_mode: OperationMode::Create,
            api_provider: BackendKind::Ollama,
            api_url: Self::DEFAULT_API_URL.to_string(),
            local_model: String::new(),
            auto_detect_model: true,
            stream_response: false,
            temperature: 0.7,
            max_tokens: 500,
            prompt: String::new(),
            target_language: "French".to_string(),
            tone: Tone::None,
            font_family: "Arial".to_string(),
            font_size: 24.0,
            font_weight: "normal".to_string(),
            font_style: "normal".to_string(),
            text_decoration: "none".to_string(),
            text_scale: 1.0,
            text_color: "#000000".to_string(),
            letter_spacing: 0.0,
            word_spacing: 0.0,
            preserve_style: true,
            use_background: false,
            bg_color: "#ffffff".to_string(),
            bg_opacity: 0.8,
            bg_padding: 10.0,
            text_align: TextAlign::Start,
            line_height: 1.2,
            max_width: 600.0,
            position_mode: PositionMode::Center,
            x_offset: 0.0,
            y_offset: 0.0,
            remove_asterisks: true,
            remove_quotes: true,
            capitalize_first: false,
        }
    }
}

impl Config {
    pub const DEFAULT_API_URL: &'static str = "http://localhost:11434";

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the commented default template to `path`.
    ///
    /// Fails if a file already exists there.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Font size after the user scale multiplier.
    pub fn effective_font_size(&self) -> f64 {
        self.font_size * self.text_scale
    }

    /// Text decoration to emit, if it is one of [`VALID_DECORATIONS`].
    pub fn decoration(&self) -> Option<&str> {
        let decoration = self.text_decoration.trim();
        VALID_DECORATIONS
            .contains(&decoration)
            .then_some(decoration)
    }

    /// Builds the model client configuration from the backend fields.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            backend: self.api_provider,
            base_url: self.api_url.trim().to_string(),
            model: Some(self.local_model.trim().to_string()).filter(|m| !m.is_empty()),
            sampling: SamplingParams {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
            stream: self.stream_response,
        }
    }
}

/// Returns the default config template with comments.
///
/// Embedded from `default_config.toml` at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for inkgen configuration.
    //!
    //! `INKGEN_HOME` resolution order:
    //! 1. `INKGEN_HOME` environment variable (if set)
    //! 2. ~/.config/inkgen (default)

    use std::path::PathBuf;

    /// Returns the inkgen home directory.
    pub fn inkgen_home() -> PathBuf {
        if let Ok(home) = std::env::var("INKGEN_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("inkgen"))
            .unwrap_or_else(|| PathBuf::from(".inkgen"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        inkgen_home().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_default_template_matches_defaults() {
        let parsed: Config = toml::from_str(default_config_template()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_provider = \"llamafile\"\napi_url = \"http://127.0.0.1:8080\"\ntone = \"poetic\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_provider, BackendKind::Llamafile);
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
        assert_eq!(config.tone, Tone::Poetic);
        assert_eq!(config.font_size, 24.0);
    }

    #[test]
    fn test_load_invalid_file_names_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_provider = \"kobold\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config from"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::init(&path).unwrap();
        assert!(path.exists());
        assert!(Config::init(&path).is_err());
    }

    #[test]
    fn test_lenient_enums() {
        assert_eq!(OperationMode::from_id_lenient("explode"), OperationMode::Create);
        assert_eq!(OperationMode::from_id(" Translate "), Some(OperationMode::Translate));
        assert_eq!(Tone::from_id("sarcastic"), Tone::None);
        assert_eq!(PositionMode::from_id("nowhere"), PositionMode::Center);
        assert_eq!(PositionMode::from_id("top_right"), PositionMode::TopRight);
        assert!("justify".parse::<TextAlign>().is_err());
    }

    #[test]
    fn test_decoration_filter() {
        let mut config = Config::default();
        assert_eq!(config.decoration(), None);
        config.text_decoration = "underline".to_string();
        assert_eq!(config.decoration(), Some("underline"));
        config.text_decoration = "blink".to_string();
        assert_eq!(config.decoration(), None);
    }

    #[test]
    fn test_client_config_trims_and_drops_blank_model() {
        let config = Config {
            api_url: " http://localhost:11434/ ".to_string(),
            local_model: "  ".to_string(),
            ..Config::default()
        };
        let client = config.client_config();
        assert_eq!(client.base_url, "http://localhost:11434/");
        assert_eq!(client.model, None);
        assert_eq!(client.sampling.max_tokens, 500);
    }
}
