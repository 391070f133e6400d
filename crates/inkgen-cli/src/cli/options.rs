//! Effect options as Inkscape passes them (`--name=value`, snake_case).
//!
//! Every option is optional; a value given here overrides the config file.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use inkgen_core::config::{Config, OperationMode, PositionMode, TextAlign, Tone};
use inkgen_providers::BackendKind;

fn set<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn set_cloned<T: Clone>(target: &mut T, value: Option<&T>) {
    set(target, value.cloned());
}

/// Backend selection and sampling.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BackendArgs {
    /// Backend kind: ollama, llamafile, custom
    #[arg(long = "api_provider", value_name = "KIND")]
    pub api_provider: Option<BackendKind>,

    /// Base URL of the local server
    #[arg(long = "api_url", env = "INKGEN_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Model name (auto-detected when empty)
    #[arg(long = "local_model", env = "INKGEN_MODEL", value_name = "NAME")]
    pub local_model: Option<String>,

    /// Probe the backend for a model when none is set
    #[arg(long = "auto_detect_model", value_parser = BoolishValueParser::new(), value_name = "BOOL")]
    pub auto_detect_model: Option<bool>,

    /// Request a streamed response (Ollama)
    #[arg(long = "stream_response", value_parser = BoolishValueParser::new(), value_name = "BOOL")]
    pub stream_response: Option<bool>,

    #[arg(long)]
    pub temperature: Option<f64>,

    /// Upper bound on generated tokens
    #[arg(long = "max_tokens")]
    pub max_tokens: Option<u32>,
}

impl BackendArgs {
    pub fn apply_to(&self, config: &mut Config) {
        set(&mut config.api_provider, self.api_provider);
        set_cloned(&mut config.api_url, self.api_url.as_ref());
        set_cloned(&mut config.local_model, self.local_model.as_ref());
        set(&mut config.auto_detect_model, self.auto_detect_model);
        set(&mut config.stream_response, self.stream_response);
        set(&mut config.temperature, self.temperature);
        set(&mut config.max_tokens, self.max_tokens);
    }
}

/// Everything the default (effect) invocation accepts.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct EffectArgs {
    /// SVG document to read (stdin when omitted)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Selected element id (repeatable, in selection order)
    #[arg(long = "id", value_name = "ID")]
    pub id: Vec<String>,

    /// Active dialog tab (ignored)
    #[arg(long, hide = true)]
    pub tab: Option<String>,

    /// create, modify, translate, summarize, expand, rewrite
    #[arg(long = "operation_mode", value_name = "MODE")]
    pub operation_mode: Option<String>,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Request or instruction for the model
    #[arg(long)]
    pub prompt: Option<String>,

    /// Target language for translate mode
    #[arg(long = "target_language", value_name = "LANGUAGE")]
    pub target_language: Option<String>,

    /// none, formal, casual, professional, friendly, enthusiastic, humorous, serious, poetic
    #[arg(long)]
    pub tone: Option<String>,

    #[arg(long = "font_family", value_name = "FAMILY")]
    pub font_family: Option<String>,

    #[arg(long = "font_size", value_name = "PX")]
    pub font_size: Option<f64>,

    #[arg(long = "font_weight")]
    pub font_weight: Option<String>,

    #[arg(long = "font_style")]
    pub font_style: Option<String>,

    /// none, underline, overline, line-through
    #[arg(long = "text_decoration")]
    pub text_decoration: Option<String>,

    /// Multiplier applied to the font size
    #[arg(long = "text_scale")]
    pub text_scale: Option<f64>,

    #[arg(long = "text_color", value_name = "COLOR")]
    pub text_color: Option<String>,

    #[arg(long = "letter_spacing", value_name = "PX")]
    pub letter_spacing: Option<f64>,

    #[arg(long = "word_spacing", value_name = "PX")]
    pub word_spacing: Option<f64>,

    /// Keep the existing style when rewriting text
    #[arg(long = "preserve_style", value_parser = BoolishValueParser::new(), value_name = "BOOL")]
    pub preserve_style: Option<bool>,

    /// Draw a background panel behind created text
    #[arg(long = "use_background", value_parser = BoolishValueParser::new(), value_name = "BOOL")]
    pub use_background: Option<bool>,

    #[arg(long = "bg_color", value_name = "COLOR")]
    pub bg_color: Option<String>,

    #[arg(long = "bg_opacity")]
    pub bg_opacity: Option<f64>,

    #[arg(long = "bg_padding", value_name = "PX")]
    pub bg_padding: Option<f64>,

    /// start, middle, end
    #[arg(long = "text_align")]
    pub text_align: Option<TextAlign>,

    /// Line height as a multiple of the font size
    #[arg(long = "line_height")]
    pub line_height: Option<f64>,

    /// Wrap width for created text
    #[arg(long = "max_width", value_name = "PX")]
    pub max_width: Option<f64>,

    /// center, top_left, top_center, top_right, middle_left, middle_right,
    /// bottom_left, bottom_center, bottom_right, cursor
    #[arg(long = "position_mode", value_name = "MODE")]
    pub position_mode: Option<String>,

    #[arg(long = "x_offset", allow_negative_numbers = true)]
    pub x_offset: Option<f64>,

    #[arg(long = "y_offset", allow_negative_numbers = true)]
    pub y_offset: Option<f64>,

    /// Strip markdown emphasis from the response
    #[arg(long = "remove_asterisks", value_parser = BoolishValueParser::new(), value_name = "BOOL")]
    pub remove_asterisks: Option<bool>,

    /// Strip quotes wrapping the whole response
    #[arg(long = "remove_quotes", value_parser = BoolishValueParser::new(), value_name = "BOOL")]
    pub remove_quotes: Option<bool>,

    #[arg(long = "capitalize_first", value_parser = BoolishValueParser::new(), value_name = "BOOL")]
    pub capitalize_first: Option<bool>,
}

impl EffectArgs {
    pub fn apply_to(&self, config: &mut Config) {
        self.backend.apply_to(config);

        if let Some(mode) = &self.operation_mode {
            config.operation_mode = OperationMode::from_id_lenient(mode);
        }
        if let Some(tone) = &self.tone {
            config.tone = Tone::from_id(tone);
        }
        if let Some(position) = &self.position_mode {
            config.position_mode = PositionMode::from_id(position);
        }

        set_cloned(&mut config.prompt, self.prompt.as_ref());
        set_cloned(&mut config.target_language, self.target_language.as_ref());
        set_cloned(&mut config.font_family, self.font_family.as_ref());
        set(&mut config.font_size, self.font_size);
        set_cloned(&mut config.font_weight, self.font_weight.as_ref());
        set_cloned(&mut config.font_style, self.font_style.as_ref());
        set_cloned(&mut config.text_decoration, self.text_decoration.as_ref());
        set(&mut config.text_scale, self.text_scale);
        set_cloned(&mut config.text_color, self.text_color.as_ref());
        set(&mut config.letter_spacing, self.letter_spacing);
        set(&mut config.word_spacing, self.word_spacing);
        set(&mut config.preserve_style, self.preserve_style);
        set(&mut config.use_background, self.use_background);
        set_cloned(&mut config.bg_color, self.bg_color.as_ref());
        set(&mut config.bg_opacity, self.bg_opacity);
        set(&mut config.bg_padding, self.bg_padding);
        set(&mut config.text_align, self.text_align);
        set(&mut config.line_height, self.line_height);
        set(&mut config.max_width, self.max_width);
        set(&mut config.x_offset, self.x_offset);
        set(&mut config.y_offset, self.y_offset);
        set(&mut config.remove_asterisks, self.remove_asterisks);
        set(&mut config.remove_quotes, self.remove_quotes);
        set(&mut config.capitalize_first, self.capitalize_first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_options_keep_config_values() {
        let mut config = Config {
            prompt: "from file".to_string(),
            font_size: 30.0,
            ..Config::default()
        };
        EffectArgs::default().apply_to(&mut config);
        assert_eq!(config.prompt, "from file");
        assert!((config.font_size - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lenient_enums() {
        let args = EffectArgs {
            operation_mode: Some("paraphrase".to_string()),
            tone: Some("sarcastic".to_string()),
            position_mode: Some("somewhere".to_string()),
            ..EffectArgs::default()
        };
        let mut config = Config {
            operation_mode: OperationMode::Rewrite,
            tone: Tone::Poetic,
            position_mode: PositionMode::TopLeft,
            ..Config::default()
        };
        args.apply_to(&mut config);
        assert_eq!(config.operation_mode, OperationMode::Create);
        assert_eq!(config.tone, Tone::None);
        assert_eq!(config.position_mode, PositionMode::Center);
    }

    #[test]
    fn test_backend_overrides() {
        let args = BackendArgs {
            api_provider: Some(BackendKind::Custom),
            api_url: Some("http://10.0.0.2:8000".to_string()),
            max_tokens: Some(64),
            ..BackendArgs::default()
        };
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.api_provider, BackendKind::Custom);
        assert_eq!(config.api_url, "http://10.0.0.2:8000");
        assert_eq!(config.max_tokens, 64);
        assert!(config.auto_detect_model);
    }
}
