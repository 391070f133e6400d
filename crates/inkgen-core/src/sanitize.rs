//! Cleanup of raw model output before it goes into the document.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```.*\n").expect("valid fence regex"));
static FENCE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\n```$").expect("valid fence regex"));
static BOLD_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"));
static BOLD_UNDERSCORES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([^_]+)__").expect("valid bold regex"));
static ITALIC_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid italic regex"));
static ITALIC_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([^_]+)_").expect("valid italic regex"));

/// Cleanup toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub remove_emphasis: bool,
    pub remove_quotes: bool,
    pub capitalize_first: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            remove_emphasis: true,
            remove_quotes: true,
            capitalize_first: false,
        }
    }
}

impl From<&Config> for SanitizeOptions {
    fn from(config: &Config) -> Self {
        Self {
            remove_emphasis: config.remove_asterisks,
            remove_quotes: config.remove_quotes,
            capitalize_first: config.capitalize_first,
        }
    }
}

fn strip_fences(text: &str) -> String {
    let text = FENCE_OPEN.replace_all(text, "");
    let text = FENCE_CLOSE.replace_all(&text, "");
    text.replace("```", "")
}

fn strip_emphasis(text: &str) -> String {
    let text = BOLD_STARS.replace_all(text, "$1");
    let text = BOLD_UNDERSCORES.replace_all(&text, "$1");
    let text = ITALIC_STAR.replace_all(&text, "$1");
    ITALIC_UNDERSCORE.replace_all(&text, "$1").into_owned()
}

/// Drops one pair of matching wrapping quotes.
fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    ['"', '\'']
        .iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .filter(|_| trimmed.chars().count() >= 2)
        .unwrap_or(text)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cleans raw model output. Runs fences, emphasis, quotes, capitalization,
/// then trims; the result is stable under a second pass.
pub fn sanitize(raw: &str, options: SanitizeOptions) -> String {
    let mut text = strip_fences(raw);
    if options.remove_emphasis {
        text = strip_emphasis(&text);
    }
    if options.remove_quotes {
        text = strip_quotes(&text).to_string();
    }
    let text = text.trim();
    if options.capitalize_first {
        capitalize_first(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: SanitizeOptions = SanitizeOptions {
        remove_emphasis: true,
        remove_quotes: true,
        capitalize_first: true,
    };

    fn only(remove_emphasis: bool, remove_quotes: bool, capitalize_first: bool) -> SanitizeOptions {
        SanitizeOptions {
            remove_emphasis,
            remove_quotes,
            capitalize_first,
        }
    }

    #[test]
    fn test_bold_stripped() {
        assert_eq!(sanitize("**Hello**", only(true, false, false)), "Hello");
        assert_eq!(sanitize("__Hello__ *there* _you_", only(true, false, false)), "Hello there you");
    }

    #[test]
    fn test_emphasis_kept_when_disabled() {
        assert_eq!(sanitize("**Hello**", only(false, false, false)), "**Hello**");
    }

    #[test]
    fn test_quotes_stripped_once() {
        assert_eq!(sanitize("\"Hi\"", only(false, true, false)), "Hi");
        assert_eq!(sanitize("'Hi'", only(false, true, false)), "Hi");
        assert_eq!(sanitize("\"\"Hi\"\"", only(false, true, false)), "\"Hi\"");
        assert_eq!(sanitize("\"Hi'", only(false, true, false)), "\"Hi'");
        assert_eq!(sanitize("\"", only(false, true, false)), "\"");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(sanitize("hello", only(false, false, true)), "Hello");
        assert_eq!(sanitize("h", only(false, false, true)), "H");
        assert_eq!(sanitize("", only(false, false, true)), "");
        assert_eq!(sanitize("élan", only(false, false, true)), "Élan");
    }

    #[test]
    fn test_quote_stripped_before_capitalization() {
        assert_eq!(sanitize("\"hello\"", ALL), "Hello");
    }

    #[test]
    fn test_code_fences_removed() {
        assert_eq!(sanitize("```text\nSome text\n```", ALL), "Some text");
        assert_eq!(sanitize("inline ```x``` fence", only(false, false, false)), "inline x fence");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitize("  \n spaced out \n", SanitizeOptions::default()), "spaced out");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "```\n**Bold** and _it_\n```",
            "  \"quoted\"  ",
            "plain text",
            "'single'",
            "mixed **a** and __b__",
        ];
        for input in inputs {
            let once = sanitize(input, ALL);
            assert_eq!(sanitize(&once, ALL), once, "input: {input:?}");
        }
    }
}
