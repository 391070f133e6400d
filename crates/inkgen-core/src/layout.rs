//! Text layout: anchor position, greedy word wrap, background box estimate.
//!
//! Everything here is a pure function of the text, the configuration and a
//! few document measurements; nothing touches the document tree.

use crate::config::{Config, PositionMode, TextAlign};
use crate::document::CHAR_WIDTH_EM;
use crate::geometry::{BoundingBox, Point};

/// Distance of the edge anchors from the document border.
pub const EDGE_MARGIN: f64 = 50.0;

/// Lines and placement of a text block about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub lines: Vec<String>,
    pub position: Point,
    /// Background panel bounds, when a background is requested.
    pub bounding_box: Option<BoundingBox>,
}

/// Estimated width of one character at the effective font size.
pub fn char_width(config: &Config) -> f64 {
    config.effective_font_size() * CHAR_WIDTH_EM
}

/// How many characters fit on one line of `max_width`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn max_chars_per_line(config: &Config) -> usize {
    // Float-to-int casts saturate; a zero font size means "no limit".
    (config.max_width / char_width(config)).floor() as usize
}

/// Greedy word wrap. A word joins the current line while
/// `line_chars + word_chars + words_on_line <= max_chars`; over-long words
/// get a line of their own. Input without words comes back as one line.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    let mut line_chars = 0usize;

    for word in text.split_whitespace() {
        let word_chars = word.chars().count();
        if line_chars + word_chars + line.len() <= max_chars {
            line.push(word);
            line_chars += word_chars;
        } else {
            if !line.is_empty() {
                lines.push(line.join(" "));
            }
            line = vec![word];
            line_chars = word_chars;
        }
    }
    if !line.is_empty() {
        lines.push(line.join(" "));
    }

    if lines.is_empty() {
        vec![text.to_string()]
    } else {
        lines
    }
}

pub fn wrap_text(text: &str, config: &Config) -> Vec<String> {
    wrap_words(text, max_chars_per_line(config))
}

/// Insertion point for new text.
///
/// `selection_center` is the center of the first selected element's
/// bounding box; it is only used in cursor mode, where the document center
/// stands in when it is missing.
pub fn resolve_position(
    config: &Config,
    (width, height): (f64, f64),
    selection_center: Option<Point>,
) -> Point {
    let (right, bottom) = (width - EDGE_MARGIN, height - EDGE_MARGIN);
    let (mid_x, mid_y) = (width / 2.0, height / 2.0);
    let base = match config.position_mode {
        PositionMode::Center => Point::new(mid_x, mid_y),
        PositionMode::TopLeft => Point::new(EDGE_MARGIN, EDGE_MARGIN),
        PositionMode::TopCenter => Point::new(mid_x, EDGE_MARGIN),
        PositionMode::TopRight => Point::new(right, EDGE_MARGIN),
        PositionMode::BottomLeft => Point::new(EDGE_MARGIN, bottom),
        PositionMode::BottomCenter => Point::new(mid_x, bottom),
        PositionMode::BottomRight => Point::new(right, bottom),
        PositionMode::MiddleLeft => Point::new(EDGE_MARGIN, mid_y),
        PositionMode::MiddleRight => Point::new(right, mid_y),
        PositionMode::Cursor => selection_center.unwrap_or(Point::new(mid_x, mid_y)),
    };
    base.offset(config.x_offset, config.y_offset)
}

/// Background box around `lines` drawn at `position`, padded by
/// `bg_padding`. The top sits one font size above the baseline.
pub fn estimate_bbox(lines: &[String], position: Point, config: &Config) -> BoundingBox {
    let font_size = config.effective_font_size();
    let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);

    #[allow(clippy::cast_precision_loss)]
    let width = longest as f64 * char_width(config);
    #[allow(clippy::cast_precision_loss)]
    let height = lines.len() as f64 * font_size * config.line_height;

    let x = match config.text_align {
        TextAlign::Start => position.x,
        TextAlign::Middle => position.x - width / 2.0,
        TextAlign::End => position.x - width,
    };
    BoundingBox::new(x, position.y - font_size, width, height).padded(config.bg_padding)
}

/// Lays out `text` for insertion as a new text block.
pub fn layout(
    text: &str,
    config: &Config,
    document_size: (f64, f64),
    selection_center: Option<Point>,
) -> LayoutResult {
    let lines = wrap_text(text, config);
    let position = resolve_position(config, document_size, selection_center);
    let bounding_box = config
        .use_background
        .then(|| estimate_bbox(&lines, position, config));
    LayoutResult {
        lines,
        position,
        bounding_box,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_of(lines: &[String]) -> Vec<String> {
        lines
            .iter()
            .flat_map(|line| line.split_whitespace().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_wrap_packs_greedily() {
        assert_eq!(wrap_words("one two three", 10), vec!["one two", "three"]);
    }

    #[test]
    fn test_wrap_long_word_gets_own_line() {
        assert_eq!(
            wrap_words("a supercalifragilistic b", 5),
            vec!["a", "supercalifragilistic", "b"]
        );
    }

    #[test]
    fn test_wrap_empty_input_is_single_line() {
        assert_eq!(wrap_words("", 10), vec![""]);
        assert_eq!(wrap_words("   ", 10), vec!["   "]);
    }

    #[test]
    fn test_wrap_keeps_word_order() {
        let text = "The quick brown fox jumps over the lazy dog while the cat watches \
                    from a very comfortable windowsill nearby";
        for max in [0, 1, 5, 10, 17, 40, 1000] {
            let lines = wrap_words(text, max);
            assert_eq!(
                words_of(&lines),
                text.split_whitespace().map(str::to_string).collect::<Vec<_>>(),
                "max_chars = {max}"
            );
        }
    }

    #[test]
    fn test_max_chars_from_font_size() {
        // 24px * 0.6 = 14.4px per char; 600 / 14.4 = 41.66
        assert_eq!(max_chars_per_line(&Config::default()), 41);
        let scaled = Config {
            text_scale: 2.0,
            ..Config::default()
        };
        assert_eq!(max_chars_per_line(&scaled), 20);
    }

    #[test]
    fn test_top_right_anchor() {
        let cfg = Config {
            position_mode: PositionMode::TopRight,
            ..Config::default()
        };
        assert_eq!(resolve_position(&cfg, (800.0, 600.0), None), Point::new(750.0, 50.0));
    }

    #[test]
    fn test_anchor_applies_offsets() {
        let cfg = Config {
            position_mode: PositionMode::BottomLeft,
            x_offset: 5.0,
            y_offset: -10.0,
            ..Config::default()
        };
        assert_eq!(resolve_position(&cfg, (800.0, 600.0), None), Point::new(55.0, 540.0));
    }

    #[test]
    fn test_cursor_uses_selection_center_or_document_center() {
        let cfg = Config {
            position_mode: PositionMode::Cursor,
            x_offset: 1.0,
            ..Config::default()
        };
        assert_eq!(
            resolve_position(&cfg, (800.0, 600.0), Some(Point::new(10.0, 20.0))),
            Point::new(11.0, 20.0)
        );
        assert_eq!(resolve_position(&cfg, (800.0, 600.0), None), Point::new(401.0, 300.0));
    }

    #[test]
    fn test_bbox_alignment_and_padding() {
        let cfg = Config {
            font_size: 10.0,
            line_height: 1.5,
            bg_padding: 2.0,
            text_align: TextAlign::Middle,
            ..Config::default()
        };
        let lines = vec!["abcd".to_string(), "ab".to_string()];
        let bbox = estimate_bbox(&lines, Point::new(100.0, 100.0), &cfg);
        // width 4 * 6 = 24, height 2 * 15 = 30
        assert!((bbox.x - (100.0 - 12.0 - 2.0)).abs() < 1e-9);
        assert!((bbox.y - (100.0 - 10.0 - 2.0)).abs() < 1e-9);
        assert!((bbox.width - 28.0).abs() < 1e-9);
        assert!((bbox.height - 34.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_box_only_with_background() {
        let plain = layout("hello", &Config::default(), (800.0, 600.0), None);
        assert_eq!(plain.lines, vec!["hello"]);
        assert_eq!(plain.position, Point::new(400.0, 300.0));
        assert!(plain.bounding_box.is_none());

        let cfg = Config {
            use_background: true,
            ..Config::default()
        };
        assert!(layout("hello", &cfg, (800.0, 600.0), None).bounding_box.is_some());
    }
}
