//! Heuristic geometry queries: document size and element bounding boxes.
//!
//! Transforms are ignored and text is measured with the same 0.6 em
//! per-character estimate the layout code uses.

use super::{ElementKind, NodeId, SvgDocument, local_name};
use crate::geometry::BoundingBox;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;

/// Per-character width as a fraction of the font size.
pub const CHAR_WIDTH_EM: f64 = 0.6;

const FALLBACK_FONT_SIZE: f64 = 16.0;
const FALLBACK_LINE_HEIGHT: f64 = 1.25;

/// Parses a length such as `210`, `210mm`, `12.5px`, `10pt`.
///
/// Unit suffixes are stripped without conversion; anything else
/// (`%`, `em`, garbage) yields `None`.
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = ["px", "mm", "pt"]
        .iter()
        .find_map(|unit| value.strip_suffix(unit))
        .unwrap_or(value);
    number.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn view_box(doc: &SvgDocument, id: NodeId) -> Option<(f64, f64)> {
    let raw = doc.attribute(id, "viewBox")?;
    let parts: Vec<f64> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => Some((*width, *height)),
        _ => None,
    }
}

/// Width and height of the document: `width`/`height` attributes, then the
/// `viewBox`, then 800x600.
pub fn document_size(doc: &SvgDocument) -> (f64, f64) {
    let root = doc.root();
    let view = view_box(doc, root);
    let width = doc
        .attribute(root, "width")
        .and_then(parse_length)
        .or(view.map(|(w, _)| w))
        .unwrap_or(DEFAULT_WIDTH);
    let height = doc
        .attribute(root, "height")
        .and_then(parse_length)
        .or(view.map(|(_, h)| h))
        .unwrap_or(DEFAULT_HEIGHT);
    (width, height)
}

fn number(doc: &SvgDocument, id: NodeId, name: &str) -> Option<f64> {
    doc.attribute(id, name).and_then(parse_length)
}

fn number_or_zero(doc: &SvgDocument, id: NodeId, name: &str) -> f64 {
    number(doc, id, name).unwrap_or(0.0)
}

/// Font size from the `style` attribute, then the `font-size` attribute,
/// then the nearest ancestor that sets one.
fn font_size(doc: &SvgDocument, id: NodeId) -> f64 {
    let mut current = Some(id);
    while let Some(node) = current {
        let from_style = doc.style(node).get("font-size").and_then(parse_length);
        if let Some(size) = from_style.or_else(|| number(doc, node, "font-size")) {
            return size;
        }
        current = doc.parent(node);
    }
    FALLBACK_FONT_SIZE
}

/// Direct text runs of a text element, one per line-producing child.
fn text_lines(doc: &SvgDocument, id: NodeId) -> Vec<String> {
    let mut lines = vec![doc.leading_text(id)];
    for child in doc.child_elements(id) {
        let run = doc.leading_text(child);
        if doc.attribute(child, "dy").is_some() || doc.is_kind(child, ElementKind::FlowPara) {
            lines.push(run);
        } else if let Some(last) = lines.last_mut() {
            last.push_str(&run);
        }
        if let Some(last) = lines.last_mut() {
            last.push_str(&doc.tail_text(child));
        }
    }
    lines.retain(|line| !line.trim().is_empty());
    lines
}

fn text_box(doc: &SvgDocument, id: NodeId) -> Option<BoundingBox> {
    let lines = text_lines(doc, id);
    if lines.is_empty() {
        return None;
    }
    let size = font_size(doc, id);
    let longest = lines
        .iter()
        .map(|line| line.trim().chars().count())
        .max()
        .unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let (width, height) = (
        longest as f64 * size * CHAR_WIDTH_EM,
        lines.len() as f64 * size * FALLBACK_LINE_HEIGHT,
    );

    let (x, y) = match doc.kind(id) {
        Some(ElementKind::FlowRoot) => doc
            .descendants(id)
            .into_iter()
            .find(|node| {
                doc.element(*node)
                    .is_some_and(|e| local_name(e.name()) == "flowRegion")
            })
            .and_then(|region| {
                doc.descendants(region)
                    .into_iter()
                    .skip(1)
                    .find_map(|shape| bounding_box(doc, shape))
            })
            .map_or((0.0, size), |region| (region.x, region.y + size)),
        _ => (number_or_zero(doc, id, "x"), number_or_zero(doc, id, "y")),
    };

    let shift = match doc.style(id).get("text-anchor") {
        Some("middle") => width / 2.0,
        Some("end") => width,
        _ => 0.0,
    };
    Some(BoundingBox::new(x - shift, y - size, width, height))
}

fn group_box(doc: &SvgDocument, id: NodeId) -> Option<BoundingBox> {
    doc.child_elements(id)
        .filter_map(|child| bounding_box(doc, child))
        .reduce(|acc, next| acc.union(&next))
}

/// Estimated bounding box of an element. `None` for shapes the estimate
/// does not cover (paths, polygons, empty text).
pub fn bounding_box(doc: &SvgDocument, id: NodeId) -> Option<BoundingBox> {
    let element = doc.element(id)?;
    match element.kind() {
        ElementKind::Text | ElementKind::FlowRoot => return text_box(doc, id),
        ElementKind::Group => return group_box(doc, id),
        _ => {}
    }
    match local_name(element.name()) {
        "rect" | "image" | "use" | "svg" => {
            let width = number(doc, id, "width")?;
            let height = number(doc, id, "height")?;
            Some(BoundingBox::new(
                number_or_zero(doc, id, "x"),
                number_or_zero(doc, id, "y"),
                width,
                height,
            ))
        }
        "circle" => {
            let r = number(doc, id, "r")?;
            let (cx, cy) = (number_or_zero(doc, id, "cx"), number_or_zero(doc, id, "cy"));
            Some(BoundingBox::new(cx - r, cy - r, r * 2.0, r * 2.0))
        }
        "ellipse" => {
            let rx = number(doc, id, "rx")?;
            let ry = number(doc, id, "ry")?;
            let (cx, cy) = (number_or_zero(doc, id, "cx"), number_or_zero(doc, id, "cy"));
            Some(BoundingBox::new(cx - rx, cy - ry, rx * 2.0, ry * 2.0))
        }
        "line" => {
            let (x1, y1) = (number_or_zero(doc, id, "x1"), number_or_zero(doc, id, "y1"));
            let (x2, y2) = (number_or_zero(doc, id, "x2"), number_or_zero(doc, id, "y2"));
            Some(BoundingBox::new(
                x1.min(x2),
                y1.min(y2),
                (x2 - x1).abs(),
                (y2 - y1).abs(),
            ))
        }
        _ => None,
    }
}
