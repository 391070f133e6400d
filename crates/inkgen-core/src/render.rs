//! Writes generated text into the document.

use crate::config::Config;
use crate::document::{ElementKind, NodeId, Style, SvgDocument};
use crate::geometry::BoundingBox;
use crate::layout::{LayoutResult, wrap_text};
use crate::locator::SelectedText;

/// Id prefix of inserted text groups.
pub const GROUP_ID_PREFIX: &str = "ai-text";

/// Style for text created (or restyled) from the configuration.
pub fn text_style(config: &Config) -> Style {
    let mut style = Style::new();
    style.set("font-family", config.font_family.as_str());
    style.set("font-size", format!("{}px", config.effective_font_size()));
    style.set("font-weight", config.font_weight.as_str());
    style.set("font-style", config.font_style.as_str());
    style.set("fill", config.text_color.as_str());
    style.set("text-anchor", config.text_align.id());
    if let Some(decoration) = config.decoration() {
        style.set("text-decoration", decoration);
    }
    if config.letter_spacing != 0.0 {
        style.set("letter-spacing", format!("{}px", config.letter_spacing));
    }
    if config.word_spacing != 0.0 {
        style.set("word-spacing", format!("{}px", config.word_spacing));
    }
    style
}

fn background_style(config: &Config) -> Style {
    let mut style = Style::new();
    style.set("fill", config.bg_color.as_str());
    style.set("fill-opacity", config.bg_opacity.to_string());
    style.set("stroke", "none");
    style
}

/// Font size in a `font-size` declaration (`12px`, `9pt`, `14`).
fn declared_font_size(style: &Style) -> Option<f64> {
    let value = style.get("font-size")?.trim();
    let number = value
        .strip_suffix("px")
        .or_else(|| value.strip_suffix("pt"))
        .unwrap_or(value);
    number.trim().parse().ok()
}

/// Children for a text element: the first line as direct text, every further
/// line as a `tspan` starting a new line at `x`.
fn line_nodes(doc: &mut SvgDocument, lines: &[String], x: &str, line_step: f64) -> Vec<NodeId> {
    let mut nodes = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            if !line.is_empty() {
                nodes.push(doc.create_text(line.as_str()));
            }
            continue;
        }
        let tspan = doc.create_element(ElementKind::Tspan);
        doc.set_attribute(tspan, "x", x);
        doc.set_attribute(tspan, "dy", line_step.to_string());
        let text = doc.create_text(line.as_str());
        doc.append_child(tspan, text);
        nodes.push(tspan);
    }
    nodes
}

fn background_rect(doc: &mut SvgDocument, bbox: BoundingBox, config: &Config) -> NodeId {
    let rect = doc.create_element(ElementKind::Rect);
    doc.set_attribute(rect, "x", bbox.x.to_string());
    doc.set_attribute(rect, "y", bbox.y.to_string());
    doc.set_attribute(rect, "width", bbox.width.to_string());
    doc.set_attribute(rect, "height", bbox.height.to_string());
    doc.set_style(rect, &background_style(config));
    rect
}

/// Inserts a new text group into the current layer and returns the group.
///
/// The group gets a unique `ai-text` id and holds the optional background
/// rectangle followed by the text element.
pub fn insert_text_block(doc: &mut SvgDocument, layout: &LayoutResult, config: &Config) -> NodeId {
    let group = doc.create_element(ElementKind::Group);
    let id = doc.unique_id(GROUP_ID_PREFIX);
    doc.set_attribute(group, "id", id);

    if let Some(bbox) = layout.bounding_box {
        let rect = background_rect(doc, bbox, config);
        doc.append_child(group, rect);
    }

    let x = layout.position.x.to_string();
    let text = doc.create_element(ElementKind::Text);
    doc.set_attribute(text, "x", x.as_str());
    doc.set_attribute(text, "y", layout.position.y.to_string());
    doc.set_style(text, &text_style(config));
    let line_step = config.effective_font_size() * config.line_height;
    let children = line_nodes(doc, &layout.lines, &x, line_step);
    doc.replace_children(text, children);
    doc.append_child(group, text);

    let layer = doc.current_layer();
    doc.append_child(layer, group);
    group
}

/// Replaces the content of the located text with `new_text`.
pub fn rewrite_text(doc: &mut SvgDocument, target: &SelectedText, new_text: &str, config: &Config) {
    match target.kind {
        ElementKind::FlowRoot => rewrite_flow_text(doc, target.node, new_text),
        _ => rewrite_plain_text(doc, target.node, new_text, config),
    }
}

/// Rewrites a `<text>` in place. Position attributes stay; the style is
/// either kept with a rescaled font size or replaced from the configuration.
fn rewrite_plain_text(doc: &mut SvgDocument, node: NodeId, new_text: &str, config: &Config) {
    let lines = wrap_text(new_text, config);
    let x = doc.attribute(node, "x").unwrap_or("0").to_string();

    let (style, font_size) = if config.preserve_style {
        let mut style = doc.style(node);
        let base = declared_font_size(&style).unwrap_or(config.font_size);
        let scaled = base * config.text_scale;
        style.set("font-size", format!("{scaled}px"));
        (style, scaled)
    } else {
        (text_style(config), config.effective_font_size())
    };

    let children = line_nodes(doc, &lines, &x, font_size * config.line_height);
    doc.set_style(node, &style);
    doc.replace_children(node, children);
}

/// Puts `new_text` into the first `<flowPara>` of a `<flowRoot>`, creating
/// one when there is none.
fn rewrite_flow_text(doc: &mut SvgDocument, node: NodeId, new_text: &str) {
    let text = doc.create_text(new_text);
    let para = doc
        .child_elements(node)
        .find(|child| doc.is_kind(*child, ElementKind::FlowPara));
    match para {
        Some(para) => doc.replace_children(para, vec![text]),
        None => {
            let para = doc.create_element(ElementKind::FlowPara);
            doc.append_child(para, text);
            doc.append_child(node, para);
        }
    }
}
