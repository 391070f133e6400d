//! Finds the text an edit operation works on.
//!
//! The selection is walked in order and the first text-bearing element with
//! non-empty content wins: a `<text>`, a `<flowRoot>`, the first text found
//! depth-first inside a group, or any `<text>` below some other element.

use crate::document::{ElementKind, NodeData, NodeId, Style, SvgDocument};

/// Text located in the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedText {
    /// The `<text>` or `<flowRoot>` element the text was read from.
    pub node: NodeId,
    pub kind: ElementKind,
    pub text: String,
    pub style: Style,
}

/// All character data below `id`, in document order.
fn inline_text(doc: &SvgDocument, id: NodeId) -> String {
    doc.descendants(id)
        .into_iter()
        .skip(1)
        .filter_map(|node| match doc.data(node) {
            NodeData::Text(text) | NodeData::CData(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn join_runs(runs: impl IntoIterator<Item = String>) -> String {
    runs.into_iter()
        .map(|run| run.trim().to_string())
        .filter(|run| !run.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Leading text plus, for every child element, its inline text and tail.
fn runs_of(doc: &SvgDocument, id: NodeId) -> Vec<String> {
    let mut runs = vec![doc.leading_text(id)];
    for child in doc.child_elements(id) {
        runs.push(inline_text(doc, child));
        runs.push(doc.tail_text(child));
    }
    runs
}

/// Text of a `<text>` element: its own runs followed by its tail.
pub fn extract_text(doc: &SvgDocument, id: NodeId) -> String {
    let mut runs = runs_of(doc, id);
    runs.push(doc.tail_text(id));
    join_runs(runs)
}

/// Text of a `<flowRoot>`: the runs of every `<flowPara>` below it.
pub fn extract_flow_text(doc: &SvgDocument, id: NodeId) -> String {
    join_runs(
        doc.descendants(id)
            .into_iter()
            .filter(|node| doc.is_kind(*node, ElementKind::FlowPara))
            .flat_map(|para| runs_of(doc, para)),
    )
}

/// First `<text>` or `<flowRoot>` inside a group, depth-first in child order.
pub fn find_text_in_group(doc: &SvgDocument, group: NodeId) -> Option<NodeId> {
    doc.child_elements(group).find_map(|child| match doc.kind(child) {
        Some(ElementKind::Text | ElementKind::FlowRoot) => Some(child),
        Some(ElementKind::Group) => find_text_in_group(doc, child),
        _ => None,
    })
}

fn read(doc: &SvgDocument, node: NodeId) -> Option<SelectedText> {
    let kind = doc.kind(node)?;
    let text = match kind {
        ElementKind::Text => extract_text(doc, node),
        ElementKind::FlowRoot => extract_flow_text(doc, node),
        _ => return None,
    };
    (!text.is_empty()).then(|| SelectedText {
        node,
        kind,
        text,
        style: doc.style(node),
    })
}

/// Returns the first selected text with non-empty content, or `None`.
pub fn locate_text(doc: &SvgDocument, selection: &[NodeId]) -> Option<SelectedText> {
    selection.iter().find_map(|&node| match doc.kind(node)? {
        ElementKind::Text | ElementKind::FlowRoot => read(doc, node),
        ElementKind::Group => read(doc, find_text_in_group(doc, node)?),
        _ => doc
            .descendants(node)
            .into_iter()
            .filter(|candidate| doc.is_kind(*candidate, ElementKind::Text))
            .find_map(|candidate| read(doc, candidate)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> SvgDocument {
        SvgDocument::parse(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg">{body}</svg>"#
        ))
        .unwrap()
    }

    fn select(doc: &SvgDocument, ids: &[&str]) -> Vec<NodeId> {
        ids.iter().map(|id| doc.find_by_id(id).unwrap()).collect()
    }

    #[test]
    fn test_plain_text_with_tspans() {
        let d = doc(
            r#"<text id="t" style="font-size:12px">Hello <tspan>big <tspan>bold</tspan></tspan> world</text>"#,
        );
        let found = locate_text(&d, &select(&d, &["t"])).unwrap();
        assert_eq!(found.text, "Hello big bold world");
        assert_eq!(found.kind, ElementKind::Text);
        assert_eq!(found.style.get("font-size"), Some("12px"));
    }

    #[test]
    fn test_inkscape_line_tspans() {
        let d = doc(
            r#"<text id="t" x="0" y="0"><tspan sodipodi:role="line" x="0" y="0">First line</tspan><tspan sodipodi:role="line" x="0" y="20">Second line</tspan></text>"#,
        );
        assert_eq!(
            extract_text(&d, d.find_by_id("t").unwrap()),
            "First line Second line"
        );
    }

    #[test]
    fn test_flow_root_paragraphs() {
        let d = doc(
            r#"<flowRoot id="f"><flowRegion><rect width="100" height="100"/></flowRegion><flowPara>One <flowSpan>two</flowSpan> three</flowPara><flowPara>four</flowPara></flowRoot>"#,
        );
        let found = locate_text(&d, &select(&d, &["f"])).unwrap();
        assert_eq!(found.kind, ElementKind::FlowRoot);
        assert_eq!(found.text, "One two three four");
    }

    #[test]
    fn test_group_search_is_depth_first() {
        let d = doc(
            r#"<g id="outer"><rect width="1" height="1"/><g><text id="inner">deep</text></g><text id="later">shallow</text></g>"#,
        );
        let found = locate_text(&d, &select(&d, &["outer"])).unwrap();
        assert_eq!(found.node, d.find_by_id("inner").unwrap());
        assert_eq!(found.text, "deep");
    }

    #[test]
    fn test_group_with_flow_text_uses_flow_extraction() {
        let d = doc(r#"<g id="g"><flowRoot id="f"><flowPara>para</flowPara></flowRoot></g>"#);
        let found = locate_text(&d, &select(&d, &["g"])).unwrap();
        assert_eq!(found.node, d.find_by_id("f").unwrap());
        assert_eq!(found.text, "para");
    }

    #[test]
    fn test_other_element_scans_subtree() {
        let d = doc(r#"<a id="link"><text id="t">linked</text></a>"#);
        let found = locate_text(&d, &select(&d, &["link"])).unwrap();
        assert_eq!(found.node, d.find_by_id("t").unwrap());
    }

    #[test]
    fn test_empty_candidates_fall_through_to_next_selected() {
        let d = doc(r#"<text id="empty">   </text><rect id="r" width="1" height="1"/><text id="t">next</text>"#);
        let found = locate_text(&d, &select(&d, &["empty", "r", "t"])).unwrap();
        assert_eq!(found.text, "next");
    }

    #[test]
    fn test_none_for_empty_or_textless_selection() {
        let d = doc(r#"<rect id="r" width="1" height="1"/>"#);
        assert!(locate_text(&d, &[]).is_none());
        assert!(locate_text(&d, &select(&d, &["r"])).is_none());
    }
}
