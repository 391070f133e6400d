//! In-memory SVG document.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Detached nodes stay
//! in the arena but are never serialized. Text is stored as child `Text`
//! nodes, so an element's leading text and a child's trailing text are just
//! the text siblings around element children.

mod bounds;
mod style;
mod xml;

pub use bounds::{CHAR_WIDTH_EM, parse_length};
pub use style::Style;

use crate::geometry::BoundingBox;
use tracing::warn;

/// Handle to a node in an [`SvgDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Element kinds the text pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<text>`
    Text,
    /// `<tspan>`
    Tspan,
    /// `<flowRoot>`
    FlowRoot,
    /// `<flowPara>`
    FlowPara,
    /// `<g>` (including layers)
    Group,
    /// `<rect>`
    Rect,
    Other,
}

impl ElementKind {
    /// Classifies an element by its local name.
    pub fn from_name(name: &str) -> ElementKind {
        match local_name(name) {
            "text" => ElementKind::Text,
            "tspan" => ElementKind::Tspan,
            "flowRoot" => ElementKind::FlowRoot,
            "flowPara" => ElementKind::FlowPara,
            "g" => ElementKind::Group,
            "rect" => ElementKind::Rect,
            _ => ElementKind::Other,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            ElementKind::Text => "text",
            ElementKind::Tspan => "tspan",
            ElementKind::FlowRoot => "flowRoot",
            ElementKind::FlowPara => "flowPara",
            ElementKind::Group => "g",
            ElementKind::Rect => "rect",
            ElementKind::Other => "",
        }
    }
}

/// Strips a namespace prefix (`svg:text` -> `text`).
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

#[derive(Debug, Clone)]
pub struct Element {
    name: String,
    kind: ElementKind,
    attributes: Vec<(String, String)>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = ElementKind::from_name(&name);
        Self {
            name,
            kind,
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    /// Synthetic container for the prolog and the root element.
    Document,
    Element(Element),
    Text(String),
    CData(String),
    /// Raw (still escaped) comment body.
    Comment(String),
    /// Raw processing instruction body (`xml-stylesheet ...`).
    ProcessingInstruction(String),
    /// Raw XML declaration body (`xml version="1.0" ...`).
    Declaration(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed SVG document.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    nodes: Vec<Node>,
}

impl SvgDocument {
    const DOCUMENT: NodeId = NodeId(0);
    const CURRENT_LAYER_ATTR: &'static str = "inkscape:current-layer";

    fn empty() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// The synthetic document node holding the prolog and the root element.
    pub fn document_node(&self) -> NodeId {
        Self::DOCUMENT
    }

    /// The root `<svg>` element (the first top-level element).
    pub fn root(&self) -> NodeId {
        self.children(Self::DOCUMENT)
            .iter()
            .copied()
            .find(|id| self.element(*id).is_some())
            .unwrap_or(Self::DOCUMENT)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Element kind, or `None` for non-element nodes.
    pub fn kind(&self, id: NodeId) -> Option<ElementKind> {
        self.element(id).map(Element::kind)
    }

    pub fn is_kind(&self, id: NodeId, kind: ElementKind) -> bool {
        self.kind(id) == Some(kind)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children only, in document order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Pre-order traversal of `id` and all of its descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, keeping its position if it already exists.
    /// No-op on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let Some(element) = self.element_mut(id) else {
            return;
        };
        match element.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => element.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            element.attributes.retain(|(key, _)| key != name);
        }
    }

    pub fn style(&self, id: NodeId) -> Style {
        self.attribute(id, "style").map(Style::parse).unwrap_or_default()
    }

    pub fn set_style(&mut self, id: NodeId, style: &Style) {
        if style.is_empty() {
            self.remove_attribute(id, "style");
        } else {
            self.set_attribute(id, "style", style.to_string());
        }
    }

    /// Finds an attached element by `id` attribute.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(Self::DOCUMENT)
            .into_iter()
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// Namespace prefix of the root element (`svg` for `<svg:svg>`), if any.
    fn svg_prefix(&self) -> Option<&str> {
        let name = self.element(self.root())?.name();
        name.rsplit_once(':').map(|(prefix, _)| prefix)
    }

    /// Creates a detached element. The root's namespace prefix is reused.
    pub fn create_element(&mut self, kind: ElementKind) -> NodeId {
        let name = match self.svg_prefix() {
            Some(prefix) => format!("{prefix}:{}", kind.tag()),
            None => kind.tag().to_string(),
        };
        self.alloc(NodeData::Element(Element::new(name)))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeData::Text(text.into()))
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != child);
        }
    }

    /// Appends `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) == Some(parent) {
            self.detach(child);
        }
    }

    /// Swaps the whole child list of `parent` in one step.
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for old in std::mem::take(&mut self.nodes[parent.0].children) {
            self.nodes[old.0].parent = None;
        }
        for child in &children {
            self.detach(*child);
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children = children;
    }

    fn text_content(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) | NodeData::CData(text) => Some(text),
            _ => None,
        }
    }

    /// Text before the first element child (lxml's `.text`).
    pub fn leading_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .map_while(|child| self.text_content(*child))
            .collect()
    }

    /// Text between this node and its next element sibling (lxml's `.tail`).
    pub fn tail_text(&self, id: NodeId) -> String {
        let Some(parent) = self.parent(id) else {
            return String::new();
        };
        self.children(parent)
            .iter()
            .skip_while(|sibling| **sibling != id)
            .skip(1)
            .map_while(|sibling| self.text_content(*sibling))
            .collect()
    }

    /// Replaces the leading text of `id` with `text`.
    pub fn set_leading_text(&mut self, id: NodeId, text: &str) {
        let leading: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .take_while(|child| self.text_content(*child).is_some())
            .collect();
        for child in leading {
            self.detach(child);
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.insert_child(id, 0, node);
        }
    }

    /// Returns a fresh id: `prefix`, then `prefix-1`, `prefix-2`, ...
    pub fn unique_id(&self, prefix: &str) -> String {
        if self.find_by_id(prefix).is_none() {
            return prefix.to_string();
        }
        (1usize..)
            .map(|n| format!("{prefix}-{n}"))
            .find(|candidate| self.find_by_id(candidate).is_none())
            .unwrap_or_else(|| prefix.to_string())
    }

    /// Layer new content goes into: the `sodipodi:namedview` current layer
    /// when it names an existing element, else the root.
    pub fn current_layer(&self) -> NodeId {
        let root = self.root();
        self.child_elements(root)
            .find(|child| {
                self.element(*child)
                    .is_some_and(|e| local_name(e.name()) == "namedview")
            })
            .and_then(|view| self.attribute(view, Self::CURRENT_LAYER_ATTR))
            .and_then(|layer| self.find_by_id(layer))
            .unwrap_or(root)
    }

    /// Document size in user units (see [`bounds::document_size`]).
    pub fn size(&self) -> (f64, f64) {
        bounds::document_size(self)
    }

    /// Estimated rendered bounding box of `id`, transforms ignored.
    pub fn bounding_box(&self, id: NodeId) -> Option<BoundingBox> {
        bounds::bounding_box(self, id)
    }
}

/// Host state for one invocation: the document plus the ordered selection.
#[derive(Debug, Clone)]
pub struct EditContext {
    pub document: SvgDocument,
    pub selection: Vec<NodeId>,
}

impl EditContext {
    pub fn new(document: SvgDocument) -> Self {
        Self {
            document,
            selection: Vec::new(),
        }
    }

    /// Resolves selected element ids in order. Unknown ids are skipped
    /// with a warning, duplicates are kept once.
    pub fn with_selection<S: AsRef<str>>(document: SvgDocument, ids: &[S]) -> Self {
        let mut selection = Vec::new();
        for id in ids {
            let id = id.as_ref();
            match document.find_by_id(id) {
                Some(node) if !selection.contains(&node) => selection.push(node),
                Some(_) => {}
                None => warn!(id, "Selected element not found in document; skipping"),
            }
        }
        Self {
            document,
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd" width="800" height="600"><sodipodi:namedview id="view" inkscape:current-layer="layer1"/><g id="layer1" inkscape:groupmode="layer"><text id="t1" x="10" y="20">Hello <tspan id="s1">big</tspan> world</text></g></svg>"#;

    #[test]
    fn test_leading_and_tail_text() {
        let doc = SvgDocument::parse(SAMPLE).unwrap();
        let text = doc.find_by_id("t1").unwrap();
        let span = doc.find_by_id("s1").unwrap();
        assert_eq!(doc.leading_text(text), "Hello ");
        assert_eq!(doc.leading_text(span), "big");
        assert_eq!(doc.tail_text(span), " world");
        assert_eq!(doc.tail_text(text), "");
    }

    #[test]
    fn test_kind_classification() {
        let doc = SvgDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.kind(doc.find_by_id("t1").unwrap()), Some(ElementKind::Text));
        assert_eq!(doc.kind(doc.find_by_id("layer1").unwrap()), Some(ElementKind::Group));
        assert_eq!(ElementKind::from_name("svg:flowRoot"), ElementKind::FlowRoot);
        assert_eq!(ElementKind::from_name("circle"), ElementKind::Other);
    }

    #[test]
    fn test_current_layer_from_namedview() {
        let doc = SvgDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.current_layer(), doc.find_by_id("layer1").unwrap());

        let bare = SvgDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        assert_eq!(bare.current_layer(), bare.root());
    }

    #[test]
    fn test_unique_id_skips_taken() {
        let doc = SvgDocument::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="ai-text"/><g id="ai-text-1"/></svg>"#,
        )
        .unwrap();
        assert_eq!(doc.unique_id("ai-text"), "ai-text-2");
        assert_eq!(doc.unique_id("label"), "label");
    }

    #[test]
    fn test_replace_children_detaches_old() {
        let mut doc = SvgDocument::parse(SAMPLE).unwrap();
        let text = doc.find_by_id("t1").unwrap();
        let fresh = doc.create_text("Bye");
        doc.replace_children(text, vec![fresh]);

        assert_eq!(doc.children(text), &[fresh]);
        assert!(doc.find_by_id("s1").is_none());
        assert_eq!(doc.leading_text(text), "Bye");
    }

    #[test]
    fn test_set_leading_text_keeps_element_children() {
        let mut doc = SvgDocument::parse(SAMPLE).unwrap();
        let text = doc.find_by_id("t1").unwrap();
        doc.set_leading_text(text, "Goodbye ");
        assert_eq!(doc.leading_text(text), "Goodbye ");
        assert!(doc.find_by_id("s1").is_some());
    }

    #[test]
    fn test_create_element_reuses_root_prefix() {
        let mut doc =
            SvgDocument::parse(r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"/>"#).unwrap();
        let group = doc.create_element(ElementKind::Group);
        assert_eq!(doc.element(group).unwrap().name(), "svg:g");
        assert_eq!(doc.kind(group), Some(ElementKind::Group));
    }

    #[test]
    fn test_style_roundtrip_through_attribute() {
        let mut doc = SvgDocument::parse(SAMPLE).unwrap();
        let text = doc.find_by_id("t1").unwrap();
        let mut style = doc.style(text);
        assert!(style.is_empty());
        style.set("font-size", "12px");
        doc.set_style(text, &style);
        assert_eq!(doc.attribute(text, "style"), Some("font-size:12px"));
    }

    #[test]
    fn test_edit_context_resolves_selection_in_order() {
        let doc = SvgDocument::parse(SAMPLE).unwrap();
        let ctx = EditContext::with_selection(doc, &["s1", "missing", "t1", "s1"]);
        let expected = vec![
            ctx.document.find_by_id("s1").unwrap(),
            ctx.document.find_by_id("t1").unwrap(),
        ];
        assert_eq!(ctx.selection, expected);
    }
}
