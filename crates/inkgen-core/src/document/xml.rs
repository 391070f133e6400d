//! SVG parsing and serialization on top of quick-xml.

use std::fmt::Write as _;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};

use super::{Element, NodeData, NodeId, SvgDocument};

fn utf8(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)
        .context("Document is not valid UTF-8")?
        .to_string())
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.context("Malformed attribute")?;
        let key = utf8(attribute.key.as_ref())?;
        let value = attribute
            .unescape_value()
            .with_context(|| format!("Malformed value for attribute `{key}`"))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

impl SvgDocument {
    /// Parses an SVG document.
    ///
    /// Everything outside the element tree (declaration, doctype, comments,
    /// processing instructions, whitespace) is kept so that serialization
    /// reproduces it.
    pub fn parse(source: &str) -> Result<Self> {
        let mut doc = SvgDocument::empty();
        let mut reader = Reader::from_str(source);
        let mut stack = vec![SvgDocument::DOCUMENT];

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .with_context(|| format!("Invalid SVG near byte {position}"))?;
            let parent = *stack.last().unwrap_or(&SvgDocument::DOCUMENT);
            match event {
                Event::Start(start) => {
                    let node = doc.alloc(NodeData::Element(element_from(&start)?));
                    doc.append_child(parent, node);
                    stack.push(node);
                }
                Event::Empty(start) => {
                    let node = doc.alloc(NodeData::Element(element_from(&start)?));
                    doc.append_child(parent, node);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    // Entities declared in an internal DTD are left as written.
                    let content = match text.unescape() {
                        Ok(content) => content.into_owned(),
                        Err(_) => utf8(&text)?,
                    };
                    let node = doc.alloc(NodeData::Text(content));
                    doc.append_child(parent, node);
                }
                Event::CData(data) => {
                    let node = doc.alloc(NodeData::CData(utf8(&data)?));
                    doc.append_child(parent, node);
                }
                Event::Comment(comment) => {
                    let node = doc.alloc(NodeData::Comment(utf8(&comment)?));
                    doc.append_child(parent, node);
                }
                Event::Decl(decl) => {
                    let node = doc.alloc(NodeData::Declaration(utf8(&decl)?));
                    doc.append_child(parent, node);
                }
                Event::PI(pi) => {
                    let node = doc.alloc(NodeData::ProcessingInstruction(utf8(&pi)?));
                    doc.append_child(parent, node);
                }
                Event::DocType(doctype) => {
                    let node = doc.alloc(NodeData::Doctype(utf8(&doctype)?));
                    doc.append_child(parent, node);
                }
                Event::Eof => break,
            }
        }

        if stack.len() > 1 {
            bail!("Invalid SVG: unexpected end of document");
        }
        let root = doc.root();
        match doc.element(root) {
            Some(element) if super::local_name(element.name()) == "svg" => Ok(doc),
            Some(element) => bail!("Expected an <svg> root element, found <{}>", element.name()),
            None => bail!("Document has no root element"),
        }
    }

    /// Serializes every node attached to the document.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        for child in self.children(SvgDocument::DOCUMENT) {
            self.write_node(*child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            NodeData::Document => {}
            NodeData::Element(element) => {
                out.push('<');
                out.push_str(element.name());
                for (key, value) in element.attributes() {
                    let _ = write!(out, " {key}=\"{}\"", escape(value.as_str()));
                }
                let children = self.children(id);
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in children {
                    self.write_node(*child, out);
                }
                let _ = write!(out, "</{}>", element.name());
            }
            NodeData::Text(text) => out.push_str(&partial_escape(text.as_str())),
            NodeData::CData(data) => {
                let _ = write!(out, "<![CDATA[{data}]]>");
            }
            NodeData::Comment(comment) => {
                let _ = write!(out, "<!--{comment}-->");
            }
            NodeData::ProcessingInstruction(body) | NodeData::Declaration(body) => {
                let _ = write!(out, "<?{body}?>");
            }
            NodeData::Doctype(body) => {
                let _ = write!(out, "<!DOCTYPE {body}>");
            }
        }
    }
}

impl std::fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_xml_string())
    }
}
