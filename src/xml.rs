//! Deterministic XML element tree
//!
//! Every document this crate emits (pool/test QTI, the IMS manifest, the
//! per-asset descriptor files) is assembled from this tree and serialized
//! in one pass. Attribute and child order is insertion order, so identical
//! build sequences produce byte-identical output. Escaping is delegated to
//! `quick_xml`; no pretty-printing, Blackboard does not need it.

use std::fmt;

use quick_xml::escape::escape;

/// A single XML element: name, ordered attributes, ordered child nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Child(Element),
    Text(String),
}

impl Element {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().to_string(),
            attrs: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Builder-style attribute append. Order is preserved on output.
    pub fn attr(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.attrs
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    /// Builder-style text content append. The text is escaped on output,
    /// so markup passed here survives as literal text (the QTI dialect
    /// carries HTML inside `mat_formattedtext` exactly this way).
    pub fn text(mut self, text: impl AsRef<str>) -> Self {
        self.nodes.push(Node::Text(text.as_ref().to_string()));
        self
    }

    /// Builder-style child append.
    pub fn child(mut self, child: Element) -> Self {
        self.nodes.push(Node::Child(child));
        self
    }

    /// Appends a child and returns a mutable reference to it, for
    /// incremental assembly of container elements.
    pub fn push(&mut self, child: Element) -> &mut Element {
        self.nodes.push(Node::Child(child));
        match self.nodes.last_mut() {
            Some(Node::Child(el)) => el,
            _ => unreachable!("push appended a child node"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serializes the element without an XML declaration.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        self.write_into(&mut out);
        out
    }

    /// Serializes the element as a standalone document with the UTF-8
    /// declaration the Blackboard importer expects.
    pub fn to_document(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.nodes.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for node in &self.nodes {
            match node {
                Node::Child(el) => el.write_into(out),
                Node::Text(text) => out.push_str(&escape(text.as_str())),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}
