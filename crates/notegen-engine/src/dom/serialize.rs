//! HTML serialization with optional filtering.
//!
//! [`Serializer::raw`] writes the document exactly as stored; it is what
//! goes into undo history. Filtering serializers drop editing-only markup
//! on the way out (edit target tags, affordance buttons) without touching
//! the live tree.

use notegen_markup::{is_raw_text_element, is_void_element};

use super::{Document, NodeId, NodeKind};

#[derive(Debug, Clone, Default)]
pub struct Serializer {
    /// Attributes omitted from every element
    strip_attributes: Vec<String>,
    /// Elements carrying any of these classes are omitted with their subtree
    drop_classes: Vec<String>,
    /// Write `<font>` elements as `<span>`, keeping only their `style`
    unwrap_font: bool,
}

impl Serializer {
    pub fn raw() -> Self {
        Self::default()
    }

    pub fn strip_attribute(mut self, name: &str) -> Self {
        self.strip_attributes.push(name.to_string());
        self
    }

    pub fn drop_class(mut self, class: &str) -> Self {
        self.drop_classes.push(class.to_string());
        self
    }

    pub fn unwrap_font(mut self) -> Self {
        self.unwrap_font = true;
        self
    }

    pub fn outer_html(&self, doc: &Document, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(doc, id, &mut out);
        out
    }

    pub fn inner_html(&self, doc: &Document, id: NodeId) -> String {
        let mut out = String::new();
        self.write_children(doc, id, &mut out);
        out
    }

    /// Outer HTML of several nodes, concatenated.
    pub fn nodes_html(&self, doc: &Document, ids: &[NodeId]) -> String {
        let mut out = String::new();
        for id in ids {
            self.write_node(doc, *id, &mut out);
        }
        out
    }

    fn write_children(&self, doc: &Document, id: NodeId, out: &mut String) {
        for child in doc.children(id) {
            self.write_node(doc, *child, out);
        }
    }

    fn write_node(&self, doc: &Document, id: NodeId, out: &mut String) {
        match doc.kind(id) {
            None => {}
            Some(NodeKind::Root) => self.write_children(doc, id, out),
            Some(NodeKind::Text(text)) => {
                let verbatim = doc
                    .parent(id)
                    .and_then(|parent| doc.tag_name(parent))
                    .is_some_and(is_raw_text_element);
                if verbatim {
                    out.push_str(text);
                } else {
                    out.push_str(&html_escape::encode_text(text));
                }
            }
            Some(NodeKind::Comment(body)) => {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
            Some(NodeKind::Element(element)) => {
                if self
                    .drop_classes
                    .iter()
                    .any(|class| element.has_class(class))
                {
                    return;
                }

                let font = self.unwrap_font && element.name == "font";
                let name = if font { "span" } else { element.name.as_str() };

                out.push('<');
                out.push_str(name);
                for (key, value) in &element.attributes {
                    if self.strip_attributes.iter().any(|strip| strip == key) {
                        continue;
                    }
                    if font && key != "style" {
                        continue;
                    }
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(name) {
                    return;
                }
                self.write_children(doc, id, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}
