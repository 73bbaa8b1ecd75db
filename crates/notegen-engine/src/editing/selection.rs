//! Text selections over the document tree.
//!
//! A [`TextRange`] runs between two points inside text nodes. It plays the
//! role a live DOM range plays in a browser editor, with one difference:
//! nothing keeps it up to date when the tree changes. Callers that hold a
//! range across other edits must check the document version themselves.

use std::ops::Range;

use crate::dom::{Document, DomError, NodeId, NodeKind, Position};

/// A byte offset inside a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPoint {
    pub node: NodeId,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub start: TextPoint,
    pub end: TextPoint,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("node {0:?} is not a live text node")]
    NotText(NodeId),
    #[error("offset {offset} is not a character boundary in node {node:?}")]
    BadOffset { node: NodeId, offset: usize },
    #[error("range ends before it starts")]
    Backwards,
    #[error(transparent)]
    Dom(#[from] DomError),
}

impl TextRange {
    pub fn new(start: TextPoint, end: TextPoint) -> Self {
        Self { start, end }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Range over `offsets` of the concatenated text content below `scope`.
    ///
    /// A boundary that falls between two text nodes attaches to the end of
    /// the earlier one for the start and to the later one for the end, so a
    /// selection never starts with an empty slice of a node.
    pub fn from_text_offsets(doc: &Document, scope: NodeId, offsets: Range<usize>) -> Option<Self> {
        if offsets.start > offsets.end {
            return None;
        }
        let spans = doc.text_spans(scope);
        let start = spans
            .iter()
            .find(|(_, span)| span.start <= offsets.start && offsets.start < span.end)
            .or_else(|| spans.iter().rev().find(|(_, span)| span.end == offsets.start))?;
        let end = spans
            .iter()
            .find(|(_, span)| span.start < offsets.end && offsets.end <= span.end)
            .or_else(|| spans.iter().find(|(_, span)| span.start == offsets.end))?;

        Some(Self {
            start: TextPoint {
                node: start.0,
                offset: offsets.start - start.1.start,
            },
            end: TextPoint {
                node: end.0,
                offset: offsets.end - end.1.start,
            },
        })
    }

    /// Range over the first occurrence of `needle` in the text below `scope`.
    pub fn find(doc: &Document, scope: NodeId, needle: &str) -> Option<Self> {
        if needle.is_empty() {
            return None;
        }
        let start = doc.text_content(scope).find(needle)?;
        Self::from_text_offsets(doc, scope, start..start + needle.len())
    }
}

/// Check that `range` addresses live text in forward document order.
pub fn validate(doc: &Document, range: &TextRange) -> Result<(), RangeError> {
    for point in [range.start, range.end] {
        let text = doc.text(point.node).ok_or(RangeError::NotText(point.node))?;
        if !text.is_char_boundary(point.offset) {
            return Err(RangeError::BadOffset {
                node: point.node,
                offset: point.offset,
            });
        }
    }

    if range.start.node == range.end.node {
        if range.start.offset > range.end.offset {
            return Err(RangeError::Backwards);
        }
        return Ok(());
    }

    let order = doc.descendants(doc.root());
    let position = |node| order.iter().position(|id| *id == node);
    match (position(range.start.node), position(range.end.node)) {
        (Some(start), Some(end)) if start < end => Ok(()),
        _ => Err(RangeError::Backwards),
    }
}

/// The plain text covered by `range`.
pub fn selected_text(doc: &Document, range: &TextRange) -> Result<String, RangeError> {
    validate(doc, range)?;
    let (start, end) = (range.start, range.end);
    if start.node == end.node {
        let text = doc.text(start.node).unwrap_or_default();
        return Ok(text[start.offset..end.offset].to_string());
    }

    let mut out = String::new();
    let mut inside = false;
    for id in doc.descendants(doc.root()) {
        let Some(text) = doc.text(id) else {
            continue;
        };
        if id == start.node {
            out.push_str(&text[start.offset..]);
            inside = true;
        } else if id == end.node {
            out.push_str(&text[..end.offset]);
            break;
        } else if inside {
            out.push_str(text);
        }
    }
    Ok(out)
}

/// Delete the contents of `range` and insert `html` where it started.
///
/// Elements partially covered by the range (ancestors of the end point)
/// are kept; elements fully inside it are removed. Returns the inserted
/// top-level nodes.
pub fn replace_range(doc: &mut Document, range: &TextRange, html: &str) -> Result<Vec<NodeId>, RangeError> {
    validate(doc, range)?;
    let (start, end) = (range.start, range.end);
    let start_text = doc.text(start.node).unwrap_or_default().to_string();

    if start.node == end.node {
        let tail = start_text[end.offset..].to_string();
        doc.set_text(start.node, &start_text[..start.offset])?;
        let inserted = doc.insert_html(html, Position::After(start.node))?;
        if !tail.is_empty() {
            let anchor = inserted.last().copied().unwrap_or(start.node);
            doc.insert_node(NodeKind::Text(tail), Position::After(anchor))?;
        }
        drop_if_empty(doc, start.node)?;
        return Ok(inserted);
    }

    let end_text = doc.text(end.node).unwrap_or_default().to_string();
    let order = doc.descendants(doc.root());
    let first = order.iter().position(|id| *id == start.node).unwrap_or(0);
    let last = order
        .iter()
        .position(|id| *id == end.node)
        .unwrap_or(order.len());
    for id in &order[first + 1..last] {
        if doc.contains(*id) && !doc.is_ancestor_of(*id, end.node) {
            doc.remove(*id)?;
        }
    }

    doc.set_text(start.node, &start_text[..start.offset])?;
    doc.set_text(end.node, &end_text[end.offset..])?;
    let inserted = doc.insert_html(html, Position::After(start.node))?;
    drop_if_empty(doc, start.node)?;
    drop_if_empty(doc, end.node)?;
    Ok(inserted)
}

fn drop_if_empty(doc: &mut Document, text_node: NodeId) -> Result<(), DomError> {
    if doc.text(text_node) == Some("") {
        doc.remove(text_node)?;
    }
    Ok(())
}
