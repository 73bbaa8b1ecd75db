//! Edit target tags.
//!
//! A tag is a `data-edit-id` attribute placed on a section's start node
//! while a generation request for that section is outstanding. Because it
//! lives in the markup, it survives the document being re-rendered from a
//! snapshot, and lookup by tag finds the node again afterwards.
//!
//! At most one node carries a tag at any time.

use std::fmt;

use uuid::Uuid;

use crate::dom::{Document, DomError, NodeId};

pub const EDIT_TAG_ATTRIBUTE: &str = "data-edit-id";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditTag(String);

impl EditTag {
    pub fn new() -> Self {
        Self(format!("edit-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EditTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EditTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag `node` with a fresh tag, first stripping any existing one.
pub fn attach(doc: &mut Document, node: NodeId) -> Result<EditTag, DomError> {
    if doc.element(node).is_none() {
        return Err(if doc.contains(node) {
            DomError::NotAnElement(node)
        } else {
            DomError::NodeNotFound(node)
        });
    }
    strip_all(doc);
    let tag = EditTag::new();
    doc.set_attribute(node, EDIT_TAG_ATTRIBUTE, tag.as_str())?;
    Ok(tag)
}

/// The node currently carrying `tag`.
pub fn find(doc: &Document, tag: &EditTag) -> Option<NodeId> {
    doc.elements()
        .into_iter()
        .find(|id| doc.attribute(*id, EDIT_TAG_ATTRIBUTE) == Some(tag.as_str()))
}

/// Every node carrying some tag.
pub fn tagged_nodes(doc: &Document) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|id| doc.attribute(*id, EDIT_TAG_ATTRIBUTE).is_some())
        .collect()
}

/// Remove `tag` if it is still present. Returns whether it was.
pub fn strip(doc: &mut Document, tag: &EditTag) -> bool {
    match find(doc, tag) {
        Some(node) => doc
            .remove_attribute(node, EDIT_TAG_ATTRIBUTE)
            .unwrap_or(false),
        None => false,
    }
}

pub fn strip_all(doc: &mut Document) {
    for node in tagged_nodes(doc) {
        // tagged_nodes only yields live elements
        let _ = doc.remove_attribute(node, EDIT_TAG_ATTRIBUTE);
    }
}
