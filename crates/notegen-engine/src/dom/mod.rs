//! # Owned Document Tree
//!
//! The document is an arena of nodes addressed by [`NodeId`]. It is the
//! single source of truth for the editor: whatever a front-end displays is
//! rendered from it, and every mutation goes through [`Document`] methods.
//!
//! ## Node identity
//!
//! A [`NodeId`] is a slot index plus a generation. Removing a node frees
//! its slot for later allocations and bumps the slot's generation, so an id
//! names the same node for the lifetime of the document, or nothing at all
//! once that node is gone. Replacing the whole content (undo, redo, loading
//! a draft) frees every existing node, so every previously handed-out id
//! stops resolving while the arena stays the size of the live document.
//!
//! ## Versioning
//!
//! Every mutation increments [`Document::version`]. Callers that capture a
//! position which is only meaningful against one exact state (a text
//! selection, for instance) record the version and compare it later.

mod builder;
mod serialize;

use std::ops::Range;

pub use serialize::Serializer;

/// Handle to a node in the document arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// An element's tag name and attributes, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Where to put new nodes relative to existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before(NodeId),
    After(NodeId),
    AppendTo(NodeId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
}

/// Arena-backed HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    /// Indexes of empty slots, reused before the arena grows
    free: Vec<usize>,
    root: NodeId,
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document containing only the root.
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node {
                    kind: NodeKind::Root,
                    parent: None,
                    children: Vec::new(),
                }),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            version: 0,
        }
    }

    /// Parse an HTML fragment into a fresh document.
    pub fn parse(html: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.root;
        builder::build_into(&mut doc, root, html);
        doc.version = 0;
        doc
    }

    /// Replace the entire content with `html`.
    ///
    /// All previously issued node ids stop resolving; the new content
    /// reuses their slots under new generations.
    pub fn set_html(&mut self, html: &str) {
        let root = self.root;
        for child in std::mem::take(&mut self.node_mut_unchecked(root).children) {
            self.release_subtree(child);
        }
        builder::build_into(self, root, html);
        self.version += 1;
    }

    /// Serialize the whole document, exactly as stored.
    pub fn to_html(&self) -> String {
        Serializer::raw().inner_html(self, self.root)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|node| &node.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.name.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
            .collect()
    }

    /// The next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        siblings[index + 1..]
            .iter()
            .copied()
            .find(|sibling| self.element(*sibling).is_some())
    }

    /// Pre-order walk of `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every live element below the root, in document order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.element(*id).is_some())
            .collect()
    }

    /// Elements below `scope` with the given tag name, in document order.
    pub fn elements_named(&self, scope: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| *id != scope && self.tag_name(*id) == Some(name))
            .collect()
    }

    /// Closest inclusive ancestor with the given tag name.
    pub fn closest(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.tag_name(node) == Some(name) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.text(node))
            .collect()
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        Serializer::raw().outer_html(self, id)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        Serializer::raw().inner_html(self, id)
    }

    // Mutation

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let element = self.element_mut(id)?;
        match element.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element
                .attributes
                .push((name.to_string(), value.to_string())),
        }
        self.version += 1;
        Ok(())
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, DomError> {
        let element = self.element_mut(id)?;
        let before = element.attributes.len();
        element.attributes.retain(|(key, _)| key != name);
        let removed = element.attributes.len() != before;
        if removed {
            self.version += 1;
        }
        Ok(removed)
    }

    /// Replace the text of a text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        let node = self.node_mut(id).ok_or(DomError::NodeNotFound(id))?;
        match &mut node.kind {
            NodeKind::Text(existing) => *existing = text.to_string(),
            _ => return Err(DomError::NotText(id)),
        }
        self.version += 1;
        Ok(())
    }

    /// Create a detached node and place it at `position`.
    pub fn insert_node(&mut self, kind: NodeKind, position: Position) -> Result<NodeId, DomError> {
        let (parent, index) = self.resolve_position(position)?;
        let id = self.alloc(kind);
        self.attach(parent, index, &[id]);
        self.version += 1;
        Ok(id)
    }

    /// Parse `html` and place the resulting top-level nodes at `position`.
    ///
    /// Returns the inserted top-level nodes in order.
    pub fn insert_html(&mut self, html: &str, position: Position) -> Result<Vec<NodeId>, DomError> {
        let (parent, index) = self.resolve_position(position)?;
        let holder = self.alloc(NodeKind::Root);
        builder::build_into(self, holder, html);
        let fragment = std::mem::take(&mut self.node_mut_unchecked(holder).children);
        self.release(holder);
        self.attach(parent, index, &fragment);
        self.version += 1;
        Ok(fragment)
    }

    /// Replace the children of `id` with the parsed `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        if !self.can_have_children(id) {
            return Err(DomError::NotAContainer(id));
        }
        for child in self.children(id).to_vec() {
            self.remove(child)?;
        }
        self.insert_html(html, Position::AppendTo(id))
    }

    /// Detach `id` and free it together with its subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.root {
            return Err(DomError::Detached(id));
        }
        let parent = self.parent(id).ok_or(DomError::NodeNotFound(id))?;
        self.node_mut_unchecked(parent)
            .children
            .retain(|child| *child != id);
        self.release_subtree(id);
        self.version += 1;
        Ok(())
    }

    /// Position of `id` among its parent's children.
    pub fn child_index(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let index = self.children(parent).iter().position(|c| *c == id)?;
        Some((parent, index))
    }

    /// Text nodes below `scope` in document order with their byte spans in
    /// the concatenated text content.
    pub fn text_spans(&self, scope: NodeId) -> Vec<(NodeId, Range<usize>)> {
        let mut offset = 0;
        self.descendants(scope)
            .into_iter()
            .filter_map(|id| {
                let text = self.text(id)?;
                let span = offset..offset + text.len();
                offset = span.end;
                Some((id, span))
            })
            .collect()
    }

    // Internals shared with the builder

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            kind,
            parent: None,
            children: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index) else {
            return;
        };
        if slot.generation == id.generation && slot.node.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    fn release_subtree(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            self.release(node);
        }
    }

    pub(crate) fn append_raw(&mut self, parent: NodeId, child: NodeId) {
        let index = self.children(parent).len();
        self.attach(parent, index, &[child]);
    }

    fn attach(&mut self, parent: NodeId, index: usize, children: &[NodeId]) {
        for child in children {
            self.node_mut_unchecked(*child).parent = Some(parent);
        }
        let siblings = &mut self.node_mut_unchecked(parent).children;
        let index = index.min(siblings.len());
        siblings.splice(index..index, children.iter().copied());
    }

    fn resolve_position(&self, position: Position) -> Result<(NodeId, usize), DomError> {
        match position {
            Position::AppendTo(parent) => {
                if !self.can_have_children(parent) {
                    return Err(DomError::NotAContainer(parent));
                }
                Ok((parent, self.children(parent).len()))
            }
            Position::Before(sibling) | Position::After(sibling) => {
                if !self.contains(sibling) {
                    return Err(DomError::NodeNotFound(sibling));
                }
                let (parent, index) = self
                    .child_index(sibling)
                    .ok_or(DomError::Detached(sibling))?;
                let offset = usize::from(matches!(position, Position::After(_)));
                Ok((parent, index + offset))
            }
        }
    }

    fn can_have_children(&self, id: NodeId) -> bool {
        match self.kind(id) {
            Some(NodeKind::Root) => true,
            Some(NodeKind::Element(element)) => !notegen_markup::is_void_element(&element.name),
            _ => false,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Only for ids this module has just resolved or allocated.
    fn node_mut_unchecked(&mut self, id: NodeId) -> &mut Node {
        match self.node_mut(id) {
            Some(node) => node,
            None => unreachable!("node {id:?} resolved but freed"),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) => Ok(element),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::NodeNotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first_named(doc: &Document, name: &str) -> NodeId {
        doc.elements_named(doc.root(), name)[0]
    }

    #[test]
    fn parse_and_serialize_round_trip() {
        let html = r#"<h2 class="t">Intro</h2><p>One &amp; two</p><ul><li>a</li></ul>"#;
        let doc = Document::parse(html);
        assert_eq!(doc.to_html(), html);
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn next_element_sibling_skips_text() {
        let doc = Document::parse("<h2>A</h2>\n<p>B</p>");
        let h2 = first_named(&doc, "h2");
        let p = first_named(&doc, "p");
        assert_eq!(doc.next_element_sibling(h2), Some(p));
        assert_eq!(doc.next_element_sibling(p), None);
    }

    #[test]
    fn removed_nodes_stop_resolving() {
        let mut doc = Document::parse("<div><p>x</p></div>");
        let div = first_named(&doc, "div");
        let p = first_named(&doc, "p");
        doc.remove(div).unwrap();
        assert!(!doc.contains(div));
        assert!(!doc.contains(p));
        assert!(doc.is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut doc = Document::parse("<p>x</p>");
        let p = first_named(&doc, "p");
        doc.remove(p).unwrap();
        let inserted = doc
            .insert_html("<p>y</p>", Position::AppendTo(doc.root()))
            .unwrap();
        assert_ne!(inserted[0], p);
        assert!(!doc.contains(p));
    }

    #[test]
    fn insert_html_before_and_after() {
        let mut doc = Document::parse("<p>b</p>");
        let p = first_named(&doc, "p");
        doc.insert_html("<p>a</p>", Position::Before(p)).unwrap();
        doc.insert_html("<p>c</p><p>d</p>", Position::After(p))
            .unwrap();
        assert_eq!(doc.to_html(), "<p>a</p><p>b</p><p>c</p><p>d</p>");
    }

    #[test]
    fn mutations_bump_version() {
        let mut doc = Document::parse("<p>a</p>");
        let p = first_named(&doc, "p");
        doc.set_attribute(p, "id", "x").unwrap();
        assert_eq!(doc.version(), 1);
        assert!(!doc.remove_attribute(p, "missing").unwrap());
        assert_eq!(doc.version(), 1);
        doc.set_html("<p>b</p>");
        assert_eq!(doc.version(), 2);
        assert!(!doc.contains(p));
    }

    #[test]
    fn freed_slots_are_reused_under_a_new_generation() {
        let mut doc = Document::parse("<p>x</p>");
        let p = first_named(&doc, "p");
        doc.remove(p).unwrap();
        let inserted = doc
            .insert_html("<p>y</p>", Position::AppendTo(doc.root()))
            .unwrap();
        let q = first_named(&doc, "p");
        assert_eq!(q.index, p.index);
        assert_ne!(q.generation, p.generation);
        assert_eq!(inserted[0], q);
    }

    #[test]
    fn arena_stays_the_size_of_the_live_document() {
        let mut doc = Document::parse("<h2>A</h2><p>b</p>");
        let slots = doc.slots.len();
        for i in 0..1000 {
            doc.set_html(&format!("<h2>A</h2><p>{i}</p>"));
        }
        assert_eq!(doc.slots.len(), slots);
        assert_eq!(doc.elements().len(), 2);
    }

    #[test]
    fn set_html_invalidates_old_ids() {
        let mut doc = Document::parse("<div><p>a</p><p>b</p></div>");
        let second = doc.elements_named(doc.root(), "p")[1];
        doc.set_html("<p>only</p>");
        assert!(!doc.contains(second));
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let mut doc = Document::parse("<td>old <b>x</b></td>");
        let td = first_named(&doc, "td");
        doc.set_inner_html(td, "<i>new</i>").unwrap();
        assert_eq!(doc.to_html(), "<td><i>new</i></td>");
    }

    #[test]
    fn void_elements_reject_children() {
        let mut doc = Document::parse("<br>");
        let br = first_named(&doc, "br");
        assert_eq!(
            doc.insert_html("x", Position::AppendTo(br)),
            Err(DomError::NotAContainer(br))
        );
    }

    #[test]
    fn text_spans_follow_document_order() {
        let doc = Document::parse("<p>ab<b>cd</b></p><p>e</p>");
        let spans: Vec<_> = doc
            .text_spans(doc.root())
            .into_iter()
            .map(|(_, span)| span)
            .collect();
        assert_eq!(spans, vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn closest_and_class_lookup() {
        let doc = Document::parse(r#"<table class="data wide"><tr><td>x</td></tr></table>"#);
        let td = first_named(&doc, "td");
        let table = doc.closest(td, "table").unwrap();
        assert!(doc.element(table).unwrap().has_class("wide"));
        assert!(!doc.element(table).unwrap().has_class("wid"));
    }
}
