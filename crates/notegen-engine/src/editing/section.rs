use crate::dom::{Document, NodeId, Serializer};
use crate::editing::tag::EDIT_TAG_ATTRIBUTE;

/// Level given to anything that is not a sectioning heading.
pub const LEAF_LEVEL: u8 = 10;

/// Class of containers the editor treats like a table (diagrams).
pub const FLOWCHART_CLASS: &str = "flowchart-container";

/// Classes of editing affordances that never belong to document content.
pub const AFFORDANCE_CLASSES: &[&str] = &[
    "ai-edit-trigger",
    "cell-actions",
    "row-delete-btn",
    "row-add-btn",
    "col-delete-btn",
    "col-add-btn",
    "col-rewrite-btn",
    "col-resize-handle",
    "no-print",
];

/// Heading rank of a tag: 1-4 for `h1`..`h4`, [`LEAF_LEVEL`] otherwise.
pub fn level_of(tag: &str) -> u8 {
    match tag.to_ascii_lowercase().as_str() {
        "h1" => 1,
        "h2" => 2,
        "h3" => 3,
        "h4" => 4,
        _ => LEAF_LEVEL,
    }
}

/// A contiguous run of sibling elements anchored at a start node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub start: NodeId,
    /// Start node first, then each following member in order
    pub nodes: Vec<NodeId>,
    pub level: u8,
}

impl Section {
    pub fn first(&self) -> NodeId {
        self.start
    }

    pub fn last(&self) -> NodeId {
        self.nodes.last().copied().unwrap_or(self.start)
    }

    pub fn is_leaf(&self) -> bool {
        self.level == LEAF_LEVEL
    }
}

/// Compute the section that starts at `start`.
///
/// A heading swallows every following element sibling of a strictly
/// greater level and stops at the first one of equal or lower level. Any
/// other element is a section on its own. Returns `None` when `start` is
/// not a live element.
pub fn locate_section(doc: &Document, start: NodeId) -> Option<Section> {
    let level = level_of(doc.tag_name(start)?);
    let mut nodes = vec![start];

    if level != LEAF_LEVEL {
        let mut next = doc.next_element_sibling(start);
        while let Some(sibling) = next {
            if doc.tag_name(sibling).map_or(LEAF_LEVEL, level_of) <= level {
                break;
            }
            nodes.push(sibling);
            next = doc.next_element_sibling(sibling);
        }
    }

    Some(Section {
        start,
        nodes,
        level,
    })
}

/// Nodes an edit affordance is offered on, in document order: headings
/// `h1`-`h4`, list items, tables and diagram containers.
pub fn section_anchors(doc: &Document) -> Vec<NodeId> {
    doc.elements()
        .into_iter()
        .filter(|id| is_anchor(doc, *id))
        .collect()
}

fn is_anchor(doc: &Document, id: NodeId) -> bool {
    let Some(element) = doc.element(id) else {
        return false;
    };
    if AFFORDANCE_CLASSES.iter().any(|class| element.has_class(class)) {
        return false;
    }
    matches!(
        element.name.as_str(),
        "h1" | "h2" | "h3" | "h4" | "li" | "table"
    ) || element.has_class(FLOWCHART_CLASS)
}

/// Serializer that removes edit tags and affordance markup.
pub fn context_serializer() -> Serializer {
    AFFORDANCE_CLASSES
        .iter()
        .fold(Serializer::raw().strip_attribute(EDIT_TAG_ATTRIBUTE), |s, class| {
            s.drop_class(class)
        })
}

/// The section's content as handed to a content generator.
pub fn context_html(doc: &Document, section: &Section) -> String {
    context_serializer().nodes_html(doc, &section.nodes)
}
