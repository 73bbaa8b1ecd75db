//! Section-scoped editing.
//!
//! The pieces an AI edit is built from: locating the section a start node
//! heads ([`section`]), marking it so it can be found again after the
//! document has been re-rendered ([`tag`]), addressing free text selections
//! ([`selection`]) and structural table changes ([`table`]). The
//! [`Editor`](crate::Editor) ties them to history and storage.

pub mod section;
pub mod selection;
pub mod table;
pub mod tag;

use crate::dom::{DomError, NodeId};
use crate::generation::{GenerationError, Task};

pub use section::{Section, context_html, level_of, locate_section, section_anchors};
pub use selection::{RangeError, TextPoint, TextRange};
pub use table::TableError;
pub use tag::{EDIT_TAG_ATTRIBUTE, EditTag};

/// The kinds of AI edit offered on a section or selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    Rewrite,
    Expand,
    Continue,
    NextTopic,
    Diagram,
    Table,
}

/// Where a generated fragment goes relative to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The fragment takes the target's place
    Replace,
    /// The fragment goes after the target, which stays as it was
    Append,
}

impl EditKind {
    pub const ALL: [EditKind; 6] = [
        EditKind::Rewrite,
        EditKind::Expand,
        EditKind::Continue,
        EditKind::NextTopic,
        EditKind::Diagram,
        EditKind::Table,
    ];

    pub fn placement(self) -> Placement {
        match self {
            EditKind::Continue | EditKind::NextTopic | EditKind::Diagram => Placement::Append,
            EditKind::Rewrite | EditKind::Expand | EditKind::Table => Placement::Replace,
        }
    }

    pub fn task(self) -> Task {
        match self {
            EditKind::Rewrite => Task::Rewrite,
            EditKind::Expand => Task::Expand,
            EditKind::Continue => Task::Continue,
            EditKind::NextTopic => Task::NextTopic,
            EditKind::Diagram => Task::Diagram,
            EditKind::Table => Task::Table,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EditKind::Rewrite => "Rewrite",
            EditKind::Expand => "Expand",
            EditKind::Continue => "Continue",
            EditKind::NextTopic => "Next topic",
            EditKind::Diagram => "Diagram",
            EditKind::Table => "Table",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellAction {
    Rewrite,
    Expand,
}

impl CellAction {
    pub fn task(self) -> Task {
        match self {
            CellAction::Rewrite => Task::CellRewrite,
            CellAction::Expand => Task::CellExpand,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Another edit is already in progress")]
    Busy,
    #[error("No pending edit for this ticket")]
    UnknownTicket,
    #[error("Node {0:?} does not exist")]
    NodeNotFound(NodeId),
    #[error("Node {0:?} cannot start a section")]
    NotASectionStart(NodeId),
    #[error("Node {0:?} is not a table cell")]
    NotACell(NodeId),
    #[error("Selection is empty")]
    EmptySelection,
    #[error("Invalid selection: {0}")]
    InvalidRange(#[from] RangeError),
    #[error("Column {0} has no data to rewrite")]
    EmptyColumn(usize),
    #[error("There is no document to extend")]
    EmptyDocument,
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Generator returned nothing")]
    EmptyResult,
    #[error("Edit target is no longer in the document")]
    LostPosition,
    #[error("Document changed since the selection was made")]
    StaleSelection,
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Dom(#[from] DomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EditKind::Rewrite, Placement::Replace)]
    #[case(EditKind::Expand, Placement::Replace)]
    #[case(EditKind::Table, Placement::Replace)]
    #[case(EditKind::Continue, Placement::Append)]
    #[case(EditKind::NextTopic, Placement::Append)]
    #[case(EditKind::Diagram, Placement::Append)]
    fn placement_per_kind(#[case] kind: EditKind, #[case] placement: Placement) {
        assert_eq!(kind.placement(), placement);
    }
}
