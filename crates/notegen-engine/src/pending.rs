//! Outstanding AI edits.
//!
//! Starting an edit hands the caller an [`EditRequest`]: the ticket that
//! identifies the edit plus the generation request to run. The editor keeps
//! the matching [`PendingEdit`] until the caller comes back with the result
//! for that ticket.

use std::fmt;

use crate::dom::NodeId;
use crate::editing::{CellAction, EditKind, EditTag, Placement, TextRange};
use crate::generation::GenerationRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a pending edit will change once its result arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    /// The section headed by whichever node carries `tag` at resolution time
    Section { tag: EditTag, kind: EditKind },
    /// A text selection, only valid against document `version`
    Selection {
        range: TextRange,
        version: u64,
        kind: EditKind,
        selected: String,
    },
    Cell { cell: NodeId, action: CellAction },
    /// Body cells of one column, top to bottom
    Column { index: usize, cells: Vec<NodeId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub ticket: Ticket,
    pub target: EditTarget,
}

/// Handed out when an edit starts; run `request` and resolve `ticket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub ticket: Ticket,
    pub request: GenerationRequest,
}

/// Result of a resolved edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub placement: Placement,
    /// Top-level nodes inserted, or cells whose content was replaced
    pub changed: Vec<NodeId>,
    pub version: u64,
}
