//! # notegen engine
//!
//! Document model and editing core for notegen: an owned HTML document
//! tree, linear undo history over whole-document snapshots, and the
//! section-scoped AI edit protocol that splices generated fragments back
//! into the right place once a generator answers.
//!
//! ```rust
//! use notegen_engine::{EditKind, Editor, MemoryDraftStore};
//!
//! let mut editor = Editor::open(MemoryDraftStore::new());
//! editor.load_generated("<h2>Rust</h2><p>Fast.</p><h2>Go</h2>").unwrap();
//!
//! let start = editor.document().elements()[0];
//! let edit = editor.begin_section_edit(start, EditKind::Rewrite, "").unwrap();
//! assert_eq!(edit.request.context, "<h2>Rust</h2><p>Fast.</p>");
//!
//! editor.resolve(edit.ticket, Ok("<h2>Rust</h2><p>Fast and safe.</p>".into())).unwrap();
//! assert_eq!(editor.html(), "<h2>Rust</h2><p>Fast and safe.</p><h2>Go</h2>");
//!
//! editor.undo();
//! assert_eq!(editor.html(), "<h2>Rust</h2><p>Fast.</p><h2>Go</h2>");
//! ```

pub mod dom;
pub mod editing;
pub mod editor;
pub mod export;
pub mod generation;
pub mod history;
pub mod pending;
pub mod storage;

pub use dom::{Document, DomError, NodeId, NodeKind, Position};
pub use editing::{CellAction, EditError, EditKind, Placement, Section, TextPoint, TextRange};
pub use editor::{DocumentSource, Editor};
pub use export::clean_html;
pub use generation::{
    AnswerType, CommandGenerator, ContentGenerator, DEFAULT_LANGUAGE, GenerationError,
    GenerationRequest, GenerationSettings, ModelTier, OutputFormat, Task, UpscOptions, WordLimit,
    clean_model_output,
};
pub use history::History;
pub use pending::{EditOutcome, EditRequest, EditTarget, PendingEdit, Ticket};
pub use storage::{DraftStore, FileDraftStore, MemoryDraftStore, StorageError};
