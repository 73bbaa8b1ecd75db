//! The editing session.
//!
//! [`Editor`] owns the document, its undo history and the draft store, and
//! is the only way the document changes. Every change that completes pushes
//! the raw serialization to history and saves the clean export to the store.
//!
//! ## AI edits
//!
//! An AI edit is two calls with the generator run in between, wherever and
//! however the caller likes:
//!
//! 1. `begin_*` records the pre-edit state in history, marks the target,
//!    takes the single pending slot and returns an [`EditRequest`].
//! 2. [`Editor::resolve`] takes the generator's result for that ticket,
//!    finds the target again and splices the fragment in.
//!
//! Only one AI edit may be pending at a time; starting another fails with
//! [`EditError::Busy`]. A failed resolution leaves the serialized document
//! exactly as it was before the edit began.

use log::{debug, warn};

use crate::dom::{Document, NodeId, Position};
use crate::editing::section::context_serializer;
use crate::editing::{
    CellAction, EditError, EditKind, Placement, TextRange, locate_section, selection, table, tag,
};
use crate::export;
use crate::generation::{
    GenerationError, GenerationRequest, GenerationSettings, OutputFormat, Task, clean_model_output,
};
use crate::history::History;
use crate::pending::{EditOutcome, EditRequest, EditTarget, PendingEdit, Ticket};
use crate::storage::DraftStore;

/// Instruction sent with a column rewrite when the table has no header.
pub const DEFAULT_COLUMN_HEADER: &str = "Column";

/// Where the material for a whole new document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    /// The input names a topic to write about
    Topic,
    /// The input is raw text to turn into notes
    Text,
}

pub struct Editor<S: DraftStore> {
    document: Document,
    history: History,
    store: S,
    settings: GenerationSettings,
    pending: Option<PendingEdit>,
    next_ticket: u64,
}

impl<S: DraftStore> Editor<S> {
    /// Start a session from whatever draft `store` holds.
    pub fn open(store: S) -> Self {
        let draft = match store.load() {
            Ok(draft) => draft.unwrap_or_default(),
            Err(e) => {
                warn!("Could not load draft, starting empty: {e}");
                String::new()
            }
        };
        debug!("opening editor with {} byte draft", draft.len());

        // Seed with the re-serialized draft so later pushes compare equal
        let document = Document::parse(&draft);
        Self {
            history: History::seeded(document.to_html()),
            document,
            store,
            settings: GenerationSettings::default(),
            pending: None,
            next_ticket: 1,
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GenerationSettings {
        &mut self.settings
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The document as stored, editing state included.
    pub fn html(&self) -> String {
        self.document.to_html()
    }

    /// The document as exported.
    pub fn clean_html(&self) -> String {
        export::clean_html(&self.document)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref()
    }

    /// Request for a whole document in the configured format. Feed the
    /// result to [`Editor::load_generated`] or [`Editor::append_generated`].
    pub fn document_request(&self, source: DocumentSource, input: &str) -> GenerationRequest {
        let request = match source {
            DocumentSource::Topic => GenerationRequest::new(Task::Topic, "").with_instruction(input),
            DocumentSource::Text => GenerationRequest::new(Task::Text, input),
        };
        self.with_settings_applied(request)
            .with_format(self.settings.format, &self.settings.upsc)
    }

    /// Request for more rows in the current table, with the clean document
    /// as context. The generator answers with the complete table, old rows
    /// included, so the result goes to [`Editor::load_generated`].
    pub fn table_extension_request(&self, instruction: &str) -> Result<GenerationRequest, EditError> {
        if self.document.is_empty() {
            return Err(EditError::EmptyDocument);
        }
        let request = GenerationRequest::new(Task::ExtendTable, self.clean_html())
            .with_instruction(instruction);
        Ok(self
            .with_settings_applied(request)
            .with_format(OutputFormat::IncrementalTable, &self.settings.upsc))
    }

    // Whole-document operations

    /// Replace the document with freshly generated content.
    pub fn load_generated(&mut self, raw: &str) -> Result<(), EditError> {
        let html = clean_model_output(raw);
        if html.is_empty() {
            return Err(EditError::EmptyResult);
        }
        self.document.set_html(&html);
        self.commit();
        Ok(())
    }

    /// Add freshly generated content after the existing document.
    pub fn append_generated(&mut self, raw: &str) -> Result<Vec<NodeId>, EditError> {
        let html = clean_model_output(raw);
        if html.is_empty() {
            return Err(EditError::EmptyResult);
        }
        let root = self.document.root();
        let inserted = self.document.insert_html(&html, Position::AppendTo(root))?;
        self.commit();
        Ok(inserted)
    }

    /// Take the user's own edit of the whole document. Returns whether it
    /// differed from the current content.
    pub fn commit_input(&mut self, html: &str) -> bool {
        if html == self.document.to_html() {
            return false;
        }
        self.document.set_html(html);
        self.commit();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().map(str::to_string) else {
            return false;
        };
        self.document.set_html(&snapshot);
        self.persist();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().map(str::to_string) else {
            return false;
        };
        self.document.set_html(&snapshot);
        self.persist();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Empty the document, forget history and any pending edit, and drop
    /// the stored draft.
    pub fn clear(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("dropping pending edit {} on clear", pending.ticket);
        }
        self.document.set_html("");
        self.history.reset();
        if let Err(e) = self.store.clear() {
            warn!("Could not clear stored draft: {e}");
        }
    }

    // Table structure

    pub fn delete_row(&mut self, row: NodeId) -> Result<(), EditError> {
        table::delete_row(&mut self.document, row)?;
        self.commit();
        Ok(())
    }

    pub fn insert_row_after(&mut self, row: NodeId) -> Result<NodeId, EditError> {
        let inserted = table::insert_row_after(&mut self.document, row)?;
        self.commit();
        Ok(inserted)
    }

    /// Delete column `index` of the table containing `node`.
    pub fn delete_column(&mut self, node: NodeId, index: usize) -> Result<(), EditError> {
        let table = table::table_of(&self.document, node)?;
        table::delete_column(&mut self.document, table, index)?;
        self.commit();
        Ok(())
    }

    /// Insert a column after column `index` of the table containing `node`.
    pub fn insert_column_after(&mut self, node: NodeId, index: usize) -> Result<(), EditError> {
        let table = table::table_of(&self.document, node)?;
        table::insert_column_after(&mut self.document, table, index)?;
        self.commit();
        Ok(())
    }

    // Starting AI edits

    /// Start an edit of the section headed by `start`.
    pub fn begin_section_edit(
        &mut self,
        start: NodeId,
        kind: EditKind,
        instruction: &str,
    ) -> Result<EditRequest, EditError> {
        self.ensure_idle()?;
        if !self.document.contains(start) {
            return Err(EditError::NodeNotFound(start));
        }
        let section =
            locate_section(&self.document, start).ok_or(EditError::NotASectionStart(start))?;

        self.history.push(self.document.to_html());
        let context = crate::editing::context_html(&self.document, &section);
        let tag = tag::attach(&mut self.document, start)?;
        debug!(
            "section edit {kind:?} targeting {} nodes, tagged {tag}",
            section.nodes.len()
        );

        Ok(self.open_slot(
            EditTarget::Section { tag, kind },
            GenerationRequest::new(kind.task(), context).with_instruction(instruction),
        ))
    }

    /// Start an edit of the text covered by `range`.
    pub fn begin_selection_edit(
        &mut self,
        range: TextRange,
        kind: EditKind,
        instruction: &str,
    ) -> Result<EditRequest, EditError> {
        self.ensure_idle()?;
        let selected = selection::selected_text(&self.document, &range)?;
        if selected.trim().is_empty() {
            return Err(EditError::EmptySelection);
        }

        self.history.push(self.document.to_html());
        let version = self.document.version();
        debug!("selection edit {kind:?} over {} bytes at version {version}", selected.len());

        let request = GenerationRequest::new(kind.task(), selected.clone()).with_instruction(instruction);
        Ok(self.open_slot(
            EditTarget::Selection {
                range,
                version,
                kind,
                selected,
            },
            request,
        ))
    }

    /// Start a rewrite or expansion of one table cell.
    pub fn begin_cell_edit(
        &mut self,
        cell: NodeId,
        action: CellAction,
        instruction: &str,
    ) -> Result<EditRequest, EditError> {
        self.ensure_idle()?;
        if !self.document.contains(cell) {
            return Err(EditError::NodeNotFound(cell));
        }
        if !table::is_cell(&self.document, cell) {
            return Err(EditError::NotACell(cell));
        }

        self.history.push(self.document.to_html());
        let context = context_serializer()
            .inner_html(&self.document, cell)
            .trim()
            .to_string();

        Ok(self.open_slot(
            EditTarget::Cell { cell, action },
            GenerationRequest::new(action.task(), context).with_instruction(instruction),
        ))
    }

    /// Start a rewrite of every body cell in column `index` of the table
    /// containing `node`. The column header goes out as the instruction.
    pub fn begin_column_rewrite(&mut self, node: NodeId, index: usize) -> Result<EditRequest, EditError> {
        self.ensure_idle()?;
        let table = table::table_of(&self.document, node)?;
        let cells = table::column_cells(&self.document, table, index);
        if cells.is_empty() {
            return Err(EditError::EmptyColumn(index));
        }

        self.history.push(self.document.to_html());
        let serializer = context_serializer();
        let context = cells
            .iter()
            .map(|cell| serializer.inner_html(&self.document, *cell).trim().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        let header = table::column_header(&self.document, table, index)
            .filter(|header| !header.is_empty())
            .unwrap_or_else(|| DEFAULT_COLUMN_HEADER.to_string());

        Ok(self.open_slot(
            EditTarget::Column { index, cells },
            GenerationRequest::new(Task::ColumnRewrite, context).with_instruction(header),
        ))
    }

    // Resolving AI edits

    /// Apply the generator's result for `ticket`.
    ///
    /// Frees the pending slot whatever the outcome. A ticket that is not the
    /// pending one fails with [`EditError::UnknownTicket`] and changes
    /// nothing, not even the slot.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<String, GenerationError>,
    ) -> Result<EditOutcome, EditError> {
        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending = other;
                debug!("ignoring result for {ticket}, not pending");
                return Err(EditError::UnknownTicket);
            }
        };

        let applied = match pending.target {
            EditTarget::Section { tag, kind } => {
                let applied = self.apply_section(&tag, kind, result);
                if applied.is_err() {
                    tag::strip(&mut self.document, &tag);
                }
                applied
            }
            EditTarget::Selection {
                range,
                version,
                kind,
                selected,
            } => self.apply_selection(&range, version, kind, &selected, result),
            EditTarget::Cell { cell, .. } => self.apply_cell(cell, result),
            EditTarget::Column { cells, .. } => self.apply_column(&cells, result),
        };

        match applied {
            Ok((placement, changed)) => {
                self.commit();
                debug!("edit {ticket} applied, {} nodes changed", changed.len());
                Ok(EditOutcome {
                    placement,
                    changed,
                    version: self.document.version(),
                })
            }
            Err(e) => {
                warn!("edit {ticket} failed: {e}");
                Err(e)
            }
        }
    }

    fn apply_section(
        &mut self,
        tag: &tag::EditTag,
        kind: EditKind,
        result: Result<String, GenerationError>,
    ) -> Result<(Placement, Vec<NodeId>), EditError> {
        let html = generated_fragment(result)?;
        let start = tag::find(&self.document, tag).ok_or(EditError::LostPosition)?;
        let section = locate_section(&self.document, start).ok_or(EditError::LostPosition)?;

        let placement = kind.placement();
        let inserted = match placement {
            Placement::Replace => {
                let inserted = self
                    .document
                    .insert_html(&html, Position::Before(section.first()))?;
                for node in &section.nodes {
                    self.document.remove(*node)?;
                }
                inserted
            }
            Placement::Append => {
                let inserted = self
                    .document
                    .insert_html(&html, Position::After(section.last()))?;
                tag::strip(&mut self.document, tag);
                inserted
            }
        };
        Ok((placement, inserted))
    }

    fn apply_selection(
        &mut self,
        range: &TextRange,
        version: u64,
        kind: EditKind,
        selected: &str,
        result: Result<String, GenerationError>,
    ) -> Result<(Placement, Vec<NodeId>), EditError> {
        let html = generated_fragment(result)?;
        if self.document.version() != version {
            return Err(EditError::StaleSelection);
        }

        let selected = html_escape::encode_text(selected);
        let fragment = match kind {
            EditKind::Continue | EditKind::NextTopic => format!("{selected} {html}"),
            EditKind::Diagram => format!("{selected}<br>{html}"),
            EditKind::Rewrite | EditKind::Expand | EditKind::Table => html,
        };
        let inserted = selection::replace_range(&mut self.document, range, &fragment)?;
        Ok((Placement::Replace, inserted))
    }

    fn apply_cell(
        &mut self,
        cell: NodeId,
        result: Result<String, GenerationError>,
    ) -> Result<(Placement, Vec<NodeId>), EditError> {
        let html = generated_fragment(result)?;
        if !self.document.contains(cell) {
            return Err(EditError::LostPosition);
        }
        self.document.set_inner_html(cell, &html)?;
        Ok((Placement::Replace, vec![cell]))
    }

    fn apply_column(
        &mut self,
        cells: &[NodeId],
        result: Result<String, GenerationError>,
    ) -> Result<(Placement, Vec<NodeId>), EditError> {
        let text = generated_fragment(result)?;
        if !cells.iter().any(|cell| self.document.contains(*cell)) {
            return Err(EditError::LostPosition);
        }

        let lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let mut changed = Vec::new();
        for (cell, line) in cells.iter().zip(lines) {
            if self.document.contains(*cell) {
                self.document.set_inner_html(*cell, line)?;
                changed.push(*cell);
            }
        }
        Ok((Placement::Replace, changed))
    }

    // Internals

    fn ensure_idle(&self) -> Result<(), EditError> {
        match &self.pending {
            Some(pending) => {
                debug!("refusing new edit while {} is pending", pending.ticket);
                Err(EditError::Busy)
            }
            None => Ok(()),
        }
    }

    fn open_slot(&mut self, target: EditTarget, request: GenerationRequest) -> EditRequest {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(PendingEdit { ticket, target });
        EditRequest {
            ticket,
            request: self.with_settings_applied(request),
        }
    }

    fn with_settings_applied(&self, request: GenerationRequest) -> GenerationRequest {
        request
            .with_model(self.settings.model)
            .with_language(self.settings.language.clone())
    }

    fn commit(&mut self) {
        self.history.push(self.document.to_html());
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.clean_html()) {
            warn!("Could not save draft: {e}");
        }
    }
}

fn generated_fragment(result: Result<String, GenerationError>) -> Result<String, EditError> {
    let html = clean_model_output(&result?);
    if html.is_empty() {
        return Err(EditError::EmptyResult);
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ModelTier;
    use crate::storage::MemoryDraftStore;
    use pretty_assertions::assert_eq;

    fn editor_with(html: &str) -> Editor<MemoryDraftStore> {
        let mut editor = Editor::open(MemoryDraftStore::new());
        editor.load_generated(html).unwrap();
        editor
    }

    fn element(editor: &Editor<MemoryDraftStore>, text: &str) -> NodeId {
        let doc = editor.document();
        doc.elements()
            .into_iter()
            .find(|id| doc.text_content(*id) == text)
            .unwrap()
    }

    #[test]
    fn open_seeds_history_from_the_stored_draft() {
        let editor = Editor::open(MemoryDraftStore::with_draft("<p>saved</p>"));
        assert_eq!(editor.html(), "<p>saved</p>");
        assert_eq!(editor.history().len(), 1);
        assert!(!editor.can_undo());
    }

    #[test]
    fn failed_edit_on_a_restored_draft_leaves_nothing_to_undo() {
        let mut editor = Editor::open(MemoryDraftStore::with_draft("<h2>A</h2><p>x<br/>y</p>"));
        assert_eq!(editor.html(), "<h2>A</h2><p>x<br>y</p>");
        assert_eq!(editor.history().current(), Some(editor.html().as_str()));

        let start = element(&editor, "A");
        let edit = editor
            .begin_section_edit(start, EditKind::Rewrite, "")
            .unwrap();
        editor
            .resolve(edit.ticket, Err(GenerationError::Unavailable("down".to_string())))
            .unwrap_err();

        assert_eq!(editor.history().len(), 1);
        assert!(!editor.can_undo());
    }

    #[test]
    fn load_generated_cleans_pushes_and_persists() {
        let editor = editor_with("```html\n<h1>T</h1>\n```");
        assert_eq!(editor.html(), "<h1>T</h1>");
        assert_eq!(editor.history().current(), Some("<h1>T</h1>"));
        assert_eq!(editor.store().draft().as_deref(), Some("<h1>T</h1>"));
    }

    #[test]
    fn empty_generation_is_rejected() {
        let mut editor = Editor::open(MemoryDraftStore::new());
        assert!(matches!(editor.load_generated("```html\n```"), Err(EditError::EmptyResult)));
        assert!(editor.history().is_empty());
    }

    #[test]
    fn commit_input_ignores_unchanged_content() {
        let mut editor = editor_with("<p>a</p>");
        assert!(!editor.commit_input("<p>a</p>"));
        assert!(editor.commit_input("<p>ab</p>"));
        assert_eq!(editor.history().len(), 2);
        assert!(editor.undo());
        assert_eq!(editor.html(), "<p>a</p>");
        assert!(editor.redo());
        assert_eq!(editor.html(), "<p>ab</p>");
        assert!(!editor.redo());
    }

    #[test]
    fn section_rewrite_replaces_the_section() {
        let mut editor = editor_with("<h2>A</h2><p>a</p><h2>B</h2><p>b</p>");
        let start = element(&editor, "A");
        let request = editor
            .begin_section_edit(start, EditKind::Rewrite, "shorter")
            .unwrap();
        assert_eq!(request.request.context, "<h2>A</h2><p>a</p>");
        assert_eq!(request.request.instruction, "shorter");
        assert!(editor.is_pending());

        let outcome = editor
            .resolve(request.ticket, Ok("<h2>A2</h2>".to_string()))
            .unwrap();
        assert_eq!(outcome.placement, Placement::Replace);
        assert_eq!(editor.html(), "<h2>A2</h2><h2>B</h2><p>b</p>");
        assert!(!editor.is_pending());
        assert!(editor.undo());
        assert_eq!(editor.html(), "<h2>A</h2><p>a</p><h2>B</h2><p>b</p>");
    }

    #[test]
    fn section_continue_appends_and_strips_the_tag() {
        let mut editor = editor_with("<h2>A</h2><p>a</p><h2>B</h2>");
        let start = element(&editor, "A");
        let request = editor
            .begin_section_edit(start, EditKind::Continue, "")
            .unwrap();
        editor
            .resolve(request.ticket, Ok("<p>more</p>".to_string()))
            .unwrap();
        assert_eq!(editor.html(), "<h2>A</h2><p>a</p><p>more</p><h2>B</h2>");
    }

    #[test]
    fn second_edit_while_pending_is_busy() {
        let mut editor = editor_with("<h2>A</h2><h2>B</h2>");
        let a = element(&editor, "A");
        let b = element(&editor, "B");
        editor.begin_section_edit(a, EditKind::Rewrite, "").unwrap();
        assert!(matches!(
            editor.begin_section_edit(b, EditKind::Rewrite, ""),
            Err(EditError::Busy)
        ));
    }

    #[test]
    fn failure_restores_the_document() {
        let mut editor = editor_with("<h2>A</h2><p>a</p>");
        let before = editor.html();
        let start = element(&editor, "A");
        let request = editor
            .begin_section_edit(start, EditKind::Expand, "")
            .unwrap();
        let error = editor
            .resolve(
                request.ticket,
                Err(GenerationError::Unavailable("offline".to_string())),
            )
            .unwrap_err();
        assert!(matches!(error, EditError::Generation(_)));
        assert_eq!(editor.html(), before);
        assert!(!editor.is_pending());
    }

    #[test]
    fn unknown_ticket_leaves_the_slot_alone() {
        let mut editor = editor_with("<h2>A</h2>");
        let start = element(&editor, "A");
        let request = editor
            .begin_section_edit(start, EditKind::Rewrite, "")
            .unwrap();
        let wrong = Ticket(request.ticket.0 + 1);
        assert!(matches!(
            editor.resolve(wrong, Ok("<p>x</p>".to_string())),
            Err(EditError::UnknownTicket)
        ));
        assert!(editor.is_pending());
    }

    #[test]
    fn result_after_clear_is_dropped() {
        let mut editor = editor_with("<h2>A</h2>");
        let start = element(&editor, "A");
        let request = editor
            .begin_section_edit(start, EditKind::Rewrite, "")
            .unwrap();
        editor.clear();
        assert!(matches!(
            editor.resolve(request.ticket, Ok("<p>x</p>".to_string())),
            Err(EditError::UnknownTicket)
        ));
        assert_eq!(editor.html(), "");
        assert_eq!(editor.store().draft(), None);
        assert!(editor.history().is_empty());
    }

    #[test]
    fn selection_continue_keeps_the_selected_text() {
        let mut editor = editor_with("<p>Rust is fast</p>");
        let root = editor.document().root();
        let range = TextRange::find(editor.document(), root, "fast").unwrap();
        let request = editor
            .begin_selection_edit(range, EditKind::Continue, "")
            .unwrap();
        assert_eq!(request.request.context, "fast");
        editor
            .resolve(request.ticket, Ok("<b>and safe</b>".to_string()))
            .unwrap();
        assert_eq!(editor.html(), "<p>Rust is fast <b>and safe</b></p>");
    }

    #[test]
    fn selection_is_stale_after_a_document_change() {
        let mut editor = editor_with("<table><tr><td>x</td></tr></table><p>Rust is fast</p>");
        let root = editor.document().root();
        let range = TextRange::find(editor.document(), root, "fast").unwrap();
        let request = editor
            .begin_selection_edit(range, EditKind::Rewrite, "")
            .unwrap();
        let row = editor.document().elements_named(root, "tr")[0];
        editor.insert_row_after(row).unwrap();
        let before = editor.html();

        assert!(matches!(
            editor.resolve(request.ticket, Ok("quick".to_string())),
            Err(EditError::StaleSelection)
        ));
        assert_eq!(editor.html(), before);
    }

    #[test]
    fn blank_selection_is_refused() {
        let mut editor = editor_with("<p>a   b</p>");
        let root = editor.document().root();
        let range = TextRange::find(editor.document(), root, "   ").unwrap();
        assert!(matches!(
            editor.begin_selection_edit(range, EditKind::Rewrite, ""),
            Err(EditError::EmptySelection)
        ));
        assert!(!editor.is_pending());
    }

    #[test]
    fn cell_edit_replaces_cell_content() {
        let mut editor = editor_with("<table><tr><td>old<div class=\"cell-actions\">+</div></td></tr></table>");
        let cell = editor.document().elements_named(editor.document().root(), "td")[0];
        let request = editor
            .begin_cell_edit(cell, CellAction::Expand, "")
            .unwrap();
        assert_eq!(request.request.task, Task::CellExpand);
        assert_eq!(request.request.context, "old");
        editor
            .resolve(request.ticket, Ok("<strong>new</strong>".to_string()))
            .unwrap();
        assert_eq!(
            editor.html(),
            "<table><tr><td><strong>new</strong></td></tr></table>"
        );
    }

    #[test]
    fn column_rewrite_sends_cells_and_header() {
        let mut editor = editor_with(
            "<table><thead><tr><th>Year</th><th>Event</th></tr></thead><tbody><tr><td>1947</td><td>a</td></tr><tr><td>1950</td><td>b</td></tr></tbody></table>",
        );
        let table = editor.document().elements_named(editor.document().root(), "table")[0];
        let request = editor.begin_column_rewrite(table, 1).unwrap();
        assert_eq!(request.request.context, "a\nb");
        assert_eq!(request.request.instruction, "Event");

        let outcome = editor
            .resolve(request.ticket, Ok("Freedom\n\n<b>Constitution</b>\nextra".to_string()))
            .unwrap();
        assert_eq!(outcome.changed.len(), 2);
        assert_eq!(
            editor.html(),
            "<table><thead><tr><th>Year</th><th>Event</th></tr></thead><tbody><tr><td>1947</td><td>Freedom</td></tr><tr><td>1950</td><td><b>Constitution</b></td></tr></tbody></table>"
        );
    }

    #[test]
    fn empty_column_fails_before_anything_happens() {
        let mut editor = editor_with("<table><tr><th>Only header</th></tr></table>");
        let table = editor.document().elements_named(editor.document().root(), "table")[0];
        let history = editor.history().len();
        assert!(matches!(
            editor.begin_column_rewrite(table, 0),
            Err(EditError::EmptyColumn(0))
        ));
        assert_eq!(editor.history().len(), history);
        assert!(!editor.is_pending());
    }

    #[test]
    fn table_structure_changes_are_undoable() {
        let mut editor = editor_with("<table><tr><th>A</th></tr><tr><td>1</td></tr></table>");
        let cell = editor.document().elements_named(editor.document().root(), "td")[0];
        editor.insert_column_after(cell, 0).unwrap();
        assert_eq!(
            editor.html(),
            "<table><tr><th>A</th><th>New Column</th></tr><tr><td>1</td><td>New data</td></tr></table>"
        );
        editor.undo();
        assert_eq!(editor.html(), "<table><tr><th>A</th></tr><tr><td>1</td></tr></table>");
    }

    fn settings() -> GenerationSettings {
        GenerationSettings {
            model: ModelTier::Quality,
            language: "English".to_string(),
            format: OutputFormat::UpscAnswer,
            ..GenerationSettings::default()
        }
    }

    #[test]
    fn edit_requests_carry_model_and_language_but_no_format() {
        let mut editor = editor_with("<h2>A</h2>").with_settings(settings());
        let start = element(&editor, "A");
        let edit = editor
            .begin_section_edit(start, EditKind::Rewrite, "")
            .unwrap();
        assert_eq!(edit.request.model, ModelTier::Quality);
        assert_eq!(edit.request.language, "English");
        assert_eq!(edit.request.format, None);
    }

    #[test]
    fn document_requests_carry_the_configured_format() {
        let editor = Editor::open(MemoryDraftStore::new()).with_settings(settings());

        let topic = editor.document_request(DocumentSource::Topic, "Monsoon");
        assert_eq!(topic.task, Task::Topic);
        assert_eq!(topic.instruction, "Monsoon");
        assert_eq!(topic.context, "");
        assert_eq!(topic.format, Some(OutputFormat::UpscAnswer));
        assert_eq!(topic.upsc.map(|upsc| upsc.subject), Some("GS1".to_string()));

        let text = editor.document_request(DocumentSource::Text, "raw notes");
        assert_eq!(text.task, Task::Text);
        assert_eq!(text.context, "raw notes");
        assert_eq!(text.language, "English");
    }

    #[test]
    fn extending_a_table_sends_the_clean_document() {
        let mut editor = Editor::open(MemoryDraftStore::new());
        assert!(matches!(
            editor.table_extension_request("more"),
            Err(EditError::EmptyDocument)
        ));

        editor
            .load_generated("<table><tr><th>#</th></tr><tr><td>1</td></tr></table>")
            .unwrap();
        let start = editor.document().elements_named(editor.document().root(), "table")[0];
        editor
            .begin_section_edit(start, EditKind::Table, "")
            .unwrap();

        let request = editor.table_extension_request("rows 2-3").unwrap();
        assert_eq!(request.task, Task::ExtendTable);
        assert_eq!(request.format, Some(OutputFormat::IncrementalTable));
        assert_eq!(request.instruction, "rows 2-3");
        assert_eq!(
            request.context,
            "<table><tr><th>#</th></tr><tr><td>1</td></tr></table>"
        );
    }
}
