//! Linear undo/redo over whole-document snapshots.
//!
//! Snapshots are opaque strings. Pushing after an undo discards the redo
//! branch; pushing the snapshot already at the cursor does nothing, which
//! keeps rapid autosaves from filling the log with duplicates.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    /// `None` exactly when `entries` is empty
    cursor: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// History for a session restored from storage: one entry, or none when
    /// the stored snapshot is empty.
    pub fn seeded(snapshot: impl Into<String>) -> Self {
        let snapshot = snapshot.into();
        if snapshot.is_empty() {
            return Self::new();
        }
        Self {
            entries: vec![snapshot],
            cursor: Some(0),
        }
    }

    pub fn push(&mut self, snapshot: impl Into<String>) {
        let snapshot = snapshot.into();
        if self.current() == Some(snapshot.as_str()) {
            return;
        }
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back and return the snapshot now current.
    pub fn undo(&mut self) -> Option<&str> {
        let cursor = self.cursor.filter(|cursor| *cursor > 0)? - 1;
        self.cursor = Some(cursor);
        Some(&self.entries[cursor])
    }

    /// Step forward and return the snapshot now current.
    pub fn redo(&mut self) -> Option<&str> {
        let cursor = self.cursor.filter(|cursor| cursor + 1 < self.entries.len())? + 1;
        self.cursor = Some(cursor);
        Some(&self.entries[cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn current(&self) -> Option<&str> {
        self.cursor.map(|cursor| self.entries[cursor].as_str())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
