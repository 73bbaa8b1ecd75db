//! Persistence of the working draft.
//!
//! One draft exists per store. Saving an empty draft is skipped, so a
//! cleared editor never overwrites a previous session's work by accident;
//! [`DraftStore::clear`] is the only way to drop it.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error on draft {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait DraftStore {
    /// Store `html` as the draft. Empty content is ignored.
    fn save(&self, html: &str) -> Result<(), StorageError>;
    /// The stored draft, if there is one.
    fn load(&self) -> Result<Option<String>, StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Keeps the draft in a single file.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl DraftStore for FileDraftStore {
    fn save(&self, html: &str) -> Result<(), StorageError> {
        if html.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, html).map_err(|e| self.io_error(e))
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(html) => Ok(Some(html)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process store, for tests and sessions that should not persist.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    draft: RefCell<Option<String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(html: impl Into<String>) -> Self {
        Self {
            draft: RefCell::new(Some(html.into())),
        }
    }

    pub fn draft(&self) -> Option<String> {
        self.draft.borrow().clone()
    }
}

impl DraftStore for MemoryDraftStore {
    fn save(&self, html: &str) -> Result<(), StorageError> {
        if !html.is_empty() {
            *self.draft.borrow_mut() = Some(html.to_string());
        }
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.draft())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.draft.borrow_mut().take();
        Ok(())
    }
}

impl<S: DraftStore + ?Sized> DraftStore for &S {
    fn save(&self, html: &str) -> Result<(), StorageError> {
        (**self).save(html)
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        (**self).load()
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}
