//! In-process storage used for ephemeral trackers and tests.
//!
//! Saved state goes through the same JSON codec as file storage, so loads
//! are integrity-checked exactly like on-disk documents.

use crate::db::snapshot::{decode, encode};
use crate::db::{DbError, DbResult, Storage};
use crate::store::Store;
use std::cell::{Cell, RefCell};

/// Storage that keeps the last saved document in memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RefCell<Option<Vec<u8>>>,
    fail_saves: Cell<bool>,
    save_count: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from raw document bytes, e.g. a hand-built corrupt document.
    pub fn with_document(bytes: impl Into<Vec<u8>>) -> Self {
        let storage = Self::default();
        storage.document.replace(Some(bytes.into()));
        storage
    }

    /// Makes subsequent saves fail with `DbError::Unavailable`.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> DbResult<Store> {
        match self.document.borrow().as_deref() {
            Some(bytes) => decode(bytes),
            None => Ok(Store::new()),
        }
    }

    fn save(&self, store: &Store) -> DbResult<()> {
        if self.fail_saves.get() {
            return Err(DbError::Unavailable(
                "memory storage configured to reject saves".to_string(),
            ));
        }
        let bytes = encode(store)?;
        self.document.replace(Some(bytes));
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}
