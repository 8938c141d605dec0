//! Durable storage for tracker state.
//!
//! # Responsibility
//! - Serialize the whole store into one versioned JSON document.
//! - Rebuild a store on load and reject anything that fails integrity checks.
//!
//! # Invariants
//! - Loading never repairs data; corrupt state surfaces as an error.
//! - File saves replace the previous document atomically.

use crate::error::ErrorKind;
use crate::store::{IntegrityError, Store};
use std::path::PathBuf;
use thiserror::Error;

mod json_file;
mod memory;
pub mod snapshot;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("failed to {action} `{}`: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("state document is not valid JSON for this schema: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("state document version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("state document failed integrity check: {0}")]
    Integrity(#[from] IntegrityError),
    #[error("failed to encode state document: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl DbError {
    /// Maps this failure onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed(_) | Self::UnsupportedVersion { .. } | Self::Integrity(_) => {
                ErrorKind::CorruptData
            }
            Self::Io { .. } | Self::Encode(_) | Self::Unavailable(_) => ErrorKind::Io,
        }
    }
}

/// Persistence adapter contract.
///
/// `load` builds a fresh, integrity-checked store. `save` writes the full
/// current state; it only reads the store.
pub trait Storage {
    fn load(&self) -> DbResult<Store>;
    fn save(&self, store: &Store) -> DbResult<()>;
}

impl<S: Storage + ?Sized> Storage for &S {
    fn load(&self) -> DbResult<Store> {
        (**self).load()
    }

    fn save(&self, store: &Store) -> DbResult<()> {
        (**self).save(store)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self) -> DbResult<Store> {
        (**self).load()
    }

    fn save(&self, store: &Store) -> DbResult<()> {
        (**self).save(store)
    }
}
