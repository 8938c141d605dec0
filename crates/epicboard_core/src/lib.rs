//! Core domain logic for Epicboard.
//! This crate is the single source of truth for epic/story invariants.

pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use db::snapshot::{StateDocument, CURRENT_VERSION};
pub use db::{DbError, DbResult, JsonFileStorage, MemoryStorage, Storage};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::epic::{Epic, EpicId, EpicPatch, NewEpic};
pub use model::status::Status;
pub use model::story::{NewStory, Story, StoryId, StoryPatch};
pub use model::validation::ValidationError;
pub use model::{IssueRef, Timestamp};
pub use repo::issue_repo::{DeletedEpic, IssueRepository, RepoError, RepoResult};
pub use store::id_gen::{EntityClass, IdGenerator};
pub use store::{IntegrityError, Store, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
