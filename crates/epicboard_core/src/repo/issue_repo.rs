//! Validated CRUD facade over the store.
//!
//! # Responsibility
//! - Be the only mutation entry point used by presentation code.
//! - Validate and normalize input before the store is touched.
//! - Pair identifier generation with store inserts.
//! - Flush through the storage adapter after every successful mutation.
//!
//! # Invariants
//! - A validation or not-found failure leaves the store unmodified.
//! - An id is generated only after the insert preconditions are checked.
//! - A failed flush keeps the in-memory change and reports `NotDurable`.

use crate::db::{DbError, Storage};
use crate::error::ErrorKind;
use crate::model::epic::{Epic, EpicId, EpicPatch, NewEpic};
use crate::model::status::Status;
use crate::model::story::{NewStory, Story, StoryId, StoryPatch};
use crate::model::validation::{normalize_description, normalize_title, ValidationError};
use crate::model::IssueRef;
use crate::store::id_gen::EntityClass;
use crate::store::{Store, StoreError};
use log::{info, warn};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure returned by the repository facade.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0} not found")]
    NotFound(IssueRef),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("store rejected operation: {0}")]
    Store(StoreError),
    #[error(transparent)]
    Db(#[from] DbError),
    /// The change is applied in memory but the flush failed.
    #[error("{target} changed but is not yet saved: {source}")]
    NotDurable { target: IssueRef, source: DbError },
}

impl RepoError {
    /// Maps this failure onto the shared taxonomy.
    ///
    /// `Store` errors surfacing here mean the loaded state disagrees with its
    /// own id counters (a duplicate or unissued id, or a counter already at
    /// `u64::MAX`). Validated callers cannot reach them on a consistent
    /// store, so they classify as `CorruptData`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(_) => ErrorKind::CorruptData,
            Self::Db(err) => err.kind(),
            Self::NotDurable { .. } => ErrorKind::Io,
        }
    }

    /// Whether the operation took effect in memory despite the error.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::NotDurable { .. })
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(target) => Self::NotFound(target),
            other => Self::Store(other),
        }
    }
}

/// Result of a cascading epic delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedEpic {
    pub epic: Epic,
    /// Stories removed with the epic, in creation order.
    pub stories: Vec<Story>,
}

/// Epic/story repository bound to one store and one storage adapter.
pub struct IssueRepository<S: Storage> {
    store: Store,
    storage: S,
    durable: bool,
}

impl<S: Storage> IssueRepository<S> {
    /// Loads state from `storage` and takes ownership of both.
    ///
    /// # Errors
    /// - `RepoError::Db` with kind `CorruptData` or `Io` when loading fails.
    pub fn open(storage: S) -> RepoResult<Self> {
        let store = storage.load()?;
        info!(
            "event=repo_open module=repo status=ok epics={} stories={}",
            store.epic_count(),
            store.story_count()
        );
        Ok(Self {
            store,
            storage,
            durable: true,
        })
    }

    /// Read-only view of the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether every applied mutation has been saved.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Saves the current state, e.g. to retry after `NotDurable`.
    pub fn flush(&mut self) -> RepoResult<()> {
        self.storage.save(&self.store)?;
        self.durable = true;
        Ok(())
    }

    /// Consumes the repository, returning the store and storage.
    pub fn into_parts(self) -> (Store, S) {
        (self.store, self.storage)
    }

    pub fn create_epic(&mut self, input: NewEpic) -> RepoResult<Epic> {
        let input = NewEpic {
            title: normalize_title(&input.title).inspect_err(log_rejected("epic_create"))?,
            description: normalize_description(&input.description)
                .inspect_err(log_rejected("epic_create"))?,
            status: input.status,
        };

        let id = self
            .store
            .id_generator_mut()
            .next_epic_id()
            .ok_or(StoreError::IdSpaceExhausted(EntityClass::Epic))?;
        let epic = self.store.insert_epic(id, input)?;
        info!("event=epic_create module=repo status=ok epic_id={}", epic.id);

        self.persist(epic.id.into())?;
        Ok(epic)
    }

    pub fn update_epic(&mut self, id: EpicId, patch: EpicPatch) -> RepoResult<Epic> {
        let patch = EpicPatch {
            title: normalize_optional(patch.title, normalize_title)
                .inspect_err(log_rejected("epic_update"))?,
            description: normalize_optional(patch.description, normalize_description)
                .inspect_err(log_rejected("epic_update"))?,
            status: patch.status,
        };

        let epic = self.store.update_epic(id, patch)?;
        info!(
            "event=epic_update module=repo status=ok epic_id={} state={}",
            epic.id,
            epic.status.as_str()
        );

        self.persist(epic.id.into())?;
        Ok(epic)
    }

    pub fn set_epic_status(&mut self, id: EpicId, status: Status) -> RepoResult<Epic> {
        self.update_epic(id, EpicPatch::status(status))
    }

    /// Deletes an epic and, with it, every story that belongs to it.
    pub fn delete_epic(&mut self, id: EpicId) -> RepoResult<DeletedEpic> {
        let (epic, stories) = self.store.delete_epic(id)?;
        info!(
            "event=epic_delete module=repo status=ok epic_id={} cascaded_stories={}",
            epic.id,
            stories.len()
        );

        self.persist(epic.id.into())?;
        Ok(DeletedEpic { epic, stories })
    }

    pub fn get_epic(&self, id: EpicId) -> RepoResult<Epic> {
        Ok(self.store.get_epic(id)?)
    }

    /// All epics in creation order.
    pub fn list_epics(&self) -> Vec<Epic> {
        self.store.list_epics()
    }

    pub fn create_story(&mut self, input: NewStory) -> RepoResult<Story> {
        let input = NewStory {
            epic_id: input.epic_id,
            title: normalize_title(&input.title).inspect_err(log_rejected("story_create"))?,
            description: normalize_description(&input.description)
                .inspect_err(log_rejected("story_create"))?,
            status: input.status,
        };
        if !self.store.contains_epic(input.epic_id) {
            return Err(RepoError::NotFound(input.epic_id.into()));
        }

        let id = self
            .store
            .id_generator_mut()
            .next_story_id()
            .ok_or(StoreError::IdSpaceExhausted(EntityClass::Story))?;
        let story = self.store.insert_story(id, input)?;
        info!(
            "event=story_create module=repo status=ok story_id={} epic_id={}",
            story.id, story.epic_id
        );

        self.persist(story.id.into())?;
        Ok(story)
    }

    /// Updates a story; a new `epic_id` reparents it.
    pub fn update_story(&mut self, id: StoryId, patch: StoryPatch) -> RepoResult<Story> {
        let patch = StoryPatch {
            epic_id: patch.epic_id,
            title: normalize_optional(patch.title, normalize_title)
                .inspect_err(log_rejected("story_update"))?,
            description: normalize_optional(patch.description, normalize_description)
                .inspect_err(log_rejected("story_update"))?,
            status: patch.status,
        };

        let story = self.store.update_story(id, patch)?;
        info!(
            "event=story_update module=repo status=ok story_id={} epic_id={} state={}",
            story.id,
            story.epic_id,
            story.status.as_str()
        );

        self.persist(story.id.into())?;
        Ok(story)
    }

    pub fn set_story_status(&mut self, id: StoryId, status: Status) -> RepoResult<Story> {
        self.update_story(id, StoryPatch::status(status))
    }

    pub fn delete_story(&mut self, id: StoryId) -> RepoResult<Story> {
        let story = self.store.delete_story(id)?;
        info!(
            "event=story_delete module=repo status=ok story_id={} epic_id={}",
            story.id, story.epic_id
        );

        self.persist(story.id.into())?;
        Ok(story)
    }

    pub fn get_story(&self, id: StoryId) -> RepoResult<Story> {
        Ok(self.store.get_story(id)?)
    }

    /// Stories of one epic in creation order; `NotFound` for unknown epics.
    pub fn list_stories_by_epic(&self, id: EpicId) -> RepoResult<Vec<Story>> {
        Ok(self.store.list_stories_by_epic(id)?)
    }

    fn persist(&mut self, target: IssueRef) -> RepoResult<()> {
        self.durable = false;
        match self.storage.save(&self.store) {
            Ok(()) => {
                self.durable = true;
                Ok(())
            }
            Err(source) => {
                warn!(
                    "event=repo_flush module=repo status=error target={} error_code={} error={}",
                    target,
                    source.kind(),
                    source
                );
                Err(RepoError::NotDurable { target, source })
            }
        }
    }
}

fn normalize_optional(
    value: Option<String>,
    normalize: fn(&str) -> Result<String, ValidationError>,
) -> Result<Option<String>, ValidationError> {
    value.as_deref().map(normalize).transpose()
}

fn log_rejected(event: &'static str) -> impl Fn(&ValidationError) {
    move |err: &ValidationError| {
        warn!(
            "event={} module=repo status=rejected error_code=validation error={}",
            event, err
        );
    }
}
