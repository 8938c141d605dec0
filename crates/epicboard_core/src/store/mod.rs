//! In-memory authoritative store for epics and stories.
//!
//! # Responsibility
//! - Own every epic and story record for one tracker instance.
//! - Keep the derived `Epic::story_ids` index consistent on every mutation.
//! - Stamp `created_at`/`updated_at`; callers never supply timestamps.
//!
//! # Invariants
//! - Every `Story::epic_id` resolves to a stored epic.
//! - `Epic::story_ids` equals the ascending ids of the stories claiming it.
//! - A mutation either applies completely or returns an error before any
//!   field is touched.
//! - No stored id is above the identifier generator's high-water mark.
//! - Mutators are crate-private; outside callers go through `IssueRepository`.

pub mod id_gen;

use crate::model::epic::{Epic, EpicId, EpicPatch, NewEpic};
use crate::model::story::{NewStory, Story, StoryId, StoryPatch};
use crate::model::validation::{normalize_description, normalize_title, ValidationError};
use crate::model::{IssueRef, Timestamp};
use chrono::Utc;
use id_gen::{EntityClass, IdGenerator};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a single store operation. The store is unchanged when returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(IssueRef),
    #[error("{0} already exists")]
    DuplicateId(IssueRef),
    #[error("{0} was not issued by the identifier generator")]
    UnissuedId(IssueRef),
    #[error("{0} identifier space exhausted")]
    IdSpaceExhausted(EntityClass),
}

/// Structural or referential problem found in a store's contents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("duplicate {0}")]
    DuplicateId(IssueRef),
    #[error("story {story} references missing epic {epic}")]
    DanglingParent { story: StoryId, epic: EpicId },
    #[error("epic {epic} story index does not match the stories that reference it")]
    IndexMismatch {
        epic: EpicId,
        recorded: Vec<StoryId>,
        actual: Vec<StoryId>,
    },
    #[error("{0} has updated_at earlier than created_at")]
    TimestampOrder(IssueRef),
    #[error("{target} is above the {class} id high-water mark {high_water}")]
    AboveHighWater {
        target: IssueRef,
        class: EntityClass,
        high_water: u64,
    },
    #[error("{target} has an invalid field: {source}")]
    InvalidField {
        target: IssueRef,
        source: ValidationError,
    },
}

/// Authoritative collection of epics and stories plus the id generator state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    epics: BTreeMap<EpicId, Epic>,
    stories: BTreeMap<StoryId, Story>,
    ids: IdGenerator,
}

impl Store {
    /// Creates an empty store with a fresh identifier generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from persisted records.
    ///
    /// Nothing is repaired: duplicates, dangling parents, stale indices or
    /// ids above the high-water marks are reported as `IntegrityError`.
    pub fn restore(
        ids: IdGenerator,
        epics: Vec<Epic>,
        stories: Vec<Story>,
    ) -> Result<Self, IntegrityError> {
        let mut epic_map = BTreeMap::new();
        for epic in epics {
            match epic_map.entry(epic.id) {
                Entry::Occupied(_) => return Err(IntegrityError::DuplicateId(epic.id.into())),
                Entry::Vacant(slot) => {
                    slot.insert(epic);
                }
            }
        }

        let mut story_map = BTreeMap::new();
        for story in stories {
            match story_map.entry(story.id) {
                Entry::Occupied(_) => return Err(IntegrityError::DuplicateId(story.id.into())),
                Entry::Vacant(slot) => {
                    slot.insert(story);
                }
            }
        }

        let store = Self {
            epics: epic_map,
            stories: story_map,
            ids,
        };
        store.check_integrity()?;
        Ok(store)
    }

    /// Identifier generator state, persisted alongside the records.
    pub fn id_generator(&self) -> &IdGenerator {
        &self.ids
    }

    pub(crate) fn id_generator_mut(&mut self) -> &mut IdGenerator {
        &mut self.ids
    }

    pub fn contains_epic(&self, id: EpicId) -> bool {
        self.epics.contains_key(&id)
    }

    pub fn contains_story(&self, id: StoryId) -> bool {
        self.stories.contains_key(&id)
    }

    pub fn epic_count(&self) -> usize {
        self.epics.len()
    }

    pub fn story_count(&self) -> usize {
        self.stories.len()
    }

    /// Borrowing iterator over epics in creation order.
    pub fn epics(&self) -> impl Iterator<Item = &Epic> + '_ {
        self.epics.values()
    }

    /// Borrowing iterator over stories in creation order.
    pub fn stories(&self) -> impl Iterator<Item = &Story> + '_ {
        self.stories.values()
    }

    /// Inserts an epic under an id issued by this store's generator.
    pub(crate) fn insert_epic(&mut self, id: EpicId, input: NewEpic) -> StoreResult<Epic> {
        if self.epics.contains_key(&id) {
            return Err(StoreError::DuplicateId(id.into()));
        }
        if id.get() == 0 || id.get() > self.ids.high_water(EntityClass::Epic) {
            return Err(StoreError::UnissuedId(id.into()));
        }

        let now = now_ms();
        let epic = Epic {
            id,
            title: input.title,
            description: input.description,
            status: input.status,
            created_at: now,
            updated_at: now,
            story_ids: Vec::new(),
        };
        self.epics.insert(id, epic.clone());
        Ok(epic)
    }

    /// Inserts a story and links it into its epic's index in one step.
    pub(crate) fn insert_story(&mut self, id: StoryId, input: NewStory) -> StoreResult<Story> {
        if self.stories.contains_key(&id) {
            return Err(StoreError::DuplicateId(id.into()));
        }
        if id.get() == 0 || id.get() > self.ids.high_water(EntityClass::Story) {
            return Err(StoreError::UnissuedId(id.into()));
        }
        let Some(epic) = self.epics.get_mut(&input.epic_id) else {
            return Err(StoreError::NotFound(input.epic_id.into()));
        };

        let now = now_ms();
        let story = Story {
            id,
            epic_id: input.epic_id,
            title: input.title,
            description: input.description,
            status: input.status,
            created_at: now,
            updated_at: now,
        };
        insert_sorted(&mut epic.story_ids, id);
        self.stories.insert(id, story.clone());
        Ok(story)
    }

    /// Applies a patch to an epic and refreshes `updated_at`.
    pub(crate) fn update_epic(&mut self, id: EpicId, patch: EpicPatch) -> StoreResult<Epic> {
        let Some(epic) = self.epics.get_mut(&id) else {
            return Err(StoreError::NotFound(id.into()));
        };

        if let Some(title) = patch.title {
            epic.title = title;
        }
        if let Some(description) = patch.description {
            epic.description = description;
        }
        if let Some(status) = patch.status {
            epic.status = status;
        }
        epic.updated_at = touched(epic.updated_at);
        Ok(epic.clone())
    }

    /// Applies a patch to a story and refreshes `updated_at`.
    ///
    /// A changed `epic_id` must name an existing epic; both epics' indices
    /// are updated together with the story.
    pub(crate) fn update_story(&mut self, id: StoryId, patch: StoryPatch) -> StoreResult<Story> {
        let Some(story) = self.stories.get_mut(&id) else {
            return Err(StoreError::NotFound(id.into()));
        };
        let previous_epic = story.epic_id;
        let target_epic = patch.epic_id.unwrap_or(previous_epic);
        if !self.epics.contains_key(&target_epic) {
            return Err(StoreError::NotFound(target_epic.into()));
        }

        if target_epic != previous_epic {
            if let Some(epic) = self.epics.get_mut(&previous_epic) {
                epic.story_ids.retain(|story_id| *story_id != id);
            }
            if let Some(epic) = self.epics.get_mut(&target_epic) {
                insert_sorted(&mut epic.story_ids, id);
            }
            story.epic_id = target_epic;
        }
        if let Some(title) = patch.title {
            story.title = title;
        }
        if let Some(description) = patch.description {
            story.description = description;
        }
        if let Some(status) = patch.status {
            story.status = status;
        }
        story.updated_at = touched(story.updated_at);
        Ok(story.clone())
    }

    /// Removes an epic together with every story that references it.
    ///
    /// Returns the removed epic and its removed stories in creation order.
    pub(crate) fn delete_epic(&mut self, id: EpicId) -> StoreResult<(Epic, Vec<Story>)> {
        let Some(epic) = self.epics.remove(&id) else {
            return Err(StoreError::NotFound(id.into()));
        };

        let child_ids: Vec<StoryId> = self
            .stories
            .values()
            .filter(|story| story.epic_id == id)
            .map(|story| story.id)
            .collect();
        let removed = child_ids
            .iter()
            .filter_map(|story_id| self.stories.remove(story_id))
            .collect();
        Ok((epic, removed))
    }

    /// Removes one story and unlinks it from its epic's index.
    pub(crate) fn delete_story(&mut self, id: StoryId) -> StoreResult<Story> {
        let Some(story) = self.stories.remove(&id) else {
            return Err(StoreError::NotFound(id.into()));
        };
        if let Some(epic) = self.epics.get_mut(&story.epic_id) {
            epic.story_ids.retain(|story_id| *story_id != id);
        }
        Ok(story)
    }

    /// Returns an owned snapshot of one epic.
    pub fn get_epic(&self, id: EpicId) -> StoreResult<Epic> {
        self.epics
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id.into()))
    }

    /// Returns an owned snapshot of one story.
    pub fn get_story(&self, id: StoryId) -> StoreResult<Story> {
        self.stories
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id.into()))
    }

    /// Lists all epics in creation order.
    pub fn list_epics(&self) -> Vec<Epic> {
        self.epics.values().cloned().collect()
    }

    /// Lists an epic's stories in creation order.
    ///
    /// An unknown epic is `NotFound`, distinct from an epic with no stories.
    pub fn list_stories_by_epic(&self, id: EpicId) -> StoreResult<Vec<Story>> {
        let epic = self
            .epics
            .get(&id)
            .ok_or(StoreError::NotFound(id.into()))?;
        Ok(epic
            .story_ids
            .iter()
            .filter_map(|story_id| self.stories.get(story_id))
            .cloned()
            .collect())
    }

    /// Verifies every store invariant, reporting the first violation found.
    pub fn check_integrity(&self) -> Result<(), IntegrityError> {
        let epic_high_water = self.ids.high_water(EntityClass::Epic);
        let story_high_water = self.ids.high_water(EntityClass::Story);

        for (key, epic) in &self.epics {
            let target = IssueRef::Epic(epic.id);
            if *key != epic.id {
                return Err(IntegrityError::DuplicateId(target));
            }
            if epic.id.get() == 0 || epic.id.get() > epic_high_water {
                return Err(IntegrityError::AboveHighWater {
                    target,
                    class: EntityClass::Epic,
                    high_water: epic_high_water,
                });
            }
            check_fields(target, &epic.title, &epic.description)?;
            if epic.updated_at < epic.created_at {
                return Err(IntegrityError::TimestampOrder(target));
            }
        }

        let mut expected_index: BTreeMap<EpicId, Vec<StoryId>> = BTreeMap::new();
        for (key, story) in &self.stories {
            let target = IssueRef::Story(story.id);
            if *key != story.id {
                return Err(IntegrityError::DuplicateId(target));
            }
            if story.id.get() == 0 || story.id.get() > story_high_water {
                return Err(IntegrityError::AboveHighWater {
                    target,
                    class: EntityClass::Story,
                    high_water: story_high_water,
                });
            }
            check_fields(target, &story.title, &story.description)?;
            if story.updated_at < story.created_at {
                return Err(IntegrityError::TimestampOrder(target));
            }
            if !self.epics.contains_key(&story.epic_id) {
                return Err(IntegrityError::DanglingParent {
                    story: story.id,
                    epic: story.epic_id,
                });
            }
            expected_index
                .entry(story.epic_id)
                .or_default()
                .push(story.id);
        }

        for epic in self.epics.values() {
            let actual = expected_index.remove(&epic.id).unwrap_or_default();
            if epic.story_ids != actual {
                return Err(IntegrityError::IndexMismatch {
                    epic: epic.id,
                    recorded: epic.story_ids.clone(),
                    actual,
                });
            }
        }

        Ok(())
    }
}

fn check_fields(target: IssueRef, title: &str, description: &str) -> Result<(), IntegrityError> {
    normalize_title(title)
        .and_then(|_| normalize_description(description))
        .map(|_| ())
        .map_err(|source| IntegrityError::InvalidField { target, source })
}

fn insert_sorted(ids: &mut Vec<StoryId>, id: StoryId) {
    if let Err(position) = ids.binary_search(&id) {
        ids.insert(position, id);
    }
}

fn now_ms() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Next `updated_at`, strictly after `previous` even within one millisecond.
fn touched(previous: Timestamp) -> Timestamp {
    now_ms().max(previous.saturating_add(1))
}
