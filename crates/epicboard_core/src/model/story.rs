//! Story domain model.
//!
//! # Invariants
//! - `epic_id` always references an existing epic while the story is stored.
//! - `id` is issued once by the identifier generator and never reused.

use crate::model::epic::EpicId;
use crate::model::status::Status;
use crate::model::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// Stable story identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(u64);

impl StoryId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for StoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoryId {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

/// Unit of work belonging to exactly one epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    /// Owning epic. Authoritative for the epic/story relation.
    pub epic_id: EpicId,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a story under an existing epic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    pub epic_id: EpicId,
    pub title: String,
    pub description: String,
    pub status: Status,
}

impl NewStory {
    /// Creates input with default `Todo` status.
    pub fn new(epic_id: EpicId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            epic_id,
            title: title.into(),
            description: description.into(),
            status: Status::Todo,
        }
    }
}

/// Partial update for a story. `None` keeps the current value.
///
/// Setting `epic_id` to a different epic reparents the story.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryPatch {
    pub epic_id: Option<EpicId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
}

impl StoryPatch {
    /// Patch that only changes status.
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
