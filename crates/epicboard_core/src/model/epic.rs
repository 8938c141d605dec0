//! Epic domain model.
//!
//! # Responsibility
//! - Define the top-level unit of work and its creation/patch inputs.
//!
//! # Invariants
//! - `id` is issued once by the identifier generator and never reused.
//! - `story_ids` mirrors the stories whose `epic_id` points here, ascending.

use crate::model::status::Status;
use crate::model::story::StoryId;
use crate::model::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// Stable epic identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpicId(u64);

impl EpicId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for EpicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EpicId {
    type Err = ParseIntError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.trim().parse().map(Self)
    }
}

/// Top-level unit of work, parent of zero or more stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    pub id: EpicId,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Derived from `Story::epic_id`; kept here for fast reads and reload.
    pub story_ids: Vec<StoryId>,
}

/// Input for creating an epic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEpic {
    pub title: String,
    pub description: String,
    pub status: Status,
}

impl NewEpic {
    /// Creates input with default `Todo` status.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: Status::Todo,
        }
    }
}

/// Partial update for an epic. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpicPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
}

impl EpicPatch {
    /// Patch that only changes status.
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
