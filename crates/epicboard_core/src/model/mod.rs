//! Domain model for the epic/story hierarchy.
//!
//! # Responsibility
//! - Define the records owned by the store and the inputs used to build them.
//! - Keep field validation rules next to the types they protect.
//!
//! # Invariants
//! - `Story::epic_id` is the authoritative parent link.
//! - `Epic::story_ids` is a derived view ordered by creation (ascending id).
//! - `updated_at >= created_at` on every record.

pub mod epic;
pub mod status;
pub mod story;
pub mod validation;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

use epic::EpicId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use story::StoryId;

/// Reference to either entity class, used in errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum IssueRef {
    Epic(EpicId),
    Story(StoryId),
}

impl Display for IssueRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Epic(id) => write!(f, "epic {id}"),
            Self::Story(id) => write!(f, "story {id}"),
        }
    }
}

impl From<EpicId> for IssueRef {
    fn from(value: EpicId) -> Self {
        Self::Epic(value)
    }
}

impl From<StoryId> for IssueRef {
    fn from(value: StoryId) -> Self {
        Self::Story(value)
    }
}
