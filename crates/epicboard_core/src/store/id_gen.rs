//! Per-class identifier generator.
//!
//! # Invariants
//! - Each class has its own monotonically increasing counter.
//! - A value is never returned twice for the same class; the high-water
//!   marks are persisted with the store so restarts continue past them.

use crate::model::epic::EpicId;
use crate::model::story::StoryId;
use std::fmt::{Display, Formatter};

/// Entity class an identifier is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Epic,
    Story,
}

impl Display for EntityClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Epic => f.write_str("epic"),
            Self::Story => f.write_str("story"),
        }
    }
}

/// Counter-based id source with one high-water mark per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdGenerator {
    last_epic_id: u64,
    last_story_id: u64,
}

impl IdGenerator {
    /// Starts an empty generator; the first id of each class is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes from persisted high-water marks.
    pub fn from_high_water(last_epic_id: u64, last_story_id: u64) -> Self {
        Self {
            last_epic_id,
            last_story_id,
        }
    }

    /// Highest id ever issued for `class` (0 if none).
    pub fn high_water(&self, class: EntityClass) -> u64 {
        match class {
            EntityClass::Epic => self.last_epic_id,
            EntityClass::Story => self.last_story_id,
        }
    }

    /// Issues the next id for `class`.
    ///
    /// Returns `None` only when the class counter is exhausted.
    pub fn generate(&mut self, class: EntityClass) -> Option<u64> {
        let counter = match class {
            EntityClass::Epic => &mut self.last_epic_id,
            EntityClass::Story => &mut self.last_story_id,
        };
        let next = counter.checked_add(1)?;
        *counter = next;
        Some(next)
    }

    pub fn next_epic_id(&mut self) -> Option<EpicId> {
        self.generate(EntityClass::Epic).map(EpicId::new)
    }

    pub fn next_story_id(&mut self) -> Option<StoryId> {
        self.generate(EntityClass::Story).map(StoryId::new)
    }
}
