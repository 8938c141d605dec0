//! Versioned JSON document format for tracker state.
//!
//! # Invariants
//! - `version` is checked before the body is interpreted.
//! - Epic and story sequences are written in creation order.
//! - `Epic::story_ids` is written for fast reload but is cross-checked
//!   against `Story::epic_id` on decode.

use crate::db::{DbError, DbResult};
use crate::model::epic::Epic;
use crate::model::story::Story;
use crate::store::id_gen::{EntityClass, IdGenerator};
use crate::store::Store;
use serde::{Deserialize, Serialize};

/// Document version written by this binary.
pub const CURRENT_VERSION: u32 = 1;

/// On-disk shape of the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDocument {
    pub version: u32,
    pub last_epic_id: u64,
    pub last_story_id: u64,
    pub epics: Vec<Epic>,
    pub stories: Vec<Story>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl StateDocument {
    /// Captures the full store state.
    pub fn from_store(store: &Store) -> Self {
        let ids = store.id_generator();
        Self {
            version: CURRENT_VERSION,
            last_epic_id: ids.high_water(EntityClass::Epic),
            last_story_id: ids.high_water(EntityClass::Story),
            epics: store.epics().cloned().collect(),
            stories: store.stories().cloned().collect(),
        }
    }

    /// Rebuilds an integrity-checked store.
    pub fn into_store(self) -> DbResult<Store> {
        if self.version != CURRENT_VERSION {
            return Err(DbError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_VERSION,
            });
        }
        let ids = IdGenerator::from_high_water(self.last_epic_id, self.last_story_id);
        Ok(Store::restore(ids, self.epics, self.stories)?)
    }
}

/// Encodes a store as pretty-printed JSON.
///
/// A store that `decode` would reject is never written.
pub fn encode(store: &Store) -> DbResult<Vec<u8>> {
    store.check_integrity()?;
    serde_json::to_vec_pretty(&StateDocument::from_store(store)).map_err(DbError::Encode)
}

/// Decodes and validates a JSON state document.
pub fn decode(bytes: &[u8]) -> DbResult<Store> {
    let probe: VersionProbe = serde_json::from_slice(bytes).map_err(DbError::Malformed)?;
    if probe.version != CURRENT_VERSION {
        return Err(DbError::UnsupportedVersion {
            found: probe.version,
            supported: CURRENT_VERSION,
        });
    }
    let document: StateDocument = serde_json::from_slice(bytes).map_err(DbError::Malformed)?;
    document.into_store()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::epic::{EpicId, EpicPatch, NewEpic};
    use crate::model::story::NewStory;
    use crate::store::IntegrityError;
    use serde_json::json;

    fn sample_store() -> Store {
        let mut store = Store::new();
        let epic_id = store.id_generator_mut().next_epic_id().unwrap();
        store.insert_epic(epic_id, NewEpic::new("Launch v1", "first cut")).unwrap();
        let story_id = store.id_generator_mut().next_story_id().unwrap();
        store
            .insert_story(story_id, NewStory::new(epic_id, "Design UI", ""))
            .unwrap();
        // Burn an id so the high-water mark is ahead of the stored records.
        store.id_generator_mut().next_story_id().unwrap();
        store
    }

    #[test]
    fn encode_then_decode_preserves_store() {
        let store = sample_store();
        let decoded = decode(&encode(&store).unwrap()).unwrap();
        assert_eq!(decoded, store);
        assert_eq!(decoded.id_generator().high_water(EntityClass::Story), 2);
    }

    #[test]
    fn encode_refuses_store_that_fails_integrity() {
        let mut store = sample_store();
        store
            .update_epic(
                EpicId::new(1),
                EpicPatch {
                    title: Some(String::new()),
                    ..EpicPatch::default()
                },
            )
            .unwrap();

        let err = encode(&store).unwrap_err();

        assert!(matches!(
            err,
            DbError::Integrity(IntegrityError::InvalidField { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn document_layout_uses_snake_case_fields() {
        let bytes = encode(&sample_store()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["version"], json!(1));
        assert_eq!(value["last_story_id"], json!(2));
        assert_eq!(value["epics"][0]["story_ids"], json!([1]));
        assert_eq!(value["stories"][0]["epic_id"], json!(1));
        assert_eq!(value["stories"][0]["status"], json!("todo"));
    }

    #[test]
    fn newer_version_is_rejected_before_body_parse() {
        let bytes = serde_json::to_vec(&json!({ "version": 2, "anything": true })).unwrap();
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DbError::UnsupportedVersion { found: 2, supported: 1 }
        ));
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn unknown_fields_are_corrupt_data() {
        let bytes = serde_json::to_vec(&json!({
            "version": 1,
            "last_epic_id": 0,
            "last_story_id": 0,
            "epics": [],
            "stories": [],
            "extra": 1
        }))
        .unwrap();
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, DbError::Malformed(_)));
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }
}
