use epicboard_core::{
    EpicId, EpicPatch, IssueRepository, JsonFileStorage, NewEpic, NewStory, Status,
    StoryId, StoryPatch,
};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

#[derive(Debug, Clone)]
enum Mutation {
    CreateEpic(String),
    CreateStory { epic: usize, title: String },
    UpdateEpic { epic: usize, title: Option<String>, status: Option<Status> },
    UpdateStory { story: usize, move_to: Option<usize>, status: Option<Status> },
    DeleteEpic(usize),
    DeleteStory(usize),
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Todo),
        Just(Status::InProgress),
        Just(Status::Done),
    ]
}

fn arb_title() -> impl Strategy<Value = String> {
    "[a-z][a-z ]{0,15}"
}

fn arb_mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        3 => arb_title().prop_map(Mutation::CreateEpic),
        4 => (any::<usize>(), arb_title())
            .prop_map(|(epic, title)| Mutation::CreateStory { epic, title }),
        2 => (any::<usize>(), proptest::option::of(arb_title()), proptest::option::of(arb_status()))
            .prop_map(|(epic, title, status)| Mutation::UpdateEpic { epic, title, status }),
        3 => (any::<usize>(), proptest::option::of(any::<usize>()), proptest::option::of(arb_status()))
            .prop_map(|(story, move_to, status)| Mutation::UpdateStory { story, move_to, status }),
        1 => any::<usize>().prop_map(Mutation::DeleteEpic),
        1 => any::<usize>().prop_map(Mutation::DeleteStory),
    ]
}

/// Picks an existing id by index, or `None` when there is nothing to pick.
fn pick<T: Copy>(ids: &[T], index: usize) -> Option<T> {
    if ids.is_empty() {
        None
    } else {
        Some(ids[index % ids.len()])
    }
}

fn apply(repo: &mut IssueRepository<JsonFileStorage>, mutation: Mutation) {
    let epics: Vec<EpicId> = repo.store().epics().map(|epic| epic.id).collect();
    let stories: Vec<StoryId> = repo.store().stories().map(|story| story.id).collect();

    let result = match mutation {
        Mutation::CreateEpic(title) => repo.create_epic(NewEpic::new(title, "")).map(drop),
        Mutation::CreateStory { epic, title } => match pick(&epics, epic) {
            Some(epic_id) => repo
                .create_story(NewStory::new(epic_id, title, ""))
                .map(drop),
            None => Ok(()),
        },
        Mutation::UpdateEpic { epic, title, status } => match pick(&epics, epic) {
            Some(epic_id) => repo
                .update_epic(
                    epic_id,
                    EpicPatch {
                        title,
                        description: None,
                        status,
                    },
                )
                .map(drop),
            None => Ok(()),
        },
        Mutation::UpdateStory {
            story,
            move_to,
            status,
        } => match pick(&stories, story) {
            Some(story_id) => repo
                .update_story(
                    story_id,
                    StoryPatch {
                        epic_id: move_to.and_then(|index| pick(&epics, index)),
                        title: None,
                        description: None,
                        status,
                    },
                )
                .map(drop),
            None => Ok(()),
        },
        Mutation::DeleteEpic(epic) => match pick(&epics, epic) {
            Some(epic_id) => repo.delete_epic(epic_id).map(drop),
            None => Ok(()),
        },
        Mutation::DeleteStory(story) => match pick(&stories, story) {
            Some(story_id) => repo.delete_story(story_id).map(drop),
            None => Ok(()),
        },
    };

    if let Err(err) = result {
        panic!("valid mutation failed: {err}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn reload_reproduces_state_after_any_mutation_sequence(
        mutations in prop::collection::vec(arb_mutation(), 0..40)
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut repo = IssueRepository::open(JsonFileStorage::new(&path)).unwrap();

        for mutation in mutations {
            apply(&mut repo, mutation);
            prop_assert!(repo.store().check_integrity().is_ok());
        }
        prop_assert!(repo.is_durable());

        let reopened = IssueRepository::open(JsonFileStorage::new(&path)).unwrap();
        prop_assert_eq!(reopened.store(), repo.store());
    }
}
