use epicboard_core::{
    EpicId, ErrorKind, IssueRef, IssueRepository, MemoryStorage, NewEpic, NewStory, RepoError,
    Status, StoryId, StoryPatch,
};

fn setup() -> (IssueRepository<MemoryStorage>, EpicId) {
    let mut repo = IssueRepository::open(MemoryStorage::new()).unwrap();
    let epic = repo.create_epic(NewEpic::new("Launch v1", "")).unwrap();
    (repo, epic.id)
}

#[test]
fn create_story_appends_to_epic_index() {
    let (mut repo, epic_id) = setup();

    let first = repo
        .create_story(NewStory::new(epic_id, "Design UI", ""))
        .unwrap();
    let second = repo
        .create_story(NewStory::new(epic_id, "Build API", "REST"))
        .unwrap();

    assert_eq!(second.epic_id, epic_id);
    let epic = repo.get_epic(epic_id).unwrap();
    assert_eq!(epic.story_ids, vec![first.id, second.id]);
    assert_eq!(
        epic.story_ids.iter().filter(|id| **id == second.id).count(),
        1
    );

    let listed = repo.list_stories_by_epic(epic_id).unwrap();
    assert_eq!(listed, vec![first, second]);
}

#[test]
fn create_story_under_missing_epic_changes_nothing() {
    let (mut repo, epic_id) = setup();
    repo.create_story(NewStory::new(epic_id, "Existing", "")).unwrap();
    let epics_before = repo.list_epics();
    let stories_before = repo.list_stories_by_epic(epic_id).unwrap();
    let saves_before = repo.storage().save_count();

    let err = repo
        .create_story(NewStory::new(EpicId::new(404), "Orphan", ""))
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound(IssueRef::Epic(id)) if id == EpicId::new(404)));
    assert_eq!(repo.list_epics(), epics_before);
    assert_eq!(repo.list_stories_by_epic(epic_id).unwrap(), stories_before);
    assert_eq!(repo.storage().save_count(), saves_before);

    // No id was burnt by the failed call.
    let next = repo.create_story(NewStory::new(epic_id, "Next", "")).unwrap();
    assert_eq!(next.id, StoryId::new(2));
}

#[test]
fn update_story_status_refreshes_updated_at() {
    let (mut repo, epic_id) = setup();
    let s1 = repo
        .create_story(NewStory::new(epic_id, "Design UI", ""))
        .unwrap();

    repo.update_story(s1.id, StoryPatch::status(Status::Done))
        .unwrap();

    let loaded = repo.get_story(s1.id).unwrap();
    assert_eq!(loaded.status, Status::Done);
    assert!(loaded.updated_at > loaded.created_at);
}

#[test]
fn set_story_status_is_an_update_shortcut() {
    let (mut repo, epic_id) = setup();
    let story = repo.create_story(NewStory::new(epic_id, "Task", "")).unwrap();

    let updated = repo.set_story_status(story.id, Status::InProgress).unwrap();

    assert_eq!(updated.status, Status::InProgress);
    assert_eq!(updated.title, "Task");
}

#[test]
fn reparenting_updates_both_epics() {
    let (mut repo, source) = setup();
    let target = repo.create_epic(NewEpic::new("Launch v2", "")).unwrap().id;
    let moving = repo.create_story(NewStory::new(source, "Move me", "")).unwrap();
    let staying = repo.create_story(NewStory::new(source, "Stay", "")).unwrap();

    let moved = repo
        .update_story(
            moving.id,
            StoryPatch {
                epic_id: Some(target),
                ..StoryPatch::default()
            },
        )
        .unwrap();

    assert_eq!(moved.epic_id, target);
    assert_eq!(repo.get_epic(source).unwrap().story_ids, vec![staying.id]);
    assert_eq!(repo.get_epic(target).unwrap().story_ids, vec![moving.id]);
    repo.store().check_integrity().unwrap();
}

#[test]
fn reparenting_to_missing_epic_is_not_found() {
    let (mut repo, epic_id) = setup();
    let story = repo.create_story(NewStory::new(epic_id, "Stay", "")).unwrap();

    let err = repo
        .update_story(
            story.id,
            StoryPatch {
                epic_id: Some(EpicId::new(77)),
                status: Some(Status::Done),
                ..StoryPatch::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, RepoError::NotFound(IssueRef::Epic(id)) if id == EpicId::new(77)));
    assert_eq!(repo.get_story(story.id).unwrap(), story);
}

#[test]
fn update_story_rejects_blank_title() {
    let (mut repo, epic_id) = setup();
    let story = repo.create_story(NewStory::new(epic_id, "Stay", "")).unwrap();

    let err = repo
        .update_story(
            story.id,
            StoryPatch {
                title: Some(" \t ".to_string()),
                ..StoryPatch::default()
            },
        )
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(repo.get_story(story.id).unwrap(), story);
}

#[test]
fn delete_story_removes_it_from_epic() {
    let (mut repo, epic_id) = setup();
    let first = repo.create_story(NewStory::new(epic_id, "One", "")).unwrap();
    let second = repo.create_story(NewStory::new(epic_id, "Two", "")).unwrap();

    let removed = repo.delete_story(first.id).unwrap();

    assert_eq!(removed.id, first.id);
    assert_eq!(repo.get_epic(epic_id).unwrap().story_ids, vec![second.id]);
    assert_eq!(
        repo.delete_story(first.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn list_stories_distinguishes_empty_epic_from_missing_epic() {
    let (repo, epic_id) = setup();

    assert!(repo.list_stories_by_epic(epic_id).unwrap().is_empty());
    assert_eq!(
        repo.list_stories_by_epic(EpicId::new(2)).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn update_story_on_missing_story_is_not_found() {
    let (mut repo, epic_id) = setup();
    let story = repo
        .create_story(NewStory::new(epic_id, "Design UI", ""))
        .unwrap();
    repo.delete_story(story.id).unwrap();
    let saves_before = repo.storage().save_count();

    for missing in [story.id, StoryId::new(99)] {
        let err = repo
            .update_story(missing, StoryPatch::status(Status::Done))
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(IssueRef::Story(id)) if id == missing));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    assert_eq!(repo.storage().save_count(), saves_before);
    assert_eq!(repo.store().story_count(), 0);
}
