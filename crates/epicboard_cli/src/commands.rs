//! Dispatches parsed subcommands onto the repository.

use crate::cli::{Command, EpicCommand, FieldArgs, StoryCommand};
use crate::render;
use epicboard_core::{
    EpicPatch, ErrorKind, IssueRepository, NewEpic, NewStory, RepoError, RepoResult, Storage,
    StoryPatch,
};

/// Runs one command and returns the text to print on success.
pub fn execute<S: Storage>(repo: &mut IssueRepository<S>, command: Command) -> RepoResult<String> {
    match command {
        Command::Epic(command) => execute_epic(repo, command),
        Command::Story(command) => execute_story(repo, command),
    }
}

fn execute_epic<S: Storage>(
    repo: &mut IssueRepository<S>,
    command: EpicCommand,
) -> RepoResult<String> {
    match command {
        EpicCommand::List => Ok(render::epic_table(&repo.list_epics())),
        EpicCommand::Show { id } => {
            let epic = repo.get_epic(id)?;
            let stories = repo.list_stories_by_epic(id)?;
            Ok(render::epic_detail(&epic, &stories))
        }
        EpicCommand::Create {
            title,
            description,
            status,
        } => {
            let epic = repo.create_epic(NewEpic {
                title,
                description,
                status: status.unwrap_or_default(),
            })?;
            Ok(format!("created epic {}\n", epic.id))
        }
        EpicCommand::Update { id, fields } => {
            let FieldArgs {
                title,
                description,
                status,
            } = fields;
            let epic = repo.update_epic(
                id,
                EpicPatch {
                    title,
                    description,
                    status,
                },
            )?;
            Ok(format!("updated epic {}\n", epic.id))
        }
        EpicCommand::Delete { id, .. } => {
            let deleted = repo.delete_epic(id)?;
            Ok(format!(
                "deleted epic {} and {} stories\n",
                deleted.epic.id,
                deleted.stories.len()
            ))
        }
    }
}

fn execute_story<S: Storage>(
    repo: &mut IssueRepository<S>,
    command: StoryCommand,
) -> RepoResult<String> {
    match command {
        StoryCommand::Show { id } => Ok(render::story_detail(&repo.get_story(id)?)),
        StoryCommand::Create {
            epic,
            title,
            description,
            status,
        } => {
            let story = repo.create_story(NewStory {
                epic_id: epic,
                title,
                description,
                status: status.unwrap_or_default(),
            })?;
            Ok(format!("created story {} in epic {}\n", story.id, story.epic_id))
        }
        StoryCommand::Update { id, fields, epic } => {
            let FieldArgs {
                title,
                description,
                status,
            } = fields;
            let story = repo.update_story(
                id,
                StoryPatch {
                    epic_id: epic,
                    title,
                    description,
                    status,
                },
            )?;
            Ok(format!("updated story {}\n", story.id))
        }
        StoryCommand::Delete { id, .. } => {
            let story = repo.delete_story(id)?;
            Ok(format!("deleted story {}\n", story.id))
        }
    }
}

/// Question to ask before a delete that was not confirmed with `--yes`.
///
/// Unknown ids fail here with `NotFound`, before anyone is asked anything.
pub fn confirmation_prompt<S: Storage>(
    repo: &IssueRepository<S>,
    command: &Command,
) -> RepoResult<Option<String>> {
    match command {
        Command::Epic(EpicCommand::Delete { id, yes: false }) => {
            let stories = repo.list_stories_by_epic(*id)?.len();
            Ok(Some(format!(
                "Delete epic {id}? Its {stories} stories will also be deleted [y/N]: "
            )))
        }
        Command::Story(StoryCommand::Delete { id, yes: false }) => {
            repo.get_story(*id)?;
            Ok(Some(format!("Delete story {id}? [y/N]: ")))
        }
        _ => Ok(None),
    }
}

pub fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Process exit status for a failed command.
pub fn exit_status(err: &RepoError) -> u8 {
    if err.is_applied() {
        return 3;
    }
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::Validation => 2,
        ErrorKind::CorruptData | ErrorKind::Io => 1,
    }
}
