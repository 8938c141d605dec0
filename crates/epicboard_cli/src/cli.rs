use clap::{Args, Parser, Subcommand};
use epicboard_core::{EpicId, Status, StoryId};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "epicboard")]
#[command(version, about = "Track epics and their stories in a local JSON file")]
pub struct Cli {
    /// JSON state file
    #[arg(long, env = "EPICBOARD_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Directory for rolling log files
    #[arg(long, env = "EPICBOARD_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "EPICBOARD_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Do not write log files
    #[arg(long, global = true)]
    pub no_log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage epics
    #[command(subcommand)]
    Epic(EpicCommand),
    /// Manage stories
    #[command(subcommand)]
    Story(StoryCommand),
}

#[derive(Debug, Subcommand)]
pub enum EpicCommand {
    /// List every epic in creation order
    List,
    /// Show an epic and its stories
    Show { id: EpicId },
    /// Create an epic
    Create {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long)]
        status: Option<Status>,
    },
    /// Update fields of an epic
    Update {
        id: EpicId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an epic together with its stories
    Delete {
        id: EpicId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum StoryCommand {
    /// Show a story
    Show { id: StoryId },
    /// Create a story under an epic
    Create {
        epic: EpicId,
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long)]
        status: Option<Status>,
    },
    /// Update fields of a story, optionally moving it to another epic
    Update {
        id: StoryId,
        #[command(flatten)]
        fields: FieldArgs,
        /// Move the story to this epic
        #[arg(long)]
        epic: Option<EpicId>,
    },
    /// Delete a story
    Delete {
        id: StoryId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Optional field overrides shared by the update commands.
#[derive(Debug, Default, Args)]
pub struct FieldArgs {
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// todo|in_progress|done
    #[arg(short, long)]
    pub status: Option<Status>,
}
