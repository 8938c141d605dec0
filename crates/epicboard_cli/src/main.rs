//! `epicboard` command-line entry point.
//!
//! # Responsibility
//! - Resolve settings, start logging, load the tracker state.
//! - Run exactly one subcommand and map its outcome to an exit status.
//!
//! Exit statuses: 0 success, 1 unusable settings or corrupt/unreadable
//! state (at startup or detected by a command), 2 not found or invalid
//! input or a declined delete, 3 change applied but not saved.

mod cli;
mod commands;
mod config;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use config::Settings;
use epicboard_core::{init_logging, IssueRepository, JsonFileStorage};
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let settings = Settings::resolve(cli.data_file, cli.log_dir, cli.log_level, cli.no_log)?;

    if let Some(logging) = &settings.logging {
        // Best effort: the tracker still runs without log files.
        if let Err(err) = init_logging(&logging.level, &logging.dir.to_string_lossy()) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let storage = JsonFileStorage::new(&settings.data_file);
    let mut repo = IssueRepository::open(storage).with_context(|| {
        format!(
            "refusing to start with state file `{}`",
            settings.data_file.display()
        )
    })?;
    info!(
        "event=cli_start module=cli status=ok core_version={}",
        epicboard_core::core_version()
    );

    let prompt = commands::confirmation_prompt(&repo, &cli.command);
    let outcome = match prompt {
        Ok(Some(prompt)) if !confirm(&prompt)? => {
            eprintln!("aborted; pass --yes to delete without asking");
            return Ok(2);
        }
        Ok(_) => commands::execute(&mut repo, cli.command),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(output) => {
            print!("{output}");
            Ok(0)
        }
        Err(err) => {
            let status = commands::exit_status(&err);
            error!(
                "event=cli_command module=cli status=error error_code={} exit_status={}",
                err.kind(),
                status
            );
            eprintln!("error: {err}");
            if err.is_applied() {
                eprintln!("the change was not saved and is lost on exit");
            }
            Ok(status)
        }
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt}");
    io::stderr().flush().context("failed to write prompt")?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(commands::is_confirmed(&answer))
}
