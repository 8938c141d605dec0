//! Fixed-width text rendering for epics and stories.
//!
//! Rendering is pure: every function returns the text to print so output
//! stays testable without capturing stdout.

use chrono::{DateTime, Utc};
use epicboard_core::{Epic, Story, Timestamp};
use std::fmt::Write;

const ID_WIDTH: usize = 11;
const TITLE_WIDTH: usize = 32;
const STATUS_WIDTH: usize = 17;

const DETAIL_ID_WIDTH: usize = 5;
const DETAIL_TITLE_WIDTH: usize = 12;
const DETAIL_DESCRIPTION_WIDTH: usize = 27;
const DETAIL_STATUS_WIDTH: usize = 13;

const EPICS_BANNER: &str = "----------------------------- EPICS ------------------------------";
const STORIES_BANNER: &str = "---------------------------- STORIES -----------------------------";
const EPIC_BANNER: &str = "------------------------------ EPIC ------------------------------";
const STORY_BANNER: &str = "------------------------------ STORY -----------------------------";

/// Pads `text` to exactly `width` characters, truncating with `...`.
///
/// Widths below four cannot fit any text next to the ellipsis, so they
/// render as dots only.
pub fn fit_column(text: &str, width: usize) -> String {
    let chars = text.chars().count();
    if chars <= width {
        let mut out = String::with_capacity(text.len() + width - chars);
        out.push_str(text);
        out.extend(std::iter::repeat(' ').take(width - chars));
        return out;
    }
    match width {
        0 => String::new(),
        1..=3 => ".".repeat(width),
        _ => {
            let mut out: String = text.chars().take(width - 3).collect();
            out.push_str("...");
            out
        }
    }
}

/// Table of every epic, one row per epic.
pub fn epic_table(epics: &[Epic]) -> String {
    let mut out = String::new();
    push_line(&mut out, EPICS_BANNER);
    push_line(&mut out, &table_header());
    for epic in epics {
        push_line(
            &mut out,
            &table_row(&epic.id.to_string(), &epic.title, epic.status.label()),
        );
    }
    if epics.is_empty() {
        push_line(&mut out, "(no epics)");
    }
    out
}

/// Epic detail followed by its stories table.
pub fn epic_detail(epic: &Epic, stories: &[Story]) -> String {
    let mut out = String::new();
    push_line(&mut out, EPIC_BANNER);
    push_line(&mut out, &detail_header());
    push_line(
        &mut out,
        &detail_row(
            &epic.id.to_string(),
            &epic.title,
            &epic.description,
            epic.status.label(),
        ),
    );
    push_line(&mut out, &timestamps(epic.created_at, epic.updated_at));
    out.push('\n');
    push_line(&mut out, STORIES_BANNER);
    push_line(&mut out, &table_header());
    for story in stories {
        push_line(
            &mut out,
            &table_row(&story.id.to_string(), &story.title, story.status.label()),
        );
    }
    if stories.is_empty() {
        push_line(&mut out, "(no stories)");
    }
    out
}

pub fn story_detail(story: &Story) -> String {
    let mut out = String::new();
    push_line(&mut out, STORY_BANNER);
    push_line(&mut out, &detail_header());
    push_line(
        &mut out,
        &detail_row(
            &story.id.to_string(),
            &story.title,
            &story.description,
            story.status.label(),
        ),
    );
    push_line(&mut out, &format!("epic: {}", story.epic_id));
    push_line(&mut out, &timestamps(story.created_at, story.updated_at));
    out
}

fn table_header() -> String {
    format!(
        "{} | {} | {}",
        centered("id", ID_WIDTH),
        centered("title", TITLE_WIDTH),
        centered("status", STATUS_WIDTH)
    )
}

fn table_row(id: &str, title: &str, status: &str) -> String {
    format!(
        "{} | {} | {}",
        fit_column(id, ID_WIDTH),
        fit_column(title, TITLE_WIDTH),
        fit_column(status, STATUS_WIDTH)
    )
}

fn detail_header() -> String {
    format!(
        "{} | {} | {} | {}",
        centered("id", DETAIL_ID_WIDTH),
        centered("title", DETAIL_TITLE_WIDTH),
        centered("description", DETAIL_DESCRIPTION_WIDTH),
        centered("status", DETAIL_STATUS_WIDTH)
    )
}

fn detail_row(id: &str, title: &str, description: &str, status: &str) -> String {
    format!(
        "{} | {} | {} | {}",
        fit_column(id, DETAIL_ID_WIDTH),
        fit_column(title, DETAIL_TITLE_WIDTH),
        fit_column(description, DETAIL_DESCRIPTION_WIDTH),
        fit_column(status, DETAIL_STATUS_WIDTH)
    )
}

fn centered(label: &str, width: usize) -> String {
    format!("{label:^width$}")
}

fn timestamps(created_at: Timestamp, updated_at: Timestamp) -> String {
    format!(
        "created: {}  updated: {}",
        format_timestamp(created_at),
        format_timestamp(updated_at)
    )
}

fn format_timestamp(ms: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn push_line(out: &mut String, line: &str) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{line}");
}
