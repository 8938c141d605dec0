//! Input validation rules for epic and story fields.
//!
//! # Invariants
//! - Normalizers trim surrounding whitespace before checking limits.
//! - A failed check never partially applies; callers validate everything
//!   before touching the store.

use thiserror::Error;

/// Maximum title length in characters, after trimming.
pub const MAX_TITLE_CHARS: usize = 200;
/// Maximum description length in characters, after trimming.
pub const MAX_DESCRIPTION_CHARS: usize = 4000;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be blank")]
    EmptyTitle,
    #[error("title exceeds {max} characters (got {actual})")]
    TitleTooLong { max: usize, actual: usize },
    #[error("description exceeds {max} characters (got {actual})")]
    DescriptionTooLong { max: usize, actual: usize },
    #[error("unknown status `{0}`; expected todo|in_progress|done")]
    UnknownStatus(String),
}

/// Trims and checks a title.
pub fn normalize_title(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    let actual = trimmed.chars().count();
    if actual > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong {
            max: MAX_TITLE_CHARS,
            actual,
        });
    }
    Ok(trimmed.to_string())
}

/// Trims and checks a description. Empty descriptions are allowed.
pub fn normalize_description(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let actual = trimmed.chars().count();
    if actual > MAX_DESCRIPTION_CHARS {
        return Err(ValidationError::DescriptionTooLong {
            max: MAX_DESCRIPTION_CHARS,
            actual,
        });
    }
    Ok(trimmed.to_string())
}
