//! Error taxonomy shared by every core layer.

use std::fmt::{Display, Formatter};

/// Coarse classification used by callers to decide how to react.
///
/// - `NotFound` and `Validation` are recoverable input errors.
/// - `CorruptData` is fatal at startup.
/// - `Io` is fatal at startup and recoverable after a failed flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    CorruptData,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::CorruptData => "corrupt_data",
            Self::Io => "io",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
