//! Front-end errors and their exit codes.

use std::fmt;
use std::io;

use procrogue_dungeon::ContentError;

/// Errors that end a `procrogue-headless` invocation early.
///
/// Replay failures are not errors here: they are collected as results
/// and reflected in the exit status.
#[derive(Debug)]
pub enum CliError {
    /// Bad or contradictory arguments, or nothing to verify.
    Usage(String),
    /// The `--content` file could not be read.
    Content(ContentError),
    /// Writing to stdout failed.
    Io(io::Error),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            Self::Content(_) | Self::Io(_) => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => f.write_str(msg),
            Self::Content(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "output error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Usage(_) => None,
            Self::Content(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ContentError> for CliError {
    fn from(e: ContentError) -> Self {
        Self::Content(e)
    }
}
