//! Error types for the replay system.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::runner::{FailureKind, RunStats};
use crate::verify::Desync;

/// Errors that can occur during replay recording, loading, or playback.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred on an already-open stream.
    Io(io::Error),
    /// A replay file could not be opened for reading or writing.
    Open {
        /// The file that could not be opened.
        path: PathBuf,
        /// The underlying OS error.
        source: io::Error,
    },
    /// The replay file is structurally invalid.
    Parse {
        /// The file being parsed.
        path: PathBuf,
        /// 1-based line number, or `None` for end-of-file conditions.
        line: Option<usize>,
        /// Human-readable description of what went wrong.
        reason: String,
    },
    /// Live simulation state diverged from a recorded checkpoint.
    HashMismatch {
        /// Where and how the divergence was detected.
        desync: Desync,
        /// Playback progress at the time of detection.
        stats: RunStats,
    },
    /// The runner hit its simulated-time or frame cap before the replay
    /// finished.
    SafetyLimit {
        /// Playback progress when the cap tripped.
        stats: RunStats,
        /// The effective simulated-time cap.
        max_sim_ms: u32,
        /// The effective frame cap.
        max_frames: u32,
    },
    /// A replay could not be trimmed because it has no checkpoint at or
    /// before the requested turn.
    NoCheckpoint {
        /// The checkpoint turn the trim was anchored on.
        turn: u32,
    },
}

impl ReplayError {
    /// Shorthand for a line-numbered parse error.
    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line: Some(line),
            reason: reason.into(),
        }
    }

    /// The stable failure category used by tooling and reports.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::HashMismatch { .. } => FailureKind::HashMismatch,
            Self::SafetyLimit { .. } => FailureKind::SafetyLimit,
            _ => FailureKind::Unknown,
        }
    }

    /// Playback statistics, for failures that happened mid-run.
    pub fn stats(&self) -> Option<&RunStats> {
        match self {
            Self::HashMismatch { stats, .. } | Self::SafetyLimit { stats, .. } => Some(stats),
            _ => None,
        }
    }
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Open { path, source } => {
                write!(f, "failed to open replay {}: {source}", path.display())
            }
            Self::Parse { path, line, reason } => match line {
                Some(line) => write!(
                    f,
                    "replay parse error ({reason}) at {}:{line}",
                    path.display()
                ),
                None => write!(f, "replay parse error ({reason}) in {}", path.display()),
            },
            Self::HashMismatch { desync, .. } => write!(f, "{desync}"),
            Self::SafetyLimit {
                stats, max_sim_ms, ..
            } => write!(
                f,
                "replay runner exceeded safety limit (elapsedMs={}, frames={}, maxSimMs={max_sim_ms})",
                stats.simulated_ms, stats.frames
            ),
            Self::NoCheckpoint { turn } => {
                write!(f, "replay contains no StateHash checkpoints <= turn {turn}")
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Open { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
