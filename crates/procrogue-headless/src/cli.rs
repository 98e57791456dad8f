//! Command-line arguments.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use procrogue_replay::RunOptions;

use crate::error::CliError;

/// Verify ProcRogue replays without a window.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "procrogue-headless",
    version,
    about = "Verify ProcRogue replays headlessly",
    group(ArgGroup::new("input").required(true).args(["replay", "replay_dir"]))
)]
pub struct Args {
    /// Replay file to verify/play headlessly.
    #[arg(long, value_name = "PATH")]
    pub replay: Option<PathBuf>,

    /// Verify all .prr files in a directory (non-recursive).
    #[arg(long, value_name = "DIR")]
    pub replay_dir: Option<PathBuf>,

    /// Stop after the first failing replay in --replay-dir mode.
    #[arg(long)]
    pub stop_after_first_fail: bool,

    /// Optional content override INI to load.
    #[arg(long, value_name = "PATH")]
    pub content: Option<PathBuf>,

    /// Fixed simulation step in milliseconds (1..100).
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub frame_ms: u32,

    /// Do not verify StateHash checkpoints, even if present.
    #[arg(long)]
    pub no_verify_hashes: bool,

    /// Safety cap for simulated time in ms (0 = auto).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub max_ms: u32,

    /// Safety cap for frames (0 = auto).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub max_frames: u32,

    /// If a single replay fails due to hash mismatch, write a trimmed replay.
    #[arg(long, value_name = "PATH")]
    pub trim_on_fail: Option<PathBuf>,

    /// In --replay-dir mode, write trimmed failing replays into this directory.
    #[arg(long, value_name = "DIR")]
    pub trim_dir: Option<PathBuf>,

    /// Write a JSON summary report (useful for CI).
    #[arg(long, value_name = "PATH")]
    pub json_report: Option<PathBuf>,
}

/// What to verify.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode<'a> {
    /// One replay file.
    Single(&'a Path),
    /// Every `.prr` file in a directory.
    Directory(&'a Path),
}

impl Args {
    /// The input mode; exactly one of `--replay` and `--replay-dir`.
    pub fn mode(&self) -> Result<Mode<'_>, CliError> {
        match (&self.replay, &self.replay_dir) {
            (Some(file), None) => Ok(Mode::Single(file)),
            (None, Some(dir)) => Ok(Mode::Directory(dir)),
            (Some(_), Some(_)) => Err(CliError::Usage(
                "specify only one of --replay or --replay-dir".into(),
            )),
            (None, None) => Err(CliError::Usage(
                "missing --replay <file> or --replay-dir <dir>".into(),
            )),
        }
    }

    /// Runner options from the flags.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            frame_ms: self.frame_ms,
            verify_hashes: !self.no_verify_hashes,
            max_sim_ms: self.max_ms,
            max_frames: self.max_frames,
        }
    }

    /// Where a trimmed copy of `replay` goes if it desyncs, if anywhere.
    ///
    /// `--trim-on-fail` applies to the `--replay` file; otherwise
    /// `--trim-dir` receives `<stem>.trim.prr`.
    pub fn trim_target(&self, replay: &Path) -> Option<PathBuf> {
        if let Some(out) = &self.trim_on_fail {
            if self.replay.as_deref() == Some(replay) {
                return Some(out.clone());
            }
        }
        let dir = self.trim_dir.as_ref()?;
        let stem = replay.file_stem()?.to_string_lossy();
        Some(dir.join(format!("{stem}.trim.{}", procrogue_replay::FILE_EXTENSION)))
    }
}
