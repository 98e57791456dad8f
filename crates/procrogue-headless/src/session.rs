//! Running replays and printing results.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use procrogue_dungeon::{DungeonContent, ReferenceDungeon};
use procrogue_replay::{
    build_trimmed_replay, load_replay_file, prepare_game_for_replay, run_replay_headless,
    write_replay_file, FailureKind, ReplayError, RunOptions, RunStats, FILE_EXTENSION,
};

use crate::cli::{Args, Mode};
use crate::error::CliError;
use crate::report::write_json_report;
use crate::GAME_VERSION;

/// Outcome of verifying one replay file.
#[derive(Debug)]
pub struct ReplayRunResult {
    /// The replay that was run.
    pub file: PathBuf,
    /// Progress counters; all zero if the file failed to load.
    pub stats: RunStats,
    /// Why the run failed, if it did.
    pub error: Option<ReplayError>,
    /// Where a trimmed copy was written.
    pub trimmed: Option<PathBuf>,
}

impl ReplayRunResult {
    /// Whether the replay verified.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Failure category for reports.
    pub fn failure(&self) -> FailureKind {
        self.error
            .as_ref()
            .map_or(FailureKind::None, ReplayError::failure_kind)
    }
}

/// Load, prepare and play `path` on a fresh dungeon.
///
/// On a hash mismatch with `trim_to` set, the replay is cut at the
/// failing checkpoint and written there. Trim failures are reported on
/// stderr and leave the result unchanged.
pub fn run_one(
    path: &Path,
    content: &DungeonContent,
    opts: &RunOptions,
    trim_to: Option<PathBuf>,
) -> ReplayRunResult {
    let mut result = ReplayRunResult {
        file: path.to_path_buf(),
        stats: RunStats::default(),
        error: None,
        trimmed: None,
    };

    let replay = match load_replay_file(path) {
        Ok(replay) => replay,
        Err(e) => {
            result.error = Some(e);
            return result;
        }
    };

    let recorded = replay.meta.game_version.as_str();
    if !recorded.is_empty() && recorded != GAME_VERSION {
        tracing::warn!(
            file = %path.display(),
            recorded,
            running = GAME_VERSION,
            "replay was recorded by a different game version"
        );
    }

    let mut sim = ReferenceDungeon::new(content.clone());
    prepare_game_for_replay(&mut sim, &replay);
    match run_replay_headless(&mut sim, &replay, opts) {
        Ok(stats) => result.stats = stats,
        Err(e) => {
            if let Some(stats) = e.stats() {
                result.stats = *stats;
            }
            if let (ReplayError::HashMismatch { desync, .. }, Some(out)) = (&e, trim_to) {
                let trimmed = prepare_trim_dir(&out)
                    .map_err(ReplayError::from)
                    .and_then(|()| build_trimmed_replay(&replay, desync.expected_turn))
                    .and_then(|t| write_replay_file(&out, &t));
                match trimmed {
                    Ok(()) => result.trimmed = Some(out),
                    Err(te) => eprintln!("Trim failed for {}: {te}", path.display()),
                }
            }
            result.error = Some(e);
        }
    }
    result
}

fn prepare_trim_dir(out: &Path) -> io::Result<()> {
    match out.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Every `.prr` file directly inside `dir`, sorted by path.
pub fn list_replay_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == FILE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Execute one invocation, printing results to `out`.
///
/// Returns whether every replay verified. Errors are reserved for
/// conditions that prevent running at all.
pub fn run(args: &Args, out: &mut dyn Write) -> Result<bool, CliError> {
    let mode = args.mode()?;

    let content = match &args.content {
        Some(path) => {
            let (content, warnings) = DungeonContent::load(path)?;
            for w in &warnings {
                writeln!(out, "{w}")?;
            }
            content
        }
        None => DungeonContent::default(),
    };
    let opts = args.run_options();
    let mut results = Vec::new();

    match mode {
        Mode::Single(path) => {
            let r = run_one(path, &content, &opts, args.trim_target(path));
            match &r.error {
                None => writeln!(
                    out,
                    "Replay OK: {} turns={} events={} simMs={} frames={}",
                    path.display(),
                    r.stats.turns,
                    r.stats.events_dispatched,
                    r.stats.simulated_ms,
                    r.stats.frames
                )?,
                Some(e) => {
                    writeln!(out, "Replay FAILED: {}", path.display())?;
                    writeln!(out, "  {e}")?;
                    if let Some(t) = &r.trimmed {
                        writeln!(out, "  Trimmed replay written: {}", t.display())?;
                    }
                }
            }
            results.push(r);
        }
        Mode::Directory(dir) => {
            let files = list_replay_files(dir).unwrap_or_default();
            if files.is_empty() {
                return Err(CliError::Usage(format!(
                    "no .prr replays found in: {}",
                    dir.display()
                )));
            }
            for path in &files {
                let r = run_one(path, &content, &opts, args.trim_target(path));
                let failed = !r.is_ok();
                match &r.error {
                    None => writeln!(
                        out,
                        "OK   {} turns={} events={}",
                        file_name(path),
                        r.stats.turns,
                        r.stats.events_dispatched
                    )?,
                    Some(e) => {
                        writeln!(out, "FAIL {}  {e}", file_name(path))?;
                        if let Some(t) = &r.trimmed {
                            writeln!(out, "     trimmed: {}", file_name(t))?;
                        }
                    }
                }
                results.push(r);
                if failed && args.stop_after_first_fail {
                    break;
                }
            }
            let ok = results.iter().filter(|r| r.is_ok()).count();
            writeln!(
                out,
                "Summary: total={} ok={} failed={}",
                results.len(),
                ok,
                results.len() - ok
            )?;
        }
    }

    if let Some(path) = &args.json_report {
        if let Err(e) = write_json_report(path, &results, &opts) {
            eprintln!("failed to write JSON report {}: {e}", path.display());
        }
    }

    Ok(results.iter().all(ReplayRunResult::is_ok))
}
