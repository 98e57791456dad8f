//! JSON summary reports.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use procrogue_replay::{ReplayError, RunOptions};
use serde::Serialize;

use crate::session::ReplayRunResult;
use crate::{GAME_VERSION, TOOL_NAME};

/// Top-level report document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Always [`TOOL_NAME`].
    pub tool: &'static str,
    /// Version of the verifying build.
    pub game_version: &'static str,
    /// Options as passed on the command line.
    pub options: ReportOptions,
    /// Pass/fail counts.
    pub summary: Summary,
    /// One entry per replay, in run order.
    pub results: Vec<ResultEntry>,
}

/// Runner options as passed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ReportOptions {
    pub frame_ms: u32,
    pub verify_hashes: bool,
    pub max_sim_ms: u32,
    pub max_frames: u32,
}

/// Pass/fail counts.
#[derive(Debug, Serialize)]
#[allow(missing_docs)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
}

/// One replay's outcome.
///
/// Failure fields are omitted for passing replays; hash fields appear
/// only for hash mismatches.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ResultEntry {
    pub file: String,
    pub ok: bool,
    pub turns: u32,
    pub events_dispatched: u32,
    pub simulated_ms: u32,
    pub frames: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_turn: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_checkpoint_turn: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub got_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimmed_replay: Option<String>,
}

impl ResultEntry {
    fn from_result(r: &ReplayRunResult) -> Self {
        let mut entry = Self {
            file: r.file.display().to_string(),
            ok: r.is_ok(),
            turns: r.stats.turns,
            events_dispatched: r.stats.events_dispatched,
            simulated_ms: r.stats.simulated_ms,
            frames: r.stats.frames,
            failure: None,
            error: None,
            failed_turn: None,
            failed_checkpoint_turn: None,
            expected_hash: None,
            got_hash: None,
            trimmed_replay: None,
        };
        let Some(err) = &r.error else {
            return entry;
        };
        entry.failure = Some(r.failure().name());
        entry.error = Some(err.to_string());
        if let ReplayError::HashMismatch { desync, .. } = err {
            entry.failed_turn = Some(desync.failed_turn);
            entry.failed_checkpoint_turn = Some(desync.expected_turn);
            entry.expected_hash = Some(format!("{:#x}", desync.expected_hash));
            entry.got_hash = Some(format!("{:#x}", desync.got_hash));
        }
        entry.trimmed_replay = r.trimmed.as_ref().map(|p| p.display().to_string());
        entry
    }
}

impl Report {
    /// Summarise `results` run with `opts`.
    pub fn new(results: &[ReplayRunResult], opts: &RunOptions) -> Self {
        let ok = results.iter().filter(|r| r.is_ok()).count();
        Self {
            tool: TOOL_NAME,
            game_version: GAME_VERSION,
            options: ReportOptions {
                frame_ms: opts.frame_ms,
                verify_hashes: opts.verify_hashes,
                max_sim_ms: opts.max_sim_ms,
                max_frames: opts.max_frames,
            },
            summary: Summary {
                total: results.len(),
                ok,
                failed: results.len() - ok,
            },
            results: results.iter().map(ResultEntry::from_result).collect(),
        }
    }
}

/// Write the report for `results` to `path` as pretty-printed JSON.
pub fn write_json_report(
    path: &Path,
    results: &[ReplayRunResult],
    opts: &RunOptions,
) -> io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, &Report::new(results, opts))?;
    writeln!(w)?;
    w.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use procrogue_replay::{Desync, RunStats};
    use std::path::PathBuf;

    fn passing() -> ReplayRunResult {
        ReplayRunResult {
            file: PathBuf::from("a.prr"),
            stats: RunStats {
                simulated_ms: 32,
                frames: 2,
                events_dispatched: 1,
                turns: 1,
            },
            error: None,
            trimmed: None,
        }
    }

    fn desynced() -> ReplayRunResult {
        let stats = RunStats {
            simulated_ms: 48,
            frames: 3,
            events_dispatched: 2,
            turns: 4,
        };
        ReplayRunResult {
            file: PathBuf::from("b.prr"),
            stats,
            error: Some(ReplayError::HashMismatch {
                desync: Desync {
                    failed_turn: 4,
                    expected_turn: 3,
                    expected_hash: 0xAA,
                    got_hash: 0xBB,
                },
                stats,
            }),
            trimmed: Some(PathBuf::from("b.trim.prr")),
        }
    }

    #[test]
    fn passing_entries_omit_failure_fields() {
        let v = serde_json::to_value(Report::new(&[passing()], &RunOptions::default())).unwrap();
        assert_eq!(v["tool"], "ProcRogueHeadless");
        assert_eq!(v["options"]["frameMs"], 16);
        assert_eq!(v["options"]["verifyHashes"], true);
        assert_eq!(v["summary"]["ok"], 1);
        let entry = &v["results"][0];
        assert_eq!(entry["eventsDispatched"], 1);
        assert_eq!(entry["simulatedMs"], 32);
        assert!(entry.get("failure").is_none());
        assert!(entry.get("error").is_none());
    }

    #[test]
    fn desync_entries_carry_hashes() {
        let v = serde_json::to_value(Report::new(
            &[passing(), desynced()],
            &RunOptions::default(),
        ))
        .unwrap();
        assert_eq!(v["summary"]["total"], 2);
        assert_eq!(v["summary"]["failed"], 1);
        let entry = &v["results"][1];
        assert_eq!(entry["ok"], false);
        assert_eq!(entry["failure"], "hash_mismatch");
        assert_eq!(entry["failedTurn"], 4);
        assert_eq!(entry["failedCheckpointTurn"], 3);
        assert_eq!(entry["expectedHash"], "0xaa");
        assert_eq!(entry["gotHash"], "0xbb");
        assert_eq!(entry["trimmedReplay"], "b.trim.prr");
        assert!(entry["error"]
            .as_str()
            .unwrap()
            .contains("missed checkpoint turn 3"));
    }

    #[test]
    fn report_file_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_report(&path, &[desynced()], &RunOptions::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["results"][0]["file"], "b.prr");
    }
}
