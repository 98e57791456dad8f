//! Headless verification of ProcRogue replay recordings.
//!
//! Loads `.prr` files, plays each one against a fresh
//! [`ReferenceDungeon`](procrogue_dungeon::ReferenceDungeon) at a fixed
//! step, and reports whether every recorded checkpoint was reproduced.
//! Failing replays can be trimmed to the failing checkpoint, and a JSON
//! summary can be written for CI.
//!
//! The `procrogue-headless` binary is a thin wrapper over [`run`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod report;
pub mod session;

pub use cli::{Args, Mode};
pub use error::CliError;
pub use session::{list_replay_files, run, run_one, ReplayRunResult};

/// Tool name written to JSON reports.
pub const TOOL_NAME: &str = "ProcRogueHeadless";

/// Version of this build, compared against `@game_version`.
pub const GAME_VERSION: &str = env!("CARGO_PKG_VERSION");
