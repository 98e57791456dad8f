//! Deterministic input replay for ProcRogue simulations.
//!
//! Records the inputs of a seeded run as a line-oriented text file and
//! plays them back against a fresh [`Simulation`](procrogue_core::Simulation),
//! checking recorded determinism hashes turn by turn.
//!
//! # Architecture
//!
//! - [`ReplayWriter`] records events to any `Write` sink
//! - [`load_replay_file`] loads a whole replay into a [`ReplayFile`]
//! - [`HashVerifier`] matches reported turns against `StateHash` checkpoints
//! - [`run_replay_headless`] drives playback on a fixed time step
//! - [`build_trimmed_replay`] cuts a failing replay down to a short prefix
//!
//! # Format
//!
//! ```text
//! @procrogue_replay 1
//! @game_version 0.21.0
//! @seed 42
//! ...
//! @end_header
//! 0 A 4
//! 16 H 1 9c4d2e0b5a7713f2
//! 400 TI 7365617263680A
//! ```
//!
//! Each event line is `<tMs> <CODE> [payload...]`. Text payloads are
//! hex-encoded; `H` lines carry a turn number and a 64-bit hash.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod runner;
pub mod trim;
pub mod types;
pub mod verify;
pub mod writer;

pub use codec::{decode_event_line, encode_event_line, hex_decode, hex_encode, HexError};
pub use error::ReplayError;
pub use reader::{load_replay_file, parse_replay};
pub use runner::{
    dispatch_event, prepare_game_for_replay, run_replay_headless, FailureKind, RunOptions,
    RunStats,
};
pub use trim::{build_trimmed_replay, write_replay_file};
pub use types::{EventKind, ReplayEvent, ReplayFile, ReplayMeta};
pub use verify::{Checkpoint, Desync, HashVerifier, VerifierState};
pub use writer::ReplayWriter;

/// Current text format version, written as `@procrogue_replay`.
///
/// Files with a higher version still load (unknown keys and event codes
/// are skipped) but a warning is logged.
pub const FORMAT_VERSION: i32 = 1;

/// Conventional file extension for replays.
pub const FILE_EXTENSION: &str = "prr";
