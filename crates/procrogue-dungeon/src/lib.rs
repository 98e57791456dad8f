//! Reference simulation for the ProcRogue replay tooling.
//!
//! [`ReferenceDungeon`] is a compact, fully deterministic roguelike that
//! implements [`Simulation`](procrogue_core::Simulation): seeded cave
//! levels, chasing monsters, gold, auto-travel and auto-explore, plus the
//! modal UI the replay format records (command prompt, message history
//! search, look and targeting cursors).
//!
//! # Turn flow
//!
//! 1. `handle_action` queues turn-taking actions; modal actions apply at once
//! 2. `update(dt)` resolves the queue, then paces auto-travel steps
//! 3. each completed turn runs monsters and reports `(turn, hash)` to the hook
//!
//! Content overrides ([`DungeonContent`]) adjust monster stats and spawn
//! tables, and their source text is folded into the determinism hash.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod content;
pub mod dungeon;
pub mod map;
pub mod monster;
pub mod ui;

pub use content::{ContentError, ContentWarning, DungeonContent};
pub use dungeon::{Persistence, Player, ReferenceDungeon, Settings};
pub use map::{Map, Tile, MAP_HEIGHT, MAP_WIDTH};
pub use monster::{Monster, MonsterKind, MonsterStats};
