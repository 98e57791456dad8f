//! Core types and traits shared by the ProcRogue crates.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary the replay engine and simulations agree on: action
//! ids, grid positions, gameplay setting enums, the [`Simulation`]
//! interface and its [`TurnObserver`] hook, and the FNV-1a
//! [`StateHasher`] used for determinism digests.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod hash;
pub mod id;
pub mod settings;
pub mod traits;

pub use action::Action;
pub use error::SettingError;
pub use hash::StateHasher;
pub use id::{ActionId, Vec2i};
pub use settings::{AutoPickupMode, PlayerClass};
pub use traits::{Simulation, TurnObserver};
