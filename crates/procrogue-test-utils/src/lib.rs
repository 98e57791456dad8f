//! Test utilities and mock types for ProcRogue development.
//!
//! Provides [`Simulation`](procrogue_core::Simulation) doubles for replay tests and a [`TurnLog`]
//! observer for capturing the `(turn, hash)` stream a simulation
//! reports through its turn hook.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use procrogue_core::TurnObserver;

pub use fixtures::{expected_hash, Call, FrozenSimulation, RecordingSimulation};

/// Collects every turn hook notification.
///
/// Install a clone of the shared handle from [`TurnLog::shared`] as the
/// hook, keep the other, and inspect [`entries`](TurnLog::entries) after
/// driving the simulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnLog {
    entries: Vec<(u32, u64)>,
}

impl TurnLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh log behind `Rc<RefCell<_>>`, ready to box as a hook.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Every `(turn, hash)` seen, in order.
    pub fn entries(&self) -> &[(u32, u64)] {
        &self.entries
    }

    /// The most recent notification.
    pub fn last(&self) -> Option<(u32, u64)> {
        self.entries.last().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl TurnObserver for TurnLog {
    fn on_turn(&mut self, turn: u32, hash: u64) {
        self.entries.push((turn, hash));
    }
}
