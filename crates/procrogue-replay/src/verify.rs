//! Checkpoint verification against the simulation's turn hook.
//!
//! [`HashVerifier`] walks the recorded `StateHash` checkpoints in turn
//! order as the simulation reports completed turns. It latches the first
//! divergence and ignores everything after it.

use std::fmt;

use procrogue_core::TurnObserver;

use crate::types::{EventKind, ReplayFile};

/// A recorded `(turn, hash)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    /// Turn the hash was recorded at.
    pub turn: u32,
    /// Expected determinism hash.
    pub hash: u64,
}

/// Where a [`HashVerifier`] is in its checkpoint sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifierState {
    /// Checkpoints remain and none has failed.
    Active,
    /// Every checkpoint matched.
    Exhausted,
    /// A divergence was detected. Terminal.
    Failed,
}

/// Details of the first detected divergence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Desync {
    /// Turn the simulation reported when the failure was detected.
    pub failed_turn: u32,
    /// Turn of the checkpoint that failed.
    pub expected_turn: u32,
    /// Recorded hash at `expected_turn`.
    pub expected_hash: u64,
    /// Hash the simulation reported at `failed_turn`.
    pub got_hash: u64,
}

impl Desync {
    /// True when the simulation jumped past a checkpoint turn without
    /// ever reporting it.
    pub fn missed_checkpoint(&self) -> bool {
        self.expected_turn != self.failed_turn
    }
}

impl fmt::Display for Desync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.missed_checkpoint() {
            write!(
                f,
                "REPLAY DESYNC: missed checkpoint turn {} while at turn {} (expected {:#018x}, got {:#018x})",
                self.expected_turn, self.failed_turn, self.expected_hash, self.got_hash
            )
        } else {
            write!(
                f,
                "REPLAY DESYNC at turn {} (expected {:#018x}, got {:#018x})",
                self.failed_turn, self.expected_hash, self.got_hash
            )
        }
    }
}

/// Matches reported turns against a sorted checkpoint list.
///
/// Only the next pending checkpoint is inspected per observation, so if
/// the simulation skips over several checkpoints in one jump the failure
/// names the lowest one.
#[derive(Clone, Debug)]
pub struct HashVerifier {
    checkpoints: Vec<Checkpoint>,
    idx: usize,
    failure: Option<Desync>,
}

impl HashVerifier {
    /// Build a verifier. Checkpoints are stably sorted by turn, so
    /// duplicates keep their file order.
    pub fn new(mut checkpoints: Vec<Checkpoint>) -> Self {
        checkpoints.sort_by_key(|c| c.turn);
        Self {
            checkpoints,
            idx: 0,
            failure: None,
        }
    }

    /// Collect every `StateHash` event of `replay`.
    pub fn from_replay(replay: &ReplayFile) -> Self {
        let checkpoints = replay
            .events
            .iter()
            .filter_map(|ev| match ev.kind {
                EventKind::StateHash { turn, hash } => Some(Checkpoint { turn, hash }),
                _ => None,
            })
            .collect();
        Self::new(checkpoints)
    }

    /// Feed one `(turn, hash)` observation.
    pub fn on_turn_observed(&mut self, turn: u32, hash: u64) {
        if self.failure.is_some() {
            return;
        }
        let Some(next) = self.checkpoints.get(self.idx).copied() else {
            return;
        };

        if next.turn < turn {
            self.failure = Some(Desync {
                failed_turn: turn,
                expected_turn: next.turn,
                expected_hash: next.hash,
                got_hash: hash,
            });
        } else if next.turn == turn {
            self.idx += 1;
            if next.hash != hash {
                self.failure = Some(Desync {
                    failed_turn: turn,
                    expected_turn: turn,
                    expected_hash: next.hash,
                    got_hash: hash,
                });
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> VerifierState {
        if self.failure.is_some() {
            VerifierState::Failed
        } else if self.idx >= self.checkpoints.len() {
            VerifierState::Exhausted
        } else {
            VerifierState::Active
        }
    }

    /// Whether a divergence has been latched.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The latched divergence, if any.
    pub fn failure(&self) -> Option<&Desync> {
        self.failure.as_ref()
    }

    /// Whether there were no checkpoints at all.
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Checkpoints not yet consumed.
    pub fn remaining(&self) -> usize {
        self.checkpoints.len() - self.idx
    }
}

impl TurnObserver for HashVerifier {
    fn on_turn(&mut self, turn: u32, hash: u64) {
        self.on_turn_observed(turn, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplayEvent;
    use procrogue_core::ActionId;

    fn cp(turn: u32, hash: u64) -> Checkpoint {
        Checkpoint { turn, hash }
    }

    #[test]
    fn empty_verifier_is_exhausted() {
        let v = HashVerifier::new(Vec::new());
        assert!(v.is_empty());
        assert_eq!(v.state(), VerifierState::Exhausted);
    }

    #[test]
    fn matching_sequence_exhausts() {
        let mut v = HashVerifier::new(vec![cp(1, 10), cp(3, 30)]);
        v.on_turn_observed(0, 0);
        assert_eq!(v.state(), VerifierState::Active);
        v.on_turn_observed(1, 10);
        v.on_turn_observed(2, 99);
        assert_eq!(v.remaining(), 1);
        v.on_turn_observed(3, 30);
        assert_eq!(v.state(), VerifierState::Exhausted);
        assert!(v.failure().is_none());
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let mut v = HashVerifier::new(vec![cp(3, 30), cp(1, 10)]);
        v.on_turn_observed(1, 10);
        v.on_turn_observed(3, 30);
        assert_eq!(v.state(), VerifierState::Exhausted);
    }

    #[test]
    fn hash_mismatch_is_latched() {
        let mut v = HashVerifier::new(vec![cp(2, 0xAA), cp(4, 0xBB)]);
        v.on_turn_observed(2, 0xAB);
        let d = *v.failure().unwrap();
        assert_eq!(d.failed_turn, 2);
        assert_eq!(d.expected_turn, 2);
        assert!(!d.missed_checkpoint());

        // Later observations change nothing.
        v.on_turn_observed(4, 0xBB);
        assert_eq!(v.state(), VerifierState::Failed);
        assert_eq!(*v.failure().unwrap(), d);
    }

    #[test]
    fn skipped_checkpoint_fails_on_lowest() {
        let mut v = HashVerifier::new(vec![cp(2, 1), cp(3, 2)]);
        v.on_turn_observed(1, 0);
        v.on_turn_observed(5, 7);
        let d = v.failure().unwrap();
        assert!(d.missed_checkpoint());
        assert_eq!(d.expected_turn, 2);
        assert_eq!(d.failed_turn, 5);
        assert_eq!(d.got_hash, 7);
    }

    #[test]
    fn duplicate_turns_match_in_file_order() {
        let mut v = HashVerifier::new(vec![cp(1, 5), cp(1, 6)]);
        v.on_turn_observed(1, 5);
        assert_eq!(v.state(), VerifierState::Active);
        // The second checkpoint for turn 1 is compared on the next report.
        v.on_turn_observed(1, 5);
        assert!(v.is_failed());
    }

    #[test]
    fn from_replay_ignores_inputs() {
        let replay = ReplayFile {
            events: vec![
                ReplayEvent::new(0, EventKind::Action(ActionId(1))),
                ReplayEvent::new(5, EventKind::StateHash { turn: 1, hash: 9 }),
            ],
            ..ReplayFile::default()
        };
        let v = HashVerifier::from_replay(&replay);
        assert_eq!(v.remaining(), 1);
    }

    #[test]
    fn desync_messages() {
        let mismatch = Desync {
            failed_turn: 7,
            expected_turn: 7,
            expected_hash: 0x1,
            got_hash: 0xABC,
        };
        assert_eq!(
            mismatch.to_string(),
            "REPLAY DESYNC at turn 7 (expected 0x0000000000000001, got 0x0000000000000abc)"
        );
        let missed = Desync {
            expected_turn: 5,
            ..mismatch
        };
        assert!(missed
            .to_string()
            .starts_with("REPLAY DESYNC: missed checkpoint turn 5 while at turn 7"));
    }
}
