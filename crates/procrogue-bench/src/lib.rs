//! Benchmark fixtures for the ProcRogue replay system.
//!
//! - [`synthetic_replay`]: a replay mixing every event kind, for codec work
//! - [`recorded_session`]: a real reference-dungeon session with one
//!   checkpoint per turn, for playback work
//! - [`encode_replay`]: serialise a replay to its text form in memory

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::RefCell;
use std::rc::Rc;

use procrogue_core::{Action, ActionId, Simulation, TurnObserver, Vec2i};
use procrogue_dungeon::ReferenceDungeon;
use procrogue_replay::{
    prepare_game_for_replay, EventKind, ReplayError, ReplayEvent, ReplayFile, ReplayMeta,
    ReplayWriter,
};

/// Header used by every fixture.
pub fn bench_meta(seed: u32) -> ReplayMeta {
    ReplayMeta {
        game_version: "bench".into(),
        seed,
        player_class_id: "wizard".into(),
        ..ReplayMeta::default()
    }
}

/// Build a replay of `n` events cycling through every event kind, 16 ms
/// apart.
pub fn synthetic_replay(seed: u32, n: usize) -> ReplayFile {
    let events = (0..n)
        .map(|i| {
            let t = i as u32 * 16;
            let p = Vec2i::new((i % 48) as i32, (i % 24) as i32);
            let kind = match i % 12 {
                0 => EventKind::StateHash {
                    turn: i as u32,
                    hash: (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
                },
                1 => EventKind::TextInput(format!("search {i}")),
                2 => EventKind::CommandBackspace,
                3 => EventKind::CommandAutocomplete,
                4 => EventKind::MessageHistoryBackspace,
                5 => EventKind::MessageHistoryToggleSearch,
                6 => EventKind::MessageHistoryClearSearch,
                7 => EventKind::AutoTravel(p),
                8 => EventKind::BeginLook(p),
                9 => EventKind::TargetCursor(p),
                10 => EventKind::LookCursor(p),
                _ => EventKind::Action(ActionId((i % 45) as u8)),
            };
            ReplayEvent::new(t, kind)
        })
        .collect();
    ReplayFile {
        meta: bench_meta(seed),
        events,
    }
}

struct Checkpoints(Vec<(u32, u64)>);

impl TurnObserver for Checkpoints {
    fn on_turn(&mut self, turn: u32, hash: u64) {
        self.0.push((turn, hash));
    }
}

/// Record `frames` frames of a reference dungeon taking one scripted
/// action every fourth frame, with a checkpoint for every turn.
pub fn recorded_session(seed: u32, frames: u32) -> ReplayFile {
    const SCRIPT: [Action; 6] = [
        Action::Right,
        Action::Down,
        Action::Left,
        Action::Up,
        Action::Search,
        Action::Rest,
    ];

    let mut replay = ReplayFile {
        meta: bench_meta(seed),
        events: Vec::new(),
    };
    let mut sim = ReferenceDungeon::default();
    prepare_game_for_replay(&mut sim, &replay);
    let seen = Rc::new(RefCell::new(Checkpoints(Vec::new())));
    sim.set_turn_hook(Box::new(Rc::clone(&seen)));

    for frame in 0..frames {
        let t = frame * 16;
        if frame % 4 == 0 {
            let action = SCRIPT[(frame / 4) as usize % SCRIPT.len()];
            replay
                .events
                .push(ReplayEvent::new(t, EventKind::Action(action.id())));
            sim.handle_action(action.id());
        }
        sim.update(0.016);
        for (turn, hash) in seen.borrow_mut().0.drain(..) {
            replay
                .events
                .push(ReplayEvent::new(t + 16, EventKind::StateHash { turn, hash }));
        }
    }
    sim.clear_turn_hook();
    replay
}

/// Serialise `replay` to its file form.
pub fn encode_replay(replay: &ReplayFile) -> Result<Vec<u8>, ReplayError> {
    let mut writer = ReplayWriter::from_writer(Vec::new(), &replay.meta)?;
    for ev in &replay.events {
        writer.write_event(ev);
    }
    writer.into_inner()
}
