//! Cutting a replay down to a failing prefix.

use std::path::Path;

use crate::error::ReplayError;
use crate::types::{EventKind, ReplayFile};
use crate::writer::ReplayWriter;

/// Keep the prefix of `replay` up to the last checkpoint at or before
/// `turn`.
///
/// The cut point is the timestamp of the last `StateHash` (in file
/// order) whose turn is `<= turn`. Events are kept while their timestamp
/// is `<= cut`, stopping at the first later one, and any kept checkpoint
/// for a turn past `turn` is dropped.
pub fn build_trimmed_replay(replay: &ReplayFile, turn: u32) -> Result<ReplayFile, ReplayError> {
    let cut_ms = replay
        .events
        .iter()
        .filter_map(|ev| match ev.kind {
            EventKind::StateHash { turn: t, .. } if t <= turn => Some(ev.t_ms),
            _ => None,
        })
        .last()
        .ok_or(ReplayError::NoCheckpoint { turn })?;

    let events = replay
        .events
        .iter()
        .take_while(|ev| ev.t_ms <= cut_ms)
        .filter(|ev| !matches!(ev.kind, EventKind::StateHash { turn: t, .. } if t > turn))
        .cloned()
        .collect::<Vec<_>>();

    tracing::info!(
        turn,
        cut_ms,
        kept = events.len(),
        dropped = replay.events.len() - events.len(),
        "trimmed replay"
    );
    Ok(ReplayFile {
        meta: replay.meta.clone(),
        events,
    })
}

/// Write `replay` to `path`, header first.
pub fn write_replay_file(path: impl AsRef<Path>, replay: &ReplayFile) -> Result<(), ReplayError> {
    let mut writer = ReplayWriter::create(path, &replay.meta)?;
    for ev in &replay.events {
        writer.write_event(ev);
    }
    writer.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::load_replay_file;
    use crate::types::ReplayEvent;
    use procrogue_core::ActionId;

    fn sample() -> ReplayFile {
        let a = |t, id| ReplayEvent::new(t, EventKind::Action(ActionId(id)));
        let h = |t, turn| ReplayEvent::new(t, EventKind::StateHash { turn, hash: turn as u64 });
        ReplayFile {
            events: vec![
                h(0, 0),
                a(10, 4),
                h(20, 1),
                a(30, 4),
                h(40, 2),
                a(50, 4),
                h(60, 3),
            ],
            ..ReplayFile::default()
        }
    }

    #[test]
    fn trims_at_last_checkpoint_not_after_turn() {
        let t = build_trimmed_replay(&sample(), 2).unwrap();
        assert_eq!(t.events.len(), 5);
        assert_eq!(t.last_event_ms(), 40);
    }

    #[test]
    fn turn_past_end_keeps_everything() {
        let s = sample();
        assert_eq!(build_trimmed_replay(&s, 100).unwrap(), s);
    }

    #[test]
    fn later_checkpoints_sharing_the_cut_time_are_dropped() {
        let mut s = sample();
        // A turn-5 checkpoint recorded in the same millisecond as turn 1.
        s.events.insert(3, ReplayEvent::new(20, EventKind::StateHash { turn: 5, hash: 5 }));
        let t = build_trimmed_replay(&s, 1).unwrap();
        assert_eq!(t.events.len(), 3);
        assert!(t
            .events
            .iter()
            .all(|e| !matches!(e.kind, EventKind::StateHash { turn: 5, .. })));
    }

    #[test]
    fn no_checkpoint_before_turn_is_an_error() {
        let mut s = sample();
        s.events.remove(0);
        let err = build_trimmed_replay(&s, 0).unwrap_err();
        assert!(matches!(err, ReplayError::NoCheckpoint { turn: 0 }));
    }

    #[test]
    fn trimmed_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.trim.prr");
        let trimmed = build_trimmed_replay(&sample(), 1).unwrap();
        write_replay_file(&path, &trimmed).unwrap();
        assert_eq!(load_replay_file(&path).unwrap(), trimmed);
    }
}
