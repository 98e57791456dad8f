//! Replay recording writer.
//!
//! [`ReplayWriter`] appends event lines to a sink after writing the
//! header. Recording runs inside the game loop, so the per-event write
//! methods never fail: a closed writer ignores them, and the first I/O
//! error is held back until [`flush`](ReplayWriter::flush) or
//! [`close`](ReplayWriter::close).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use procrogue_core::{ActionId, Vec2i};

use crate::codec::{encode_event_line, encode_header};
use crate::error::ReplayError;
use crate::types::{EventKind, ReplayEvent, ReplayMeta};

/// Writes replay data to a line-oriented text sink.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use procrogue_core::ActionId;
/// use procrogue_replay::{ReplayMeta, ReplayWriter};
///
/// let meta = ReplayMeta { seed: 7, ..ReplayMeta::default() };
/// let mut writer = ReplayWriter::from_writer(Vec::new(), &meta).unwrap();
/// writer.write_action(0, ActionId(4));
/// writer.write_state_hash(16, 1, 0xdead_beef);
/// assert_eq!(writer.events_written(), 2);
///
/// let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert!(text.contains("@end_header\n0 A 4\n16 H 1 00000000deadbeef\n"));
/// ```
#[derive(Debug)]
pub struct ReplayWriter<W: Write = BufWriter<File>> {
    sink: Option<W>,
    path: Option<PathBuf>,
    deferred: Option<io::Error>,
    events_written: u64,
}

impl<W: Write> Default for ReplayWriter<W> {
    fn default() -> Self {
        Self {
            sink: None,
            path: None,
            deferred: None,
            events_written: 0,
        }
    }
}

impl ReplayWriter<BufWriter<File>> {
    /// Create (truncating) `path` and write the header.
    pub fn create(path: impl AsRef<Path>, meta: &ReplayMeta) -> Result<Self, ReplayError> {
        let mut writer = Self::default();
        writer.open(path, meta)?;
        Ok(writer)
    }

    /// (Re)open on `path`, closing any current file first. The header is
    /// flushed before this returns.
    pub fn open(&mut self, path: impl AsRef<Path>, meta: &ReplayMeta) -> Result<(), ReplayError> {
        // A failure to finish the previous recording must not block the
        // new one.
        if let Err(err) = self.close() {
            tracing::warn!(%err, "previous replay did not close cleanly");
        }

        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ReplayError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut sink = BufWriter::new(file);
        encode_header(&mut sink, meta)?;
        sink.flush()?;

        tracing::debug!(path = %path.display(), seed = meta.seed, "replay recording started");
        self.sink = Some(sink);
        self.path = Some(path.to_path_buf());
        self.events_written = 0;
        Ok(())
    }
}

impl<W: Write> ReplayWriter<W> {
    /// Start recording into an arbitrary sink, writing the header.
    pub fn from_writer(mut sink: W, meta: &ReplayMeta) -> Result<Self, ReplayError> {
        encode_header(&mut sink, meta)?;
        Ok(Self {
            sink: Some(sink),
            ..Self::default()
        })
    }

    /// Whether a sink is attached.
    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }

    /// The file being written, when opened by path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Event lines appended since opening.
    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Append one event line. No-op when closed or after an I/O error.
    pub fn write_event(&mut self, event: &ReplayEvent) {
        if self.deferred.is_some() {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let line = encode_event_line(event);
        match writeln!(sink, "{line}") {
            Ok(()) => self.events_written += 1,
            Err(e) => self.deferred = Some(e),
        }
    }

    fn push(&mut self, t_ms: u32, kind: EventKind) {
        if self.is_open() {
            self.write_event(&ReplayEvent::new(t_ms, kind));
        }
    }

    /// Record a discrete action.
    pub fn write_action(&mut self, t_ms: u32, action: ActionId) {
        self.push(t_ms, EventKind::Action(action));
    }

    /// Record a determinism checkpoint.
    pub fn write_state_hash(&mut self, t_ms: u32, turn: u32, hash: u64) {
        self.push(t_ms, EventKind::StateHash { turn, hash });
    }

    /// Record typed text.
    pub fn write_text_input(&mut self, t_ms: u32, text: &str) {
        self.push(t_ms, EventKind::TextInput(text.to_string()));
    }

    #[allow(missing_docs)]
    pub fn write_command_backspace(&mut self, t_ms: u32) {
        self.push(t_ms, EventKind::CommandBackspace);
    }

    #[allow(missing_docs)]
    pub fn write_command_autocomplete(&mut self, t_ms: u32) {
        self.push(t_ms, EventKind::CommandAutocomplete);
    }

    #[allow(missing_docs)]
    pub fn write_message_history_backspace(&mut self, t_ms: u32) {
        self.push(t_ms, EventKind::MessageHistoryBackspace);
    }

    #[allow(missing_docs)]
    pub fn write_message_history_toggle_search(&mut self, t_ms: u32) {
        self.push(t_ms, EventKind::MessageHistoryToggleSearch);
    }

    #[allow(missing_docs)]
    pub fn write_message_history_clear_search(&mut self, t_ms: u32) {
        self.push(t_ms, EventKind::MessageHistoryClearSearch);
    }

    /// Record an auto-travel request.
    pub fn write_auto_travel(&mut self, t_ms: u32, pos: Vec2i) {
        self.push(t_ms, EventKind::AutoTravel(pos));
    }

    /// Record entering look mode.
    pub fn write_begin_look(&mut self, t_ms: u32, pos: Vec2i) {
        self.push(t_ms, EventKind::BeginLook(pos));
    }

    /// Record a targeting cursor move.
    pub fn write_target_cursor(&mut self, t_ms: u32, pos: Vec2i) {
        self.push(t_ms, EventKind::TargetCursor(pos));
    }

    /// Record a look cursor move.
    pub fn write_look_cursor(&mut self, t_ms: u32, pos: Vec2i) {
        self.push(t_ms, EventKind::LookCursor(pos));
    }

    /// Flush buffered lines, surfacing any deferred write error.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        if let Some(e) = self.deferred.take() {
            return Err(ReplayError::Io(e));
        }
        match self.sink.as_mut() {
            Some(sink) => Ok(sink.flush()?),
            None => Ok(()),
        }
    }

    /// Flush and release the sink. Idempotent.
    pub fn close(&mut self) -> Result<(), ReplayError> {
        let result = self.flush();
        if self.sink.take().is_some() {
            tracing::debug!(events = self.events_written, "replay recording closed");
        }
        self.path = None;
        result
    }

    /// Flush and return the sink.
    pub fn into_inner(mut self) -> Result<W, ReplayError> {
        self.flush()?;
        self.sink
            .take()
            .ok_or_else(|| ReplayError::Io(io::Error::other("replay writer is closed")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::load_replay_file;

    /// A sink that fails every write after the first `ok` bytes.
    struct Flaky {
        ok: usize,
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.ok == 0 {
                return Err(io::Error::other("disk full"));
            }
            let n = buf.len().min(self.ok);
            self.ok -= n;
            Ok(n)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_writer_ignores_writes() {
        let mut w: ReplayWriter = ReplayWriter::default();
        assert!(!w.is_open());
        w.write_action(0, ActionId(1));
        w.write_text_input(0, "x");
        assert_eq!(w.events_written(), 0);
        w.close().unwrap();
        w.close().unwrap();
    }

    #[test]
    fn every_kind_writes_one_line() {
        let mut w = ReplayWriter::from_writer(Vec::new(), &ReplayMeta::default()).unwrap();
        let p = Vec2i::new(3, 4);
        w.write_action(0, ActionId(9));
        w.write_state_hash(1, 0, 0);
        w.write_text_input(2, "go");
        w.write_command_backspace(3);
        w.write_command_autocomplete(4);
        w.write_message_history_backspace(5);
        w.write_message_history_toggle_search(6);
        w.write_message_history_clear_search(7);
        w.write_auto_travel(8, p);
        w.write_begin_look(9, p);
        w.write_target_cursor(10, p);
        w.write_look_cursor(11, p);
        assert_eq!(w.events_written(), 12);

        let text = String::from_utf8(w.into_inner().unwrap()).unwrap();
        let body: Vec<&str> = text
            .lines()
            .skip_while(|l| *l != "@end_header")
            .skip(1)
            .collect();
        assert_eq!(body.len(), 12);
        assert_eq!(body[2], "2 TI 676F");
        assert_eq!(body[11], "11 LC 3 4");
    }

    #[test]
    fn write_errors_are_deferred_to_flush() {
        let mut w = ReplayWriter {
            sink: Some(Flaky { ok: 3 }),
            ..ReplayWriter::default()
        };
        w.write_action(1000, ActionId(1));
        w.write_action(2000, ActionId(2));
        assert_eq!(w.events_written(), 0);
        assert!(matches!(w.flush(), Err(ReplayError::Io(_))));
        // The error is reported once.
        assert!(w.flush().is_ok());
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.prr");
        let meta = ReplayMeta {
            game_version: "0.21.0".into(),
            seed: 99,
            player_class_id: "rogue".into(),
            ..ReplayMeta::default()
        };

        let mut w = ReplayWriter::create(&path, &meta).unwrap();
        assert_eq!(w.path(), Some(path.as_path()));
        w.write_action(0, ActionId(4));
        w.write_text_input(10, "search #2");
        w.write_state_hash(20, 1, 0x0123_4567_89ab_cdef);
        w.close().unwrap();
        assert!(!w.is_open());

        let loaded = load_replay_file(&path).unwrap();
        assert_eq!(loaded.meta, meta);
        assert_eq!(loaded.events.len(), 3);
        assert_eq!(
            loaded.events[1].kind,
            EventKind::TextInput("search #2".into())
        );
    }

    #[test]
    fn header_edge_values_roundtrip() {
        use procrogue_core::AutoPickupMode;

        let dir = tempfile::tempdir().unwrap();
        for seed in [0, u32::MAX] {
            let path = dir.path().join(format!("edge-{seed}.prr"));
            let meta = ReplayMeta {
                game_version: "0.21.0".into(),
                seed,
                player_class_id: String::new(),
                auto_pickup: AutoPickupMode::Smart,
                auto_step_delay_ms: -7,
                auto_explore_search: true,
                identify_items: false,
                hunger_enabled: true,
                encumbrance_enabled: true,
                lighting_enabled: true,
                yendor_doom_enabled: false,
                bones_enabled: false,
                ..ReplayMeta::default()
            };
            let mut w = ReplayWriter::create(&path, &meta).unwrap();
            w.close().unwrap();

            let loaded = load_replay_file(&path).unwrap();
            assert_eq!(loaded.meta, meta, "seed {seed}");
            assert!(loaded.events.is_empty());
        }
    }

    #[test]
    fn header_is_on_disk_after_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hdr.prr");
        let w = ReplayWriter::create(&path, &ReplayMeta::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("@end_header\n"));
        drop(w);
    }

    #[test]
    fn open_failure_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("x.prr");
        let err = ReplayWriter::create(&path, &ReplayMeta::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Open { .. }));
    }
}
