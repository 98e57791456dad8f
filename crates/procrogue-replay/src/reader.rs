//! Replay loading.
//!
//! [`load_replay_file`] reads a whole replay in one forward pass.
//! Every line is trimmed; blank lines and lines starting with `#` are
//! skipped anywhere in the file. Inside the header every other line must
//! be an `@key` line. After `@end_header` every other line is an event.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::codec::{apply_header_field, decode_event_line, split_header_line, END_HEADER};
use crate::error::ReplayError;
use crate::types::ReplayFile;
use crate::FORMAT_VERSION;

/// Load and parse a replay file.
pub fn load_replay_file(path: impl AsRef<Path>) -> Result<ReplayFile, ReplayError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReplayError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_replay(BufReader::new(file), path)
}

/// Parse a replay from any buffered reader. `path` is only used in
/// error messages.
pub fn parse_replay<R: BufRead>(mut reader: R, path: &Path) -> Result<ReplayFile, ReplayError> {
    let mut replay = ReplayFile::default();
    let mut in_header = true;
    let mut raw = Vec::new();
    let mut line_no = 0usize;

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        line_no += 1;

        let text = std::str::from_utf8(&raw)
            .map_err(|_| ReplayError::parse(path, line_no, "line is not valid UTF-8"))?;
        let line = text.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if in_header {
            if line == END_HEADER {
                in_header = false;
                continue;
            }
            if !line.starts_with('@') {
                return Err(ReplayError::parse(
                    path,
                    line_no,
                    "expected '@key value' header line",
                ));
            }
            let (key, value) = split_header_line(line);
            apply_header_field(&mut replay.meta, key, value)
                .map_err(|reason| ReplayError::parse(path, line_no, reason))?;
            continue;
        }

        match decode_event_line(line) {
            Ok(Some(event)) => replay.events.push(event),
            Ok(None) => {
                tracing::trace!(line = line_no, "skipping unknown replay event");
            }
            Err(reason) => return Err(ReplayError::parse(path, line_no, reason)),
        }
    }

    if in_header {
        return Err(ReplayError::Parse {
            path: path.to_path_buf(),
            line: None,
            reason: "missing @end_header".to_string(),
        });
    }

    if replay.meta.format_version > FORMAT_VERSION {
        tracing::warn!(
            path = %path.display(),
            file_version = replay.meta.format_version,
            supported = FORMAT_VERSION,
            "replay was written by a newer format version"
        );
    }

    Ok(replay)
}

impl FromStr for ReplayFile {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_replay(s.as_bytes(), Path::new("<memory>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventKind;
    use procrogue_core::{ActionId, AutoPickupMode, Vec2i};

    fn parse(text: &str) -> Result<ReplayFile, ReplayError> {
        text.parse()
    }

    fn parse_line(text: &str) -> Option<usize> {
        match parse(text) {
            Err(ReplayError::Parse { line, .. }) => line,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn minimal_replay() {
        let r = parse("@procrogue_replay 1\n@seed 42\n@end_header\n0 A 4\n").unwrap();
        assert_eq!(r.meta.seed, 42);
        assert_eq!(r.events.len(), 1);
        assert_eq!(r.events[0].kind, EventKind::Action(ActionId(4)));
    }

    #[test]
    fn comments_blanks_and_padding_are_skipped() {
        let text = "\n# recorded by hand\n  @seed 7  \r\n@auto_pickup 2\n\n@end_header\n\
                    # first move\n   0 A 4   \n\n10 TR 5 6\r\n";
        let r = parse(text).unwrap();
        assert_eq!(r.meta.seed, 7);
        assert_eq!(r.meta.auto_pickup, AutoPickupMode::All);
        assert_eq!(r.events.len(), 2);
        assert_eq!(r.events[1].kind, EventKind::AutoTravel(Vec2i::new(5, 6)));
    }

    #[test]
    fn unknown_keys_and_codes_are_ignored() {
        let r = parse("@seed 1\n@future_key on\n@end_header\n5 QQ 1\n6 CB\n").unwrap();
        assert_eq!(r.events.len(), 1);
        assert_eq!(r.events[0].t_ms, 6);
    }

    #[test]
    fn events_keep_file_order() {
        let r = parse("@seed 1\n@end_header\n0 A 5\n0 H 3 AA\n16 A 5\n16 H 1 bb\n8 CB\n")
            .unwrap();
        let kinds: Vec<(u32, EventKind)> = r.events.into_iter().map(|e| (e.t_ms, e.kind)).collect();
        assert_eq!(
            kinds,
            [
                (0, EventKind::Action(ActionId(5))),
                (0, EventKind::StateHash { turn: 3, hash: 0xAA }),
                (16, EventKind::Action(ActionId(5))),
                (16, EventKind::StateHash { turn: 1, hash: 0xBB }),
                (8, EventKind::CommandBackspace),
            ]
        );
    }

    #[test]
    fn missing_end_header_is_an_error() {
        let err = parse("@seed 1\n@class knight\n").unwrap_err();
        match err {
            ReplayError::Parse { line, reason, .. } => {
                assert_eq!(line, None);
                assert!(reason.contains("@end_header"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_key_line_in_header_is_an_error() {
        assert_eq!(parse_line("@seed 1\n0 A 4\n@end_header\n"), Some(2));
    }

    #[test]
    fn bad_seed_reports_line() {
        assert_eq!(parse_line("@procrogue_replay 1\n@seed banana\n@end_header\n"), Some(2));
    }

    #[test]
    fn bad_event_reports_line() {
        let text = "@seed 1\n@end_header\n0 A 4\n\n16 TI XYZ\n";
        assert_eq!(parse_line(text), Some(5));
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let bytes: &[u8] = b"@seed 1\n@end_header\n0 A \xff\n";
        let err = parse_replay(bytes, Path::new("x.prr")).unwrap_err();
        assert!(matches!(err, ReplayError::Parse { line: Some(3), .. }));
    }

    #[test]
    fn inline_hash_is_not_a_comment() {
        // Only whole-line comments exist; trailing text is a payload token.
        assert_eq!(parse_line("@end_header\n0 A 4 # note\n"), Some(2));
    }

    #[test]
    fn newer_format_version_still_loads() {
        let r = parse("@procrogue_replay 9\n@end_header\n").unwrap();
        assert_eq!(r.meta.format_version, 9);
    }

    #[test]
    fn missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_replay_file(dir.path().join("nope.prr")).unwrap_err();
        assert!(matches!(err, ReplayError::Open { .. }));
        assert!(err.to_string().contains("nope.prr"));
    }

    #[test]
    fn parse_error_message_names_path_and_line() {
        let err = parse_replay("@seed x\n@end_header\n".as_bytes(), Path::new("a/b.prr"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "replay parse error (bad seed 'x') at a/b.prr:1"
        );
    }
}
