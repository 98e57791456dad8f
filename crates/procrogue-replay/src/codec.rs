//! Text encode/decode for the replay format.
//!
//! A replay is UTF-8, one record per `\n`-terminated line. The header is
//! a block of `@key value` lines closed by `@end_header`; every line
//! after it is an event:
//!
//! ```text
//! <tMs> <CODE> [payload...]
//! ```
//!
//! Free text is hex-encoded so payloads never contain whitespace or `#`.
//! Unknown header keys and unknown event codes decode to "nothing" rather
//! than an error, so older builds can read files from newer ones.

use std::fmt;
use std::io::Write;

use procrogue_core::{ActionId, AutoPickupMode, Vec2i};

use crate::error::ReplayError;
use crate::types::{EventKind, ReplayEvent, ReplayMeta};

/// The line that closes the header block.
pub const END_HEADER: &str = "@end_header";

// ── Hex ─────────────────────────────────────────────────────────

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Why a hex string failed to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HexError {
    /// The string has an odd number of digits.
    OddLength,
    /// A character outside `[0-9A-Fa-f]` at the given byte index.
    InvalidDigit {
        /// Byte offset of the offending character.
        index: usize,
    },
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OddLength => write!(f, "odd-length hex string"),
            Self::InvalidDigit { index } => write!(f, "invalid hex digit at offset {index}"),
        }
    }
}

impl std::error::Error for HexError {}

/// Encode bytes as uppercase hex, high nibble first.
pub fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX_DIGITS[(b >> 4) as usize] as char);
        out.push(HEX_DIGITS[(b & 0xF) as usize] as char);
    }
    out
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(10 + c - b'a'),
        b'A'..=b'F' => Some(10 + c - b'A'),
        _ => None,
    }
}

/// Decode a hex string (either case).
pub fn hex_decode(hex: &str) -> Result<Vec<u8>, HexError> {
    let raw = hex.as_bytes();
    if raw.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }
    let mut out = Vec::with_capacity(raw.len() / 2);
    for (i, pair) in raw.chunks_exact(2).enumerate() {
        let hi = hex_value(pair[0]).ok_or(HexError::InvalidDigit { index: i * 2 })?;
        let lo = hex_value(pair[1]).ok_or(HexError::InvalidDigit { index: i * 2 + 1 })?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

// ── Scalar parsing ──────────────────────────────────────────────

/// Whole-string signed decimal.
pub(crate) fn parse_int(s: &str) -> Option<i32> {
    s.parse().ok()
}

/// Whole-string unsigned decimal that fits 32 bits.
pub(crate) fn parse_u32(s: &str) -> Option<u32> {
    s.parse().ok()
}

/// 1 to 16 hex digits, any case, no prefix.
fn parse_hash(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > 16 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u64::from_str_radix(s, 16).ok()
}

// ── Header ──────────────────────────────────────────────────────

/// Write the full header block, in fixed key order, ending with
/// [`END_HEADER`].
pub fn encode_header(w: &mut dyn Write, meta: &ReplayMeta) -> Result<(), ReplayError> {
    writeln!(w, "@procrogue_replay {}", meta.format_version)?;
    writeln!(w, "@game_version {}", meta.game_version)?;
    writeln!(w, "@seed {}", meta.seed)?;
    if !meta.player_class_id.is_empty() {
        writeln!(w, "@class {}", meta.player_class_id)?;
    }
    writeln!(w, "@auto_pickup {}", meta.auto_pickup.as_int())?;
    writeln!(w, "@auto_step_delay_ms {}", meta.auto_step_delay_ms)?;
    writeln!(w, "@auto_explore_search {}", meta.auto_explore_search as u8)?;
    writeln!(w, "@identify_items {}", meta.identify_items as u8)?;
    writeln!(w, "@hunger_enabled {}", meta.hunger_enabled as u8)?;
    writeln!(w, "@encumbrance_enabled {}", meta.encumbrance_enabled as u8)?;
    writeln!(w, "@lighting_enabled {}", meta.lighting_enabled as u8)?;
    writeln!(w, "@yendor_doom_enabled {}", meta.yendor_doom_enabled as u8)?;
    writeln!(w, "@bones_enabled {}", meta.bones_enabled as u8)?;
    writeln!(w, "{END_HEADER}")?;
    Ok(())
}

/// Split a trimmed `@key value...` line into key and (trimmed) value.
pub(crate) fn split_header_line(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((key, value)) => (key, value.trim()),
        None => (line, ""),
    }
}

/// Apply one header key to `meta`.
///
/// Structural fields (format version, seed) reject malformed values;
/// optional gameplay flags keep their current value instead. Unknown
/// keys are ignored.
pub fn apply_header_field(meta: &mut ReplayMeta, key: &str, value: &str) -> Result<(), String> {
    let flag = |v: &str| parse_int(v).map(|n| n != 0);

    match key {
        "@procrogue_replay" => match parse_int(value) {
            Some(v) if v > 0 => meta.format_version = v,
            _ => return Err(format!("bad format version '{value}'")),
        },
        "@game_version" => meta.game_version = value.to_string(),
        "@seed" => match parse_u32(value) {
            Some(v) => meta.seed = v,
            None => return Err(format!("bad seed '{value}'")),
        },
        "@class" => meta.player_class_id = value.to_string(),
        "@auto_pickup" => {
            if let Some(mode) = parse_int(value).and_then(AutoPickupMode::from_int) {
                meta.auto_pickup = mode;
            }
        }
        "@auto_step_delay_ms" => {
            if let Some(v) = parse_int(value) {
                meta.auto_step_delay_ms = v;
            }
        }
        "@auto_explore_search" => {
            if let Some(v) = flag(value) {
                meta.auto_explore_search = v;
            }
        }
        "@identify_items" => {
            if let Some(v) = flag(value) {
                meta.identify_items = v;
            }
        }
        "@hunger_enabled" => {
            if let Some(v) = flag(value) {
                meta.hunger_enabled = v;
            }
        }
        "@encumbrance_enabled" => {
            if let Some(v) = flag(value) {
                meta.encumbrance_enabled = v;
            }
        }
        "@lighting_enabled" => {
            if let Some(v) = flag(value) {
                meta.lighting_enabled = v;
            }
        }
        "@yendor_doom_enabled" => {
            if let Some(v) = flag(value) {
                meta.yendor_doom_enabled = v;
            }
        }
        "@bones_enabled" => {
            if let Some(v) = flag(value) {
                meta.bones_enabled = v;
            }
        }
        _ => {}
    }
    Ok(())
}

// ── Events ──────────────────────────────────────────────────────

/// Encode one event as a line (without the trailing newline).
pub fn encode_event_line(ev: &ReplayEvent) -> String {
    let code = ev.kind.code();
    match &ev.kind {
        EventKind::Action(a) => format!("{} {code} {}", ev.t_ms, a.0),
        EventKind::StateHash { turn, hash } => format!("{} {code} {turn} {hash:016x}", ev.t_ms),
        EventKind::TextInput(text) => {
            format!("{} {code} {}", ev.t_ms, hex_encode(text.as_bytes()))
        }
        EventKind::AutoTravel(p)
        | EventKind::BeginLook(p)
        | EventKind::TargetCursor(p)
        | EventKind::LookCursor(p) => format!("{} {code} {} {}", ev.t_ms, p.x, p.y),
        EventKind::CommandBackspace
        | EventKind::CommandAutocomplete
        | EventKind::MessageHistoryBackspace
        | EventKind::MessageHistoryToggleSearch
        | EventKind::MessageHistoryClearSearch => format!("{} {code}", ev.t_ms),
    }
}

fn expect_arity(code: &str, payload: &[&str], n: usize) -> Result<(), String> {
    if payload.len() == n {
        Ok(())
    } else {
        Err(format!(
            "'{code}' expects {n} payload field(s), got {}",
            payload.len()
        ))
    }
}

fn parse_pos(code: &str, payload: &[&str]) -> Result<Vec2i, String> {
    expect_arity(code, payload, 2)?;
    match (payload[0].parse::<i32>(), payload[1].parse::<i32>()) {
        (Ok(x), Ok(y)) => Ok(Vec2i::new(x, y)),
        _ => Err("bad position payload".to_string()),
    }
}

/// Decode one (trimmed, non-blank, non-comment) event line.
///
/// Returns `Ok(None)` for a well-timed line with an unknown event code.
pub fn decode_event_line(line: &str) -> Result<Option<ReplayEvent>, String> {
    let mut tokens = line.split_whitespace();
    let t_ms = tokens
        .next()
        .and_then(parse_u32)
        .ok_or_else(|| "missing or bad time".to_string())?;
    let code = tokens
        .next()
        .ok_or_else(|| "missing event code".to_string())?;
    let payload: Vec<&str> = tokens.collect();

    let kind = match code {
        "A" => {
            expect_arity(code, &payload, 1)?;
            let id = parse_int(payload[0]).ok_or_else(|| "bad action".to_string())?;
            let id = u8::try_from(id).map_err(|_| "action out of range".to_string())?;
            EventKind::Action(ActionId(id))
        }
        "H" => {
            expect_arity(code, &payload, 2)?;
            let turn = parse_u32(payload[0]).ok_or_else(|| "bad state hash turn".to_string())?;
            let hash = parse_hash(payload[1]).ok_or_else(|| "bad state hash".to_string())?;
            EventKind::StateHash { turn, hash }
        }
        "TI" => {
            expect_arity(code, &payload, 1)?;
            let bytes = hex_decode(payload[0]).map_err(|e| format!("bad hex text: {e}"))?;
            let text = String::from_utf8(bytes).map_err(|_| "text is not UTF-8".to_string())?;
            EventKind::TextInput(text)
        }
        "CB" | "CA" | "HB" | "HS" | "HC" => {
            expect_arity(code, &payload, 0)?;
            match code {
                "CB" => EventKind::CommandBackspace,
                "CA" => EventKind::CommandAutocomplete,
                "HB" => EventKind::MessageHistoryBackspace,
                "HS" => EventKind::MessageHistoryToggleSearch,
                _ => EventKind::MessageHistoryClearSearch,
            }
        }
        "TR" => EventKind::AutoTravel(parse_pos(code, &payload)?),
        "BL" => EventKind::BeginLook(parse_pos(code, &payload)?),
        "TC" => EventKind::TargetCursor(parse_pos(code, &payload)?),
        "LC" => EventKind::LookCursor(parse_pos(code, &payload)?),
        _ => return Ok(None),
    };

    Ok(Some(ReplayEvent { t_ms, kind }))
}
