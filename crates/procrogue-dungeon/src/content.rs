//! Content overrides loaded from an INI-style text file.
//!
//! One `key = value` per line. `#` and `;` start a comment anywhere on a
//! line; `[section]` lines are accepted and ignored. Keys are
//! case-insensitive and dotted:
//!
//! ```text
//! monster.<id>.hp_max = 12     ; also hp, atk, def
//! spawn.room.<depth>.<id> = 5  ; spawn weight at that depth
//! ```
//!
//! Problems with individual lines are collected as warnings and the
//! line is skipped. Only an unreadable file is an error.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use procrogue_core::StateHasher;

use crate::monster::{MonsterKind, MonsterStats};

/// Deepest level spawn tables may target.
pub const MAX_DEPTH: u32 = 10;

/// Failure to read a content file.
#[derive(Debug)]
pub enum ContentError {
    /// The file could not be read.
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(
                    f,
                    "failed to load content overrides {}: {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
        }
    }
}

/// A non-fatal problem on one line of a content file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentWarning {
    /// 1-based line number.
    pub line: usize,
    /// What was wrong.
    pub message: String,
}

impl fmt::Display for ContentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content line {}: {}", self.line, self.message)
    }
}

/// Per-monster stat overrides; `None` keeps the built-in value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsOverride {
    #[allow(missing_docs)]
    pub hp_max: Option<i32>,
    #[allow(missing_docs)]
    pub atk: Option<i32>,
    #[allow(missing_docs)]
    pub def: Option<i32>,
}

/// Parsed content overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DungeonContent {
    monsters: BTreeMap<MonsterKind, StatsOverride>,
    spawn_room: BTreeMap<u32, BTreeMap<MonsterKind, i32>>,
    source_hash: u64,
}

impl DungeonContent {
    /// Read and parse `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, Vec<ContentWarning>), ContentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse override text, returning the overrides and any warnings.
    pub fn parse(text: &str) -> (Self, Vec<ContentWarning>) {
        let mut content = Self {
            source_hash: StateHasher::new().bytes(text.as_bytes()).finish(),
            ..Self::default()
        };
        let mut warnings = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
            let line = match raw.find(['#', ';']) {
                Some(at) => &raw[..at],
                None => raw,
            }
            .trim();
            if line.is_empty() || (line.starts_with('[') && line.ends_with(']')) {
                continue;
            }
            if let Err(message) = content.apply_line(line) {
                warnings.push(ContentWarning {
                    line: line_no,
                    message,
                });
            }
        }

        (content, warnings)
    }

    fn apply_line(&mut self, line: &str) -> Result<(), String> {
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| "expected key=value".to_string())?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if key.is_empty() {
            return Err("empty key".to_string());
        }
        let toks: Vec<&str> = key.split('.').map(str::trim).collect();

        match toks[0] {
            "monster" => {
                if toks.len() < 3 {
                    return Err("monster key should be monster.<id>.<field>".to_string());
                }
                let kind = MonsterKind::from_id(toks[1])
                    .ok_or_else(|| format!("unknown monster id: {}", toks[1]))?;
                let field = toks[2..].join("_");
                let n: i32 = value
                    .parse()
                    .map_err(|_| format!("invalid int for {field}"))?;
                let ov = self.monsters.entry(kind).or_default();
                match field.as_str() {
                    "hp" | "hpmax" | "hp_max" => ov.hp_max = Some(n.max(1)),
                    "atk" | "base_atk" => ov.atk = Some(n.max(0)),
                    "def" | "base_def" => ov.def = Some(n.max(0)),
                    _ => return Err(format!("unknown monster field: {field}")),
                }
            }
            "spawn" => {
                if toks.len() < 4 {
                    return Err("spawn key should be spawn.room.<depth>.<monster>".to_string());
                }
                if toks[1] != "room" && toks[1] != "rooms" {
                    return Err(format!("unknown spawn category: {}", toks[1]));
                }
                let depth: u32 = toks[2]
                    .parse()
                    .map_err(|_| format!("invalid spawn depth: {}", toks[2]))?;
                if !(1..=MAX_DEPTH).contains(&depth) {
                    return Err(format!("spawn depth out of range: {depth}"));
                }
                let kind = MonsterKind::from_id(toks[3])
                    .ok_or_else(|| format!("unknown spawn monster id: {}", toks[3]))?;
                let weight: i32 = value
                    .parse()
                    .map_err(|_| "invalid int spawn weight".to_string())?;
                self.spawn_room
                    .entry(depth)
                    .or_default()
                    .insert(kind, weight.max(0));
            }
            other => return Err(format!("unknown key group: {other}")),
        }
        Ok(())
    }

    /// Stats for `kind` after overrides.
    pub fn stats(&self, kind: MonsterKind) -> MonsterStats {
        let base = kind.base_stats();
        match self.monsters.get(&kind) {
            Some(ov) => MonsterStats {
                hp_max: ov.hp_max.unwrap_or(base.hp_max),
                atk: ov.atk.unwrap_or(base.atk),
                def: ov.def.unwrap_or(base.def),
            },
            None => base,
        }
    }

    /// Spawn weights at `depth`, in kind order. Kinds missing from an
    /// override table keep their built-in weight.
    pub fn spawn_weights(&self, depth: u32) -> Vec<(MonsterKind, i32)> {
        let table = self.spawn_room.get(&depth);
        MonsterKind::ALL
            .into_iter()
            .map(|k| {
                let w = table
                    .and_then(|t| t.get(&k).copied())
                    .unwrap_or(k.base_weight());
                (k, w)
            })
            .collect()
    }

    /// FNV-1a of the source text; `0` for built-in content.
    pub fn source_hash(&self) -> u64 {
        self.source_hash
    }

    /// Whether no overrides are present.
    pub fn is_empty(&self) -> bool {
        self.monsters.is_empty() && self.spawn_room.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply() {
        let (c, warnings) = DungeonContent::parse(
            "[monsters]\nmonster.goblin.hp_max = 12\nMonster.Orc.ATK=7 ; angry\n\
             spawn.room.2.orc = 9\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(c.stats(MonsterKind::Goblin).hp_max, 12);
        assert_eq!(c.stats(MonsterKind::Goblin).atk, 2);
        assert_eq!(c.stats(MonsterKind::Orc).atk, 7);
        let w = c.spawn_weights(2);
        assert!(w.contains(&(MonsterKind::Orc, 9)));
        assert!(w.contains(&(MonsterKind::Rat, 4)));
        assert_eq!(c.spawn_weights(3), DungeonContent::default().spawn_weights(3));
    }

    #[test]
    fn bad_lines_become_warnings() {
        let (c, warnings) = DungeonContent::parse(
            "just words\n= 3\nmonster.dragon.hp = 5\nmonster.rat.hp = lots\n\
             spawn.room.99.rat = 1\nspawn.vault.1.rat = 1\nloot.gold = 5\n# fine\n",
        );
        assert!(c.is_empty());
        let lines: Vec<usize> = warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, [1, 2, 3, 4, 5, 6, 7]);
        assert!(warnings[2].to_string().contains("unknown monster id: dragon"));
    }

    #[test]
    fn source_hash_tracks_text() {
        let (a, _) = DungeonContent::parse("monster.rat.hp = 4\n");
        let (b, _) = DungeonContent::parse("monster.rat.hp = 5\n");
        assert_ne!(a.source_hash(), b.source_hash());
        assert_eq!(DungeonContent::default().source_hash(), 0);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DungeonContent::load(dir.path().join("missing.ini")).unwrap_err();
        assert!(err.to_string().contains("missing.ini"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("content.ini");
        std::fs::write(&path, "monster.bat.def = 3\n").unwrap();
        let (c, warnings) = DungeonContent::load(&path).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(c.stats(MonsterKind::Bat).def, 3);
    }
}
