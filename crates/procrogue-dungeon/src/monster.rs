//! Monster kinds and their base stats.

use std::fmt;

use procrogue_core::{StateHasher, Vec2i};

/// A kind of monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum MonsterKind {
    Rat,
    Bat,
    Goblin,
    Orc,
}

impl MonsterKind {
    /// Every kind, in id order.
    pub const ALL: [MonsterKind; 4] = [
        MonsterKind::Rat,
        MonsterKind::Bat,
        MonsterKind::Goblin,
        MonsterKind::Orc,
    ];

    /// Content-file id.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Rat => "rat",
            Self::Bat => "bat",
            Self::Goblin => "goblin",
            Self::Orc => "orc",
        }
    }

    /// Resolve a content-file id (case-insensitive).
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Built-in stats, before content overrides.
    pub const fn base_stats(self) -> MonsterStats {
        match self {
            Self::Rat => MonsterStats::new(3, 1, 0),
            Self::Bat => MonsterStats::new(2, 1, 1),
            Self::Goblin => MonsterStats::new(6, 2, 1),
            Self::Orc => MonsterStats::new(10, 3, 2),
        }
    }

    /// Built-in spawn weight, used at depths without an override table.
    pub const fn base_weight(self) -> i32 {
        match self {
            Self::Rat => 4,
            Self::Bat => 3,
            Self::Goblin => 2,
            Self::Orc => 1,
        }
    }

    fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Combat stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterStats {
    /// Starting and maximum hit points.
    pub hp_max: i32,
    /// Attack.
    pub atk: i32,
    /// Defense.
    pub def: i32,
}

impl MonsterStats {
    /// Construct stats.
    pub const fn new(hp_max: i32, atk: i32, def: i32) -> Self {
        Self { hp_max, atk, def }
    }
}

/// A monster on the current level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monster {
    /// What it is.
    pub kind: MonsterKind,
    /// Where it stands.
    pub pos: Vec2i,
    /// Remaining hit points.
    pub hp: i32,
    /// Stats after content overrides.
    pub stats: MonsterStats,
}

impl Monster {
    /// A fresh monster at full health.
    pub fn spawn(kind: MonsterKind, pos: Vec2i, stats: MonsterStats) -> Self {
        Self {
            kind,
            pos,
            hp: stats.hp_max,
            stats,
        }
    }

    /// Whether it is still alive.
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub(crate) fn hash_into(&self, h: &mut StateHasher) {
        h.u8(self.kind.code())
            .i32(self.pos.x)
            .i32(self.pos.y)
            .i32(self.hp)
            .i32(self.stats.hp_max)
            .i32(self.stats.atk)
            .i32(self.stats.def);
    }
}

/// Damage dealt by an attack: attack minus defense, at least 1.
pub fn melee_damage(atk: i32, def: i32) -> i32 {
    (atk - def).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_roundtrip() {
        for k in MonsterKind::ALL {
            assert_eq!(MonsterKind::from_id(k.id()), Some(k));
        }
        assert_eq!(MonsterKind::from_id(" GOBLIN "), Some(MonsterKind::Goblin));
        assert_eq!(MonsterKind::from_id("dragon"), None);
    }

    #[test]
    fn damage_is_at_least_one() {
        assert_eq!(melee_damage(5, 2), 3);
        assert_eq!(melee_damage(1, 9), 1);
    }
}
