//! Gameplay settings that alter simulation branching.
//!
//! These are the values a replay header snapshots so that playback
//! starts from the same rules the recording did.

use std::fmt;
use std::str::FromStr;

use crate::error::SettingError;

/// What the player picks up automatically when stepping onto items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AutoPickupMode {
    /// Never pick anything up automatically.
    #[default]
    Off = 0,
    /// Gold only.
    Gold = 1,
    /// Every item.
    All = 2,
    /// Gold plus items the player has flagged as wanted.
    Smart = 3,
}

impl AutoPickupMode {
    /// The header encoding of this mode (`0..=3`).
    pub const fn as_int(self) -> i32 {
        self as i32
    }

    /// Decode a header value; `None` outside `0..=3`.
    pub fn from_int(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::Off),
            1 => Some(Self::Gold),
            2 => Some(Self::All),
            3 => Some(Self::Smart),
            _ => None,
        }
    }

    /// The next mode in the toggle cycle.
    pub fn cycle(self) -> Self {
        match self {
            Self::Off => Self::Gold,
            Self::Gold => Self::All,
            Self::All => Self::Smart,
            Self::Smart => Self::Off,
        }
    }
}

/// Starting character class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[allow(missing_docs)]
pub enum PlayerClass {
    #[default]
    Adventurer,
    Knight,
    Rogue,
    Archer,
    Wizard,
}

impl PlayerClass {
    /// Canonical token, as written to settings files and replay headers.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Adventurer => "adventurer",
            Self::Knight => "knight",
            Self::Rogue => "rogue",
            Self::Archer => "archer",
            Self::Wizard => "wizard",
        }
    }

    /// Resolve a class token, falling back to the engine default for
    /// empty or unknown tokens.
    pub fn resolve_or_default(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }
}

impl fmt::Display for PlayerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PlayerClass {
    type Err = SettingError;

    /// Case-insensitive; whitespace, `_` and `-` are ignored, and a few
    /// common aliases are accepted ("mage", "thief", ...).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match s.as_str() {
            "adventurer" | "advent" | "adv" => Ok(Self::Adventurer),
            "knight" | "warrior" | "fighter" => Ok(Self::Knight),
            "rogue" | "thief" => Ok(Self::Rogue),
            "archer" | "ranger" | "bow" => Ok(Self::Archer),
            "wizard" | "mage" | "wiz" => Ok(Self::Wizard),
            _ => Err(SettingError::UnknownClass {
                token: raw.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_aliases_normalise() {
        assert_eq!("Mage".parse::<PlayerClass>(), Ok(PlayerClass::Wizard));
        assert_eq!(" war-rior ".parse::<PlayerClass>(), Ok(PlayerClass::Knight));
        assert_eq!("ROGUE".parse::<PlayerClass>(), Ok(PlayerClass::Rogue));
    }

    #[test]
    fn unknown_class_falls_back_to_default() {
        assert!("paladin".parse::<PlayerClass>().is_err());
        assert_eq!(PlayerClass::resolve_or_default("paladin"), PlayerClass::Adventurer);
        assert_eq!(PlayerClass::resolve_or_default(""), PlayerClass::Adventurer);
    }

    #[test]
    fn canonical_tokens_roundtrip() {
        for c in [
            PlayerClass::Adventurer,
            PlayerClass::Knight,
            PlayerClass::Rogue,
            PlayerClass::Archer,
            PlayerClass::Wizard,
        ] {
            assert_eq!(c.id().parse::<PlayerClass>(), Ok(c));
        }
    }

    #[test]
    fn auto_pickup_header_range() {
        for v in 0..=3 {
            assert_eq!(AutoPickupMode::from_int(v).map(|m| m.as_int()), Some(v));
        }
        assert_eq!(AutoPickupMode::from_int(4), None);
        assert_eq!(AutoPickupMode::from_int(-1), None);
        assert_eq!(AutoPickupMode::Smart.cycle(), AutoPickupMode::Off);
    }
}
