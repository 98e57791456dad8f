//! The catalogue of game actions known to this build.
//!
//! Discriminants are part of the replay format: `A <id>` lines store
//! them verbatim. New actions must be appended, never inserted.

use crate::id::{ActionId, Vec2i};

/// A discrete player action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Action {
    None = 0,

    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,

    Wait,

    Confirm,
    Cancel,

    StairsUp,
    StairsDown,
    Restart,

    Pickup,
    Inventory,
    Fire,

    Equip,
    Use,
    Drop,
    DropAll,
    SortInventory,

    Save,
    Load,
    LoadAuto,
    Help,

    LogUp,
    LogDown,

    Search,
    Disarm,
    CloseDoor,
    LockDoor,
    Kick,
    ToggleAutoPickup,
    AutoExplore,

    Look,
    Rest,

    ToggleSneak,

    ToggleMinimap,
    ToggleStats,

    Options,
    Command,

    ToggleFullscreen,
    Screenshot,
}

impl Action {
    /// Every action, in discriminant order.
    pub const ALL: [Action; 45] = [
        Action::None,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::UpLeft,
        Action::UpRight,
        Action::DownLeft,
        Action::DownRight,
        Action::Wait,
        Action::Confirm,
        Action::Cancel,
        Action::StairsUp,
        Action::StairsDown,
        Action::Restart,
        Action::Pickup,
        Action::Inventory,
        Action::Fire,
        Action::Equip,
        Action::Use,
        Action::Drop,
        Action::DropAll,
        Action::SortInventory,
        Action::Save,
        Action::Load,
        Action::LoadAuto,
        Action::Help,
        Action::LogUp,
        Action::LogDown,
        Action::Search,
        Action::Disarm,
        Action::CloseDoor,
        Action::LockDoor,
        Action::Kick,
        Action::ToggleAutoPickup,
        Action::AutoExplore,
        Action::Look,
        Action::Rest,
        Action::ToggleSneak,
        Action::ToggleMinimap,
        Action::ToggleStats,
        Action::Options,
        Action::Command,
        Action::ToggleFullscreen,
        Action::Screenshot,
    ];

    /// The stable numeric id of this action.
    pub const fn id(self) -> ActionId {
        ActionId(self as u8)
    }

    /// Look up the action for a numeric id, if this build knows it.
    pub fn from_id(id: ActionId) -> Option<Action> {
        Self::ALL.get(id.0 as usize).copied().filter(|a| a.id() == id)
    }

    /// The unit step for a movement action, `None` for everything else.
    pub fn direction(self) -> Option<Vec2i> {
        let d = match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::UpLeft => (-1, -1),
            Action::UpRight => (1, -1),
            Action::DownLeft => (-1, 1),
            Action::DownRight => (1, 1),
            _ => return None,
        };
        Some(Vec2i::from(d))
    }
}

impl From<Action> for ActionId {
    fn from(a: Action) -> Self {
        a.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_table_positions() {
        for (i, a) in Action::ALL.iter().enumerate() {
            assert_eq!(a.id().0 as usize, i, "{a:?} out of place");
            assert_eq!(Action::from_id(a.id()), Some(*a));
        }
    }

    #[test]
    fn unknown_ids_are_rejected() {
        assert_eq!(Action::from_id(ActionId(45)), None);
        assert_eq!(Action::from_id(ActionId(200)), None);
    }

    #[test]
    fn right_moves_east() {
        assert_eq!(Action::Right.direction(), Some(Vec2i::new(1, 0)));
        assert_eq!(Action::Wait.direction(), None);
    }
}
