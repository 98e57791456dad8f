//! Strongly-typed identifiers and the [`Vec2i`] grid position.

use std::fmt;

/// Identifies a game action by its stable numeric id.
///
/// Replays record actions, not raw keys, so keybind changes never
/// invalidate a recording. The id is the discriminant of [`Action`]
/// when the action is known to this build; unknown ids are carried
/// through untouched and left for the simulation to reject.
///
/// [`Action`]: crate::action::Action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ActionId(pub u8);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for ActionId {
    fn from(v: u8) -> Self {
        Self(v)
    }
}

/// A 2D integer position on the dungeon grid (or a cursor over it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Vec2i {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Vec2i {
    /// Construct a position from its components.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance to `other`.
    pub fn chebyshev(self, other: Vec2i) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Component-wise sign of `other - self`: the single king step
    /// that moves `self` toward `other`.
    pub fn step_toward(self, other: Vec2i) -> Vec2i {
        Vec2i::new((other.x - self.x).signum(), (other.y - self.y).signum())
    }
}

impl std::ops::Add for Vec2i {
    type Output = Vec2i;

    fn add(self, rhs: Vec2i) -> Vec2i {
        Vec2i::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl fmt::Display for Vec2i {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Vec2i {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_toward_is_a_king_move() {
        let from = Vec2i::new(3, 3);
        assert_eq!(from.step_toward(Vec2i::new(10, 1)), Vec2i::new(1, -1));
        assert_eq!(from.step_toward(from), Vec2i::new(0, 0));
    }

    #[test]
    fn chebyshev_distance() {
        assert_eq!(Vec2i::new(0, 0).chebyshev(Vec2i::new(3, -7)), 7);
    }
}
