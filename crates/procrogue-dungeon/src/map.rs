//! Seeded cave maps and grid pathing.
//!
//! Maps are carved by a drunkard's walk from the centre, so every floor
//! tile is reachable from the start. Neighbour iteration uses a fixed
//! order, which keeps pathing identical across runs.

use std::collections::VecDeque;

use procrogue_core::{StateHasher, Vec2i};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Map width in tiles.
pub const MAP_WIDTH: i32 = 48;
/// Map height in tiles.
pub const MAP_HEIGHT: i32 = 24;

/// Fraction of interior tiles the walk carves before stopping.
const FLOOR_TARGET_PERCENT: usize = 40;

/// The eight king-move offsets, in the order pathing explores them.
pub const NEIGHBOURS: [Vec2i; 8] = [
    Vec2i::new(0, -1),
    Vec2i::new(1, 0),
    Vec2i::new(0, 1),
    Vec2i::new(-1, 0),
    Vec2i::new(1, -1),
    Vec2i::new(1, 1),
    Vec2i::new(-1, 1),
    Vec2i::new(-1, -1),
];

/// A map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    /// Solid rock.
    Wall,
    /// Open floor.
    Floor,
    /// Floor with a staircase to the next depth.
    StairsDown,
}

impl Tile {
    /// Whether creatures can stand here.
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    fn code(self) -> u8 {
        match self {
            Tile::Wall => 0,
            Tile::Floor => 1,
            Tile::StairsDown => 2,
        }
    }
}

/// A fixed-size tile grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Map {
    tiles: Vec<Tile>,
    start: Vec2i,
}

impl Map {
    /// Carve a new level from `rng`.
    pub fn generate(rng: &mut ChaCha8Rng) -> Self {
        let mut tiles = vec![Tile::Wall; (MAP_WIDTH * MAP_HEIGHT) as usize];
        let start = Vec2i::new(MAP_WIDTH / 2, MAP_HEIGHT / 2);
        let interior = ((MAP_WIDTH - 2) * (MAP_HEIGHT - 2)) as usize;
        let target = interior * FLOOR_TARGET_PERCENT / 100;

        let mut pos = start;
        let mut carved = 0usize;
        while carved < target {
            let idx = index(pos);
            if tiles[idx] == Tile::Wall {
                tiles[idx] = Tile::Floor;
                carved += 1;
            }
            let step = NEIGHBOURS[rng.random_range(0..4)];
            let next = pos + step;
            if next.x >= 1 && next.x < MAP_WIDTH - 1 && next.y >= 1 && next.y < MAP_HEIGHT - 1 {
                pos = next;
            }
        }

        // The arrival point always opens onto a 3x3 room.
        for d in NEIGHBOURS {
            tiles[index(start + d)] = Tile::Floor;
        }

        let mut map = Self { tiles, start };
        if let Some(stairs) = map.farthest_floor(start) {
            map.tiles[index(stairs)] = Tile::StairsDown;
        }
        map
    }

    /// Where the player arrives.
    pub fn start(&self) -> Vec2i {
        self.start
    }

    /// Whether `pos` lies inside the grid.
    pub fn in_bounds(&self, pos: Vec2i) -> bool {
        pos.x >= 0 && pos.x < MAP_WIDTH && pos.y >= 0 && pos.y < MAP_HEIGHT
    }

    /// Tile at `pos`; out-of-bounds reads as wall.
    pub fn tile(&self, pos: Vec2i) -> Tile {
        if self.in_bounds(pos) {
            self.tiles[index(pos)]
        } else {
            Tile::Wall
        }
    }

    /// Whether `pos` is walkable.
    pub fn is_walkable(&self, pos: Vec2i) -> bool {
        self.tile(pos).is_walkable()
    }

    /// Every walkable position, row-major.
    pub fn floor_tiles(&self) -> impl Iterator<Item = Vec2i> + '_ {
        (0..MAP_HEIGHT)
            .flat_map(|y| (0..MAP_WIDTH).map(move |x| Vec2i::new(x, y)))
            .filter(|p| self.is_walkable(*p))
    }

    fn farthest_floor(&self, from: Vec2i) -> Option<Vec2i> {
        let mut best: Option<(i32, Vec2i)> = None;
        for p in self.floor_tiles() {
            let d = p.chebyshev(from);
            if best.is_none_or(|(bd, _)| d > bd) {
                best = Some((d, p));
            }
        }
        best.map(|(_, p)| p)
    }

    /// First step of a shortest walkable path from `from` to `to`, or
    /// `None` if `to` is unreachable or already reached.
    ///
    /// `blocked` marks tiles to route around (occupied by creatures);
    /// the destination itself is always enterable.
    pub fn next_step(
        &self,
        from: Vec2i,
        to: Vec2i,
        blocked: impl Fn(Vec2i) -> bool,
    ) -> Option<Vec2i> {
        if from == to || !self.is_walkable(to) {
            return None;
        }
        let mut parent: Vec<Option<usize>> = vec![None; self.tiles.len()];
        let mut seen = vec![false; self.tiles.len()];
        let mut queue = VecDeque::new();
        seen[index(from)] = true;
        queue.push_back(from);

        while let Some(cur) = queue.pop_front() {
            if cur == to {
                let mut at = index(to);
                while let Some(prev) = parent[at] {
                    if prev == index(from) {
                        return Some(position(at));
                    }
                    at = prev;
                }
                return None;
            }
            for d in NEIGHBOURS {
                let next = cur + d;
                if !self.is_walkable(next) || seen[index(next)] {
                    continue;
                }
                if next != to && blocked(next) {
                    continue;
                }
                seen[index(next)] = true;
                parent[index(next)] = Some(index(cur));
                queue.push_back(next);
            }
        }
        None
    }

    /// Fold the grid into `h`.
    pub fn hash_into(&self, h: &mut StateHasher) {
        for t in &self.tiles {
            h.u8(t.code());
        }
    }
}

fn index(pos: Vec2i) -> usize {
    (pos.y * MAP_WIDTH + pos.x) as usize
}

fn position(idx: usize) -> Vec2i {
    let i = idx as i32;
    Vec2i::new(i % MAP_WIDTH, i / MAP_WIDTH)
}
