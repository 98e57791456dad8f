//! [`ReferenceDungeon`]: a small deterministic roguelike that implements
//! [`Simulation`].
//!
//! Turn-taking actions are queued by `handle_action` and resolved on the
//! next `update`; modal UI actions (prompt, history, look, targeting)
//! take effect immediately so that text events in the same frame see the
//! right focus. Auto-travel advances one step per `auto_step_delay_ms`
//! of accumulated simulated time.

use std::collections::VecDeque;

use procrogue_core::{
    Action, ActionId, AutoPickupMode, PlayerClass, Simulation, StateHasher, TurnObserver, Vec2i,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::content::DungeonContent;
use crate::map::{Map, Tile};
use crate::monster::{melee_damage, Monster, MonsterKind};
use crate::ui::{CommandPrompt, MessageLog};

/// Gold piles placed on each level.
const GOLD_PER_LEVEL: usize = 6;
/// Distance at which monsters notice and chase the player.
const CHASE_RANGE: i32 = 8;
/// Maximum range of a fired shot.
const FIRE_RANGE: i32 = 6;
/// Turns of hunger before starvation damage starts.
const STARVE_AFTER: u32 = 400;
/// Spawn distance kept clear around the arrival point.
const SAFE_RADIUS: i32 = 5;

/// Gameplay settings applied by the replay header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    #[allow(missing_docs)]
    pub auto_pickup: AutoPickupMode,
    #[allow(missing_docs)]
    pub auto_step_delay_ms: i32,
    #[allow(missing_docs)]
    pub auto_explore_search: bool,
    #[allow(missing_docs)]
    pub identify_items: bool,
    #[allow(missing_docs)]
    pub hunger: bool,
    #[allow(missing_docs)]
    pub encumbrance: bool,
    #[allow(missing_docs)]
    pub lighting: bool,
    #[allow(missing_docs)]
    pub yendor_doom: bool,
    #[allow(missing_docs)]
    pub bones: bool,
    #[allow(missing_docs)]
    pub class: PlayerClass,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_pickup: AutoPickupMode::Off,
            auto_step_delay_ms: 45,
            auto_explore_search: false,
            identify_items: true,
            hunger: false,
            encumbrance: false,
            lighting: false,
            yendor_doom: true,
            bones: true,
            class: PlayerClass::default(),
        }
    }
}

/// Save-related settings. Never part of the determinism hash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Persistence {
    /// Active save slot name.
    pub active_slot: String,
    /// Autosave cadence in turns; `0` disables.
    pub autosave_every_turns: u32,
    /// Rotated backups kept.
    pub save_backups: u32,
    /// Whether death writes a mortem file.
    pub auto_mortem: bool,
}

/// The player character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    #[allow(missing_docs)]
    pub pos: Vec2i,
    #[allow(missing_docs)]
    pub hp: i32,
    #[allow(missing_docs)]
    pub hp_max: i32,
    #[allow(missing_docs)]
    pub atk: i32,
    #[allow(missing_docs)]
    pub def: i32,
    /// Gold carried.
    pub gold: u32,
    /// Turns since last meal, when hunger is enabled.
    pub hunger: u32,
}

impl Player {
    fn new(class: PlayerClass, pos: Vec2i) -> Self {
        let (hp, atk, def) = match class {
            PlayerClass::Adventurer => (12, 2, 1),
            PlayerClass::Knight => (16, 3, 2),
            PlayerClass::Rogue => (10, 3, 0),
            PlayerClass::Archer => (10, 2, 1),
            PlayerClass::Wizard => (8, 1, 0),
        };
        Self {
            pos,
            hp,
            hp_max: hp,
            atk,
            def,
            gold: 0,
            hunger: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Turn {
    Act(Action),
    FireAt(Vec2i),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Travel {
    target: Vec2i,
    exploring: bool,
}

/// The reference simulation.
pub struct ReferenceDungeon {
    content: DungeonContent,
    settings: Settings,
    persistence: Persistence,

    seed: u32,
    rng: ChaCha8Rng,
    depth: u32,
    map: Map,
    player: Player,
    monsters: Vec<Monster>,
    gold: Vec<Vec2i>,
    turns: u32,
    dead: bool,

    pending: VecDeque<Turn>,
    travel: Option<Travel>,
    step_acc_ms: u32,

    prompt: CommandPrompt,
    log: MessageLog,
    look: Option<Vec2i>,
    target: Option<Vec2i>,

    hook: Option<Box<dyn TurnObserver>>,
}

impl Default for ReferenceDungeon {
    fn default() -> Self {
        Self::new(DungeonContent::default())
    }
}

impl ReferenceDungeon {
    /// A dungeon using `content`, with a seed-0 run already started.
    pub fn new(content: DungeonContent) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let map = Map::generate(&mut rng);
        let player = Player::new(PlayerClass::default(), map.start());
        let mut dungeon = Self {
            content,
            settings: Settings::default(),
            persistence: Persistence::default(),
            seed: 0,
            rng,
            depth: 1,
            map,
            player,
            monsters: Vec::new(),
            gold: Vec::new(),
            turns: 0,
            dead: false,
            pending: VecDeque::new(),
            travel: None,
            step_acc_ms: 0,
            prompt: CommandPrompt::default(),
            log: MessageLog::default(),
            look: None,
            target: None,
            hook: None,
        };
        dungeon.new_game(0);
        dungeon
    }

    // ── Accessors ───────────────────────────────────────────────

    #[allow(missing_docs)]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[allow(missing_docs)]
    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    #[allow(missing_docs)]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[allow(missing_docs)]
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Living monsters on the current level.
    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    /// Gold piles on the current level.
    pub fn gold_piles(&self) -> &[Vec2i] {
        &self.gold
    }

    /// Current depth, starting at 1.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the player has died.
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Whether auto-travel or auto-explore is in progress.
    pub fn is_auto_moving(&self) -> bool {
        self.travel.is_some()
    }

    #[allow(missing_docs)]
    pub fn messages(&self) -> &MessageLog {
        &self.log
    }

    /// Text currently typed into the command prompt.
    pub fn command_text(&self) -> &str {
        self.prompt.text()
    }

    /// Look cursor position, while looking.
    pub fn look_cursor(&self) -> Option<Vec2i> {
        self.look
    }

    /// Targeting cursor position, while targeting.
    pub fn target_cursor(&self) -> Option<Vec2i> {
        self.target
    }

    // ── Level setup ─────────────────────────────────────────────

    fn enter_level(&mut self) {
        self.map = Map::generate(&mut self.rng);
        self.player.pos = self.map.start();
        self.monsters.clear();
        self.gold.clear();
        self.travel = None;

        let floor: Vec<Vec2i> = self.map.floor_tiles().collect();
        let start = self.map.start();

        for _ in 0..GOLD_PER_LEVEL {
            let p = floor[self.rng.random_range(0..floor.len())];
            if p != start && !self.gold.contains(&p) {
                self.gold.push(p);
            }
        }

        let weights = self.content.spawn_weights(self.depth);
        let total: i32 = weights.iter().map(|(_, w)| *w).sum();
        if total <= 0 {
            return;
        }
        let count = 3 + self.depth as usize;
        for _ in 0..count {
            let p = floor[self.rng.random_range(0..floor.len())];
            if p.chebyshev(start) <= SAFE_RADIUS || self.monster_at(p).is_some() {
                continue;
            }
            let mut roll = self.rng.random_range(0..total);
            let mut kind = MonsterKind::Rat;
            for (k, w) in &weights {
                if roll < *w {
                    kind = *k;
                    break;
                }
                roll -= w;
            }
            self.monsters
                .push(Monster::spawn(kind, p, self.content.stats(kind)));
        }
        tracing::debug!(
            depth = self.depth,
            monsters = self.monsters.len(),
            gold = self.gold.len(),
            "level generated"
        );
    }

    fn monster_at(&self, pos: Vec2i) -> Option<usize> {
        self.monsters.iter().position(|m| m.is_alive() && m.pos == pos)
    }

    fn clamp_to_map(&self, pos: Vec2i) -> Vec2i {
        Vec2i::new(
            pos.x.clamp(0, crate::map::MAP_WIDTH - 1),
            pos.y.clamp(0, crate::map::MAP_HEIGHT - 1),
        )
    }

    // ── Turn resolution ─────────────────────────────────────────

    fn end_turn(&mut self) {
        self.turns += 1;

        if self.settings.hunger {
            self.player.hunger += 1;
            if self.player.hunger > STARVE_AFTER {
                self.player.hp -= 1;
                self.log.push("You are starving!");
            }
        }

        self.monsters_act();
        self.monsters.retain(Monster::is_alive);

        if self.player.hp <= 0 && !self.dead {
            self.dead = true;
            self.pending.clear();
            self.travel = None;
            self.log.push("You die...");
            tracing::debug!(turn = self.turns, depth = self.depth, "player died");
        }

        let turn = self.turns;
        let hash = self.determinism_hash();
        if let Some(hook) = self.hook.as_mut() {
            hook.on_turn(turn, hash);
        }
    }

    fn monsters_act(&mut self) {
        for i in 0..self.monsters.len() {
            if !self.monsters[i].is_alive() || self.player.hp <= 0 {
                continue;
            }
            let pos = self.monsters[i].pos;
            let dist = pos.chebyshev(self.player.pos);
            if dist == 1 {
                let dmg = melee_damage(self.monsters[i].stats.atk, self.player.def);
                self.player.hp -= dmg;
                let kind = self.monsters[i].kind;
                self.log.push(format!("The {kind} hits you for {dmg}."));
                self.travel = None;
            } else if dist <= CHASE_RANGE {
                let monsters = &self.monsters;
                let next = self.map.next_step(pos, self.player.pos, |p| {
                    monsters.iter().any(|o| o.is_alive() && o.pos == p)
                });
                if let Some(next) = next.filter(|n| *n != self.player.pos) {
                    self.monsters[i].pos = next;
                }
            }
        }
    }

    /// Move or attack one step. Returns whether a turn was spent.
    fn step_player(&mut self, to: Vec2i) -> bool {
        if let Some(idx) = self.monster_at(to) {
            self.attack(idx);
            return true;
        }
        if !self.map.is_walkable(to) {
            self.log.push("You bump into a wall.");
            return false;
        }
        self.player.pos = to;
        if self.settings.auto_pickup != AutoPickupMode::Off {
            self.pick_up_gold();
        }
        if self.map.tile(to) == Tile::StairsDown {
            self.log.push("There is a staircase down here.");
        }
        true
    }

    fn attack(&mut self, idx: usize) {
        let dmg = melee_damage(self.player.atk, self.monsters[idx].stats.def);
        let m = &mut self.monsters[idx];
        m.hp -= dmg;
        let kind = m.kind;
        if m.is_alive() {
            self.log.push(format!("You hit the {kind}."));
        } else {
            self.log.push(format!("You kill the {kind}!"));
        }
    }

    fn pick_up_gold(&mut self) -> bool {
        let Some(i) = self.gold.iter().position(|g| *g == self.player.pos) else {
            return false;
        };
        self.gold.remove(i);
        let amount = 5 * self.depth;
        self.player.gold += amount;
        self.log.push(format!("You pick up {amount} gold."));
        true
    }

    fn resolve(&mut self, turn: Turn) {
        if self.dead {
            return;
        }
        let spent = match turn {
            Turn::FireAt(at) => {
                match self.monster_at(at) {
                    Some(idx) if at.chebyshev(self.player.pos) <= FIRE_RANGE => self.attack(idx),
                    _ => self.log.push("Your shot hits nothing."),
                }
                true
            }
            Turn::Act(action) => match action {
                Action::Wait => true,
                Action::Rest => {
                    if self.player.hp < self.player.hp_max {
                        self.player.hp += 1;
                    }
                    true
                }
                Action::Search => {
                    self.log.push("You search the area.");
                    true
                }
                Action::Pickup => {
                    if !self.pick_up_gold() {
                        self.log.push("There is nothing here.");
                    }
                    true
                }
                Action::StairsDown => {
                    if self.map.tile(self.player.pos) == Tile::StairsDown {
                        self.depth += 1;
                        self.enter_level();
                        self.log.push(format!("You descend to depth {}.", self.depth));
                        true
                    } else {
                        self.log.push("There are no stairs here.");
                        false
                    }
                }
                a => match a.direction() {
                    Some(d) => self.step_player(self.player.pos + d),
                    None => false,
                },
            },
        };
        if spent {
            self.end_turn();
        }
    }

    // ── Auto-travel ─────────────────────────────────────────────

    fn start_explore(&mut self) {
        let from = self.player.pos;
        let nearest = self.gold.iter().copied().min_by_key(|g| g.chebyshev(from));
        match nearest {
            Some(target) => {
                self.travel = Some(Travel {
                    target,
                    exploring: true,
                });
            }
            None => {
                self.travel = None;
                if self.settings.auto_explore_search {
                    self.log.push("Nothing left to explore; you search.");
                    self.pending.push_back(Turn::Act(Action::Search));
                } else {
                    self.log.push("Nothing left to explore.");
                }
            }
        }
    }

    fn auto_step(&mut self) {
        let Some(travel) = self.travel else {
            return;
        };
        let monsters = &self.monsters;
        let next = self.map.next_step(self.player.pos, travel.target, |p| {
            monsters.iter().any(|m| m.is_alive() && m.pos == p)
        });
        let Some(next) = next else {
            self.travel = None;
            return;
        };
        if self.step_player(next) {
            self.end_turn();
        } else {
            self.travel = None;
            return;
        }
        if self.player.pos == travel.target && self.travel.is_some() {
            if travel.exploring {
                self.start_explore();
            } else {
                self.travel = None;
            }
        }
        let threatened = self
            .monsters
            .iter()
            .any(|m| m.pos.chebyshev(self.player.pos) <= 2);
        if threatened && self.travel.is_some() {
            self.log.push("You stop; a monster is near.");
            self.travel = None;
        }
    }

    // ── Commands ────────────────────────────────────────────────

    fn run_command(&mut self, text: &str) {
        let cmd = text.trim().to_ascii_lowercase();
        let action = match cmd.as_str() {
            "" => return,
            "wait" => Action::Wait,
            "rest" => Action::Rest,
            "search" => Action::Search,
            "pickup" => Action::Pickup,
            "descend" => Action::StairsDown,
            "explore" => {
                self.start_explore();
                return;
            }
            "help" => {
                self.log
                    .push(format!("Commands: {}", crate::ui::COMMANDS.join(", ")));
                return;
            }
            _ => {
                self.log.push(format!("Unknown command: {cmd}"));
                return;
            }
        };
        self.pending.push_back(Turn::Act(action));
    }

    fn handle_modal(&mut self, action: Action) -> bool {
        if self.prompt.is_open() {
            match action {
                Action::Confirm => {
                    let text = self.prompt.close();
                    self.run_command(&text);
                }
                Action::Cancel | Action::Command => {
                    self.prompt.close();
                }
                _ => {}
            }
            return true;
        }
        if self.log.is_open() {
            if matches!(action, Action::Cancel | Action::LogUp | Action::LogDown) {
                self.log.close();
            }
            return true;
        }
        if let Some(cursor) = self.look {
            match action {
                Action::Confirm => {
                    let what = match self.map.tile(cursor) {
                        Tile::Wall => "solid rock",
                        Tile::Floor => "the floor",
                        Tile::StairsDown => "a staircase down",
                    };
                    self.log.push(format!("You see {what}."));
                    self.look = None;
                }
                Action::Cancel | Action::Look => self.look = None,
                a => {
                    if let Some(d) = a.direction() {
                        self.look = Some(self.clamp_to_map(cursor + d));
                    }
                }
            }
            return true;
        }
        if let Some(cursor) = self.target {
            match action {
                Action::Confirm | Action::Fire => {
                    self.target = None;
                    self.pending.push_back(Turn::FireAt(cursor));
                }
                Action::Cancel => self.target = None,
                a => {
                    if let Some(d) = a.direction() {
                        self.target = Some(self.clamp_to_map(cursor + d));
                    }
                }
            }
            return true;
        }
        false
    }
}

impl Simulation for ReferenceDungeon {
    /// Starting a run resets the per-run toggles (auto-pickup mode and
    /// auto-explore search) to their defaults.
    fn new_game(&mut self, seed: u32) {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed as u64);
        self.depth = 1;
        self.turns = 0;
        self.dead = false;
        self.pending.clear();
        self.step_acc_ms = 0;
        self.prompt = CommandPrompt::default();
        self.log = MessageLog::default();
        self.look = None;
        self.target = None;
        self.settings.auto_pickup = AutoPickupMode::Off;
        self.settings.auto_explore_search = false;
        self.player = Player::new(self.settings.class, Vec2i::default());
        self.enter_level();
        self.log.push("Welcome to the dungeon.");
    }

    fn handle_action(&mut self, id: ActionId) {
        let Some(action) = Action::from_id(id) else {
            return;
        };
        if self.dead {
            if action == Action::Restart {
                self.new_game(self.seed);
            }
            return;
        }
        if self.handle_modal(action) {
            return;
        }

        match action {
            Action::Command => {
                self.travel = None;
                self.prompt.open();
            }
            Action::LogUp => self.log.open(),
            Action::Look => {
                self.look = Some(self.player.pos);
            }
            Action::Fire => {
                let from = self.player.pos;
                let nearest = self
                    .monsters
                    .iter()
                    .filter(|m| m.pos.chebyshev(from) <= FIRE_RANGE)
                    .map(|m| m.pos)
                    .min_by_key(|p| p.chebyshev(from));
                self.target = Some(nearest.unwrap_or(from));
            }
            Action::ToggleAutoPickup => {
                self.settings.auto_pickup = self.settings.auto_pickup.cycle();
                self.log
                    .push(format!("Auto-pickup: {:?}.", self.settings.auto_pickup));
            }
            Action::AutoExplore => self.start_explore(),
            Action::Wait
            | Action::Rest
            | Action::Search
            | Action::Pickup
            | Action::StairsDown => {
                self.travel = None;
                self.pending.push_back(Turn::Act(action));
            }
            a if a.direction().is_some() => {
                self.travel = None;
                self.pending.push_back(Turn::Act(a));
            }
            _ => {}
        }
    }

    fn update(&mut self, dt: f32) {
        let dt_ms = (dt.clamp(0.0, 0.1) * 1000.0).round() as u32;

        while let Some(turn) = self.pending.pop_front() {
            self.resolve(turn);
        }

        if self.travel.is_none() || self.dead {
            self.step_acc_ms = 0;
            return;
        }
        let delay = self.settings.auto_step_delay_ms.max(0) as u32;
        if delay == 0 {
            self.auto_step();
            return;
        }
        self.step_acc_ms += dt_ms;
        while self.step_acc_ms >= delay && self.travel.is_some() && !self.dead {
            self.step_acc_ms -= delay;
            self.auto_step();
        }
    }

    fn turns(&self) -> u32 {
        self.turns
    }

    fn determinism_hash(&self) -> u64 {
        let mut h = StateHasher::new();
        h.u32(self.seed).u32(self.depth).u32(self.turns).bool(self.dead);
        h.u64(self.content.source_hash());

        let s = &self.settings;
        h.str(s.class.id())
            .i32(s.auto_pickup.as_int())
            .bool(s.identify_items)
            .bool(s.hunger)
            .bool(s.encumbrance)
            .bool(s.lighting)
            .bool(s.yendor_doom)
            .bool(s.bones);

        let p = &self.player;
        h.i32(p.pos.x)
            .i32(p.pos.y)
            .i32(p.hp)
            .i32(p.hp_max)
            .i32(p.atk)
            .i32(p.def)
            .u32(p.gold)
            .u32(p.hunger);

        self.map.hash_into(&mut h);
        h.u32(self.gold.len() as u32);
        for g in &self.gold {
            h.i32(g.x).i32(g.y);
        }
        h.u32(self.monsters.len() as u32);
        for m in &self.monsters {
            m.hash_into(&mut h);
        }
        let word_pos = self.rng.get_word_pos();
        h.u64(word_pos as u64).u64((word_pos >> 64) as u64);
        h.finish()
    }

    fn set_turn_hook(&mut self, hook: Box<dyn TurnObserver>) {
        self.hook = Some(hook);
    }

    fn clear_turn_hook(&mut self) {
        self.hook = None;
    }

    fn is_command_open(&self) -> bool {
        self.prompt.is_open()
    }

    fn is_message_history_open(&self) -> bool {
        self.log.is_open()
    }

    fn is_message_history_search_mode(&self) -> bool {
        self.log.is_open() && self.log.is_search_mode()
    }

    fn is_targeting(&self) -> bool {
        self.target.is_some()
    }

    fn is_looking(&self) -> bool {
        self.look.is_some()
    }

    fn command_text_input(&mut self, text: &str) {
        self.prompt.input(text);
    }

    fn command_backspace(&mut self) {
        self.prompt.backspace();
    }

    fn command_autocomplete(&mut self) {
        self.prompt.autocomplete();
    }

    fn message_history_text_input(&mut self, text: &str) {
        self.log.search_input(text);
    }

    fn message_history_backspace(&mut self) {
        self.log.search_backspace();
    }

    fn message_history_toggle_search_mode(&mut self) {
        self.log.toggle_search_mode();
    }

    fn message_history_clear_search(&mut self) {
        self.log.clear_search();
    }

    fn request_auto_travel(&mut self, pos: Vec2i) {
        if self.dead || self.prompt.is_open() || self.log.is_open() {
            return;
        }
        self.look = None;
        if pos == self.player.pos || !self.map.is_walkable(pos) {
            return;
        }
        self.travel = Some(Travel {
            target: pos,
            exploring: false,
        });
    }

    fn begin_look_at(&mut self, pos: Vec2i) {
        self.target = None;
        self.look = Some(self.clamp_to_map(pos));
    }

    fn set_target_cursor(&mut self, pos: Vec2i) {
        if self.target.is_some() {
            self.target = Some(self.clamp_to_map(pos));
        }
    }

    fn set_look_cursor(&mut self, pos: Vec2i) {
        if self.look.is_some() {
            self.look = Some(self.clamp_to_map(pos));
        }
    }

    fn set_auto_pickup_mode(&mut self, mode: AutoPickupMode) {
        self.settings.auto_pickup = mode;
    }

    fn set_auto_step_delay_ms(&mut self, ms: i32) {
        self.settings.auto_step_delay_ms = ms;
    }

    fn set_auto_explore_search_enabled(&mut self, enabled: bool) {
        self.settings.auto_explore_search = enabled;
    }

    fn set_identification_enabled(&mut self, enabled: bool) {
        self.settings.identify_items = enabled;
    }

    fn set_hunger_enabled(&mut self, enabled: bool) {
        self.settings.hunger = enabled;
    }

    fn set_encumbrance_enabled(&mut self, enabled: bool) {
        self.settings.encumbrance = enabled;
    }

    fn set_lighting_enabled(&mut self, enabled: bool) {
        self.settings.lighting = enabled;
    }

    fn set_yendor_doom_enabled(&mut self, enabled: bool) {
        self.settings.yendor_doom = enabled;
    }

    fn set_bones_enabled(&mut self, enabled: bool) {
        self.settings.bones = enabled;
    }

    fn set_player_class(&mut self, class: PlayerClass) {
        self.settings.class = class;
    }

    fn set_active_slot(&mut self, slot: &str) {
        self.persistence.active_slot = slot.to_string();
    }

    fn set_autosave_every_turns(&mut self, turns: u32) {
        self.persistence.autosave_every_turns = turns;
    }

    fn set_save_backups(&mut self, count: u32) {
        self.persistence.save_backups = count;
    }

    fn set_auto_mortem_enabled(&mut self, enabled: bool) {
        self.persistence.auto_mortem = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Turns(Vec<(u32, u64)>);

    impl TurnObserver for Turns {
        fn on_turn(&mut self, turn: u32, hash: u64) {
            self.0.push((turn, hash));
        }
    }

    fn started(seed: u32) -> ReferenceDungeon {
        let mut d = ReferenceDungeon::default();
        d.new_game(seed);
        d
    }

    #[test]
    fn same_seed_same_hash() {
        assert_eq!(started(42).determinism_hash(), started(42).determinism_hash());
        assert_ne!(started(42).determinism_hash(), started(43).determinism_hash());
    }

    #[test]
    fn start_is_surrounded_by_floor() {
        let d = started(42);
        for a in Action::ALL {
            if let Some(dir) = a.direction() {
                assert!(d.map().is_walkable(d.player().pos + dir));
            }
        }
    }

    #[test]
    fn actions_resolve_on_update() {
        let mut d = started(42);
        let start = d.player().pos;
        d.handle_action(Action::Right.id());
        assert_eq!(d.turns(), 0);
        d.update(0.016);
        assert_eq!(d.turns(), 1);
        assert_eq!(d.player().pos, start + Vec2i::new(1, 0));
    }

    #[test]
    fn hook_sees_each_turn() {
        let mut d = started(7);
        let log = Rc::new(RefCell::new(Turns::default()));
        d.set_turn_hook(Box::new(Rc::clone(&log)));
        d.handle_action(Action::Wait.id());
        d.handle_action(Action::Wait.id());
        d.update(0.016);
        let seen = log.borrow().0.clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].0, 2);
        assert_eq!(seen[1].1, d.determinism_hash());

        d.clear_turn_hook();
        d.handle_action(Action::Wait.id());
        d.update(0.016);
        assert_eq!(log.borrow().0.len(), 2);
    }

    #[test]
    fn new_game_resets_run_toggles() {
        let mut d = ReferenceDungeon::default();
        d.set_auto_pickup_mode(AutoPickupMode::All);
        d.set_auto_explore_search_enabled(true);
        d.set_hunger_enabled(true);
        d.new_game(1);
        assert_eq!(d.settings().auto_pickup, AutoPickupMode::Off);
        assert!(!d.settings().auto_explore_search);
        assert!(d.settings().hunger);
    }

    #[test]
    fn command_prompt_runs_commands() {
        let mut d = started(3);
        d.handle_action(Action::Command.id());
        assert!(d.is_command_open());
        d.command_text_input("wa");
        d.command_autocomplete();
        assert_eq!(d.command_text(), "wait");
        // Movement is swallowed by the open prompt.
        d.handle_action(Action::Left.id());
        d.handle_action(Action::Confirm.id());
        assert!(!d.is_command_open());
        d.update(0.016);
        assert_eq!(d.turns(), 1);
    }

    #[test]
    fn unknown_command_is_logged() {
        let mut d = started(3);
        d.handle_action(Action::Command.id());
        d.command_text_input("dance");
        d.handle_action(Action::Confirm.id());
        assert_eq!(d.messages().last(), Some("Unknown command: dance"));
    }

    #[test]
    fn history_search_mode() {
        let mut d = started(3);
        d.handle_action(Action::LogUp.id());
        assert!(d.is_message_history_open());
        assert!(!d.is_message_history_search_mode());
        d.message_history_toggle_search_mode();
        assert!(d.is_message_history_search_mode());
        d.message_history_text_input("welc");
        assert_eq!(d.messages().filtered().count(), 1);
        d.handle_action(Action::Cancel.id());
        assert!(!d.is_message_history_open());
    }

    #[test]
    fn look_cursor_moves_and_exits() {
        let mut d = started(3);
        d.begin_look_at(Vec2i::new(5, 5));
        assert!(d.is_looking());
        d.set_look_cursor(Vec2i::new(6, 5));
        d.handle_action(Action::Down.id());
        assert_eq!(d.look_cursor(), Some(Vec2i::new(6, 6)));
        d.handle_action(Action::Cancel.id());
        assert!(!d.is_looking());
        // Cursor updates while not looking are ignored.
        d.set_look_cursor(Vec2i::new(1, 1));
        assert_eq!(d.look_cursor(), None);
    }

    #[test]
    fn firing_spends_a_turn() {
        let mut d = started(3);
        d.handle_action(Action::Fire.id());
        assert!(d.is_targeting());
        d.set_target_cursor(d.player().pos + Vec2i::new(2, 0));
        d.handle_action(Action::Confirm.id());
        assert!(!d.is_targeting());
        d.update(0.016);
        assert_eq!(d.turns(), 1);
    }

    #[test]
    fn auto_travel_is_paced_by_step_delay() {
        let mut d = started(42);
        let target = d.player().pos + Vec2i::new(1, 1);
        d.set_auto_step_delay_ms(40);
        d.request_auto_travel(target);
        assert!(d.is_auto_moving());
        d.update(0.016);
        d.update(0.016);
        assert_eq!(d.turns(), 0);
        d.update(0.016);
        assert_eq!(d.turns(), 1);
        assert_eq!(d.player().pos, target);
        assert!(!d.is_auto_moving());
    }

    #[test]
    fn persistence_is_not_hashed() {
        let mut d = started(9);
        let before = d.determinism_hash();
        d.set_active_slot("__replay__");
        d.set_autosave_every_turns(0);
        d.set_auto_mortem_enabled(false);
        assert_eq!(d.determinism_hash(), before);
        assert_eq!(d.persistence().active_slot, "__replay__");
    }

    #[test]
    fn content_changes_hash() {
        let (content, _) = DungeonContent::parse("monster.rat.hp = 9\n");
        let mut a = ReferenceDungeon::new(content);
        a.new_game(5);
        assert_ne!(a.determinism_hash(), started(5).determinism_hash());
    }

    #[test]
    fn unknown_action_ids_are_ignored() {
        let mut d = started(1);
        let before = d.determinism_hash();
        d.handle_action(ActionId(200));
        d.update(0.016);
        assert_eq!(d.determinism_hash(), before);
    }
}
