//! Reusable simulation test fixtures.
//!
//! - [`FrozenSimulation`]: time passes but the turn counter never moves.
//! - [`RecordingSimulation`]: logs every call and completes scripted turns.

use procrogue_core::{
    ActionId, AutoPickupMode, PlayerClass, Simulation, StateHasher, TurnObserver, Vec2i,
};

/// The hash [`RecordingSimulation`] reports at `turn` for `salt`.
pub fn expected_hash(salt: u64, turn: u32) -> u64 {
    StateHasher::new().u64(salt).u32(turn).finish()
}

/// A simulation stuck on one turn.
///
/// Every call is accepted and ignored; [`update`](Simulation::update)
/// only counts frames. Models a stuck auto-move for safety-limit tests.
#[derive(Default)]
pub struct FrozenSimulation {
    pub turn: u32,
    pub hash: u64,
    pub updates: u32,
    pub total_dt: f64,
    pub hook_installs: u32,
    pub hook_clears: u32,
    hook: Option<Box<dyn TurnObserver>>,
}

impl FrozenSimulation {
    pub fn new(turn: u32, hash: u64) -> Self {
        Self {
            turn,
            hash,
            ..Self::default()
        }
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }
}

impl Simulation for FrozenSimulation {
    fn new_game(&mut self, _seed: u32) {}
    fn handle_action(&mut self, _action: ActionId) {}

    fn update(&mut self, dt: f32) {
        self.updates += 1;
        self.total_dt += dt as f64;
    }

    fn turns(&self) -> u32 {
        self.turn
    }

    fn determinism_hash(&self) -> u64 {
        self.hash
    }

    fn set_turn_hook(&mut self, hook: Box<dyn TurnObserver>) {
        self.hook_installs += 1;
        self.hook = Some(hook);
    }

    fn clear_turn_hook(&mut self) {
        self.hook_clears += 1;
        self.hook = None;
    }

    fn is_command_open(&self) -> bool {
        false
    }
    fn is_message_history_open(&self) -> bool {
        false
    }
    fn is_message_history_search_mode(&self) -> bool {
        false
    }
    fn is_targeting(&self) -> bool {
        false
    }
    fn is_looking(&self) -> bool {
        false
    }

    fn command_text_input(&mut self, _text: &str) {}
    fn command_backspace(&mut self) {}
    fn command_autocomplete(&mut self) {}
    fn message_history_text_input(&mut self, _text: &str) {}
    fn message_history_backspace(&mut self) {}
    fn message_history_toggle_search_mode(&mut self) {}
    fn message_history_clear_search(&mut self) {}
    fn request_auto_travel(&mut self, _pos: Vec2i) {}
    fn begin_look_at(&mut self, _pos: Vec2i) {}
    fn set_target_cursor(&mut self, _pos: Vec2i) {}
    fn set_look_cursor(&mut self, _pos: Vec2i) {}

    fn set_auto_pickup_mode(&mut self, _mode: AutoPickupMode) {}
    fn set_auto_step_delay_ms(&mut self, _ms: i32) {}
    fn set_auto_explore_search_enabled(&mut self, _enabled: bool) {}
    fn set_identification_enabled(&mut self, _enabled: bool) {}
    fn set_hunger_enabled(&mut self, _enabled: bool) {}
    fn set_encumbrance_enabled(&mut self, _enabled: bool) {}
    fn set_lighting_enabled(&mut self, _enabled: bool) {}
    fn set_yendor_doom_enabled(&mut self, _enabled: bool) {}
    fn set_bones_enabled(&mut self, _enabled: bool) {}
    fn set_player_class(&mut self, _class: PlayerClass) {}

    fn set_active_slot(&mut self, _slot: &str) {}
    fn set_autosave_every_turns(&mut self, _turns: u32) {}
    fn set_save_backups(&mut self, _count: u32) {}
    fn set_auto_mortem_enabled(&mut self, _enabled: bool) {}
}

/// One recorded call on a [`RecordingSimulation`].
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    NewGame(u32),
    Action(ActionId),
    Update(f32),
    CommandText(String),
    CommandBackspace,
    CommandAutocomplete,
    HistoryText(String),
    HistoryBackspace,
    HistoryToggleSearch,
    HistoryClearSearch,
    AutoTravel(Vec2i),
    BeginLook(Vec2i),
    TargetCursor(Vec2i),
    LookCursor(Vec2i),
    AutoPickup(AutoPickupMode),
    AutoStepDelay(i32),
    AutoExploreSearch(bool),
    Identify(bool),
    Hunger(bool),
    Encumbrance(bool),
    Lighting(bool),
    YendorDoom(bool),
    Bones(bool),
    Class(PlayerClass),
    ActiveSlot(String),
    AutosaveEvery(u32),
    SaveBackups(u32),
    AutoMortem(bool),
}

/// Records every call and completes turns on a simple script.
///
/// Each `handle_action` queues `turns_per_action` turns. The next
/// `update` completes all queued turns and reports
/// [`expected_hash`]`(salt, turn)` once, for the final turn only, so a
/// batch larger than one skips turns. UI mode flags are plain fields so
/// tests can set focus directly.
#[derive(Default)]
pub struct RecordingSimulation {
    pub calls: Vec<Call>,
    pub salt: u64,
    pub turn: u32,
    pub turns_per_action: u32,
    pub command_open: bool,
    pub history_open: bool,
    pub history_search: bool,
    pub targeting: bool,
    pub looking: bool,
    pending: u32,
    hook: Option<Box<dyn TurnObserver>>,
}

impl RecordingSimulation {
    pub fn new(salt: u64) -> Self {
        Self {
            salt,
            turns_per_action: 1,
            ..Self::default()
        }
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Calls other than `Update`, in order.
    pub fn non_update_calls(&self) -> Vec<Call> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, Call::Update(_)))
            .cloned()
            .collect()
    }

    /// Number of `update` calls.
    pub fn update_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Update(_)))
            .count()
    }
}

impl Simulation for RecordingSimulation {
    fn new_game(&mut self, seed: u32) {
        self.turn = 0;
        self.pending = 0;
        self.calls.push(Call::NewGame(seed));
    }

    fn handle_action(&mut self, action: ActionId) {
        self.pending += self.turns_per_action;
        self.calls.push(Call::Action(action));
    }

    fn update(&mut self, dt: f32) {
        self.calls.push(Call::Update(dt));
        if self.pending == 0 {
            return;
        }
        self.turn += self.pending;
        self.pending = 0;
        let (turn, hash) = (self.turn, expected_hash(self.salt, self.turn));
        if let Some(hook) = self.hook.as_mut() {
            hook.on_turn(turn, hash);
        }
    }

    fn turns(&self) -> u32 {
        self.turn
    }

    fn determinism_hash(&self) -> u64 {
        expected_hash(self.salt, self.turn)
    }

    fn set_turn_hook(&mut self, hook: Box<dyn TurnObserver>) {
        self.hook = Some(hook);
    }

    fn clear_turn_hook(&mut self) {
        self.hook = None;
    }

    fn is_command_open(&self) -> bool {
        self.command_open
    }
    fn is_message_history_open(&self) -> bool {
        self.history_open
    }
    fn is_message_history_search_mode(&self) -> bool {
        self.history_search
    }
    fn is_targeting(&self) -> bool {
        self.targeting
    }
    fn is_looking(&self) -> bool {
        self.looking
    }

    fn command_text_input(&mut self, text: &str) {
        self.calls.push(Call::CommandText(text.to_string()));
    }
    fn command_backspace(&mut self) {
        self.calls.push(Call::CommandBackspace);
    }
    fn command_autocomplete(&mut self) {
        self.calls.push(Call::CommandAutocomplete);
    }
    fn message_history_text_input(&mut self, text: &str) {
        self.calls.push(Call::HistoryText(text.to_string()));
    }
    fn message_history_backspace(&mut self) {
        self.calls.push(Call::HistoryBackspace);
    }
    fn message_history_toggle_search_mode(&mut self) {
        self.calls.push(Call::HistoryToggleSearch);
    }
    fn message_history_clear_search(&mut self) {
        self.calls.push(Call::HistoryClearSearch);
    }
    fn request_auto_travel(&mut self, pos: Vec2i) {
        self.calls.push(Call::AutoTravel(pos));
    }
    fn begin_look_at(&mut self, pos: Vec2i) {
        self.calls.push(Call::BeginLook(pos));
    }
    fn set_target_cursor(&mut self, pos: Vec2i) {
        self.calls.push(Call::TargetCursor(pos));
    }
    fn set_look_cursor(&mut self, pos: Vec2i) {
        self.calls.push(Call::LookCursor(pos));
    }

    fn set_auto_pickup_mode(&mut self, mode: AutoPickupMode) {
        self.calls.push(Call::AutoPickup(mode));
    }
    fn set_auto_step_delay_ms(&mut self, ms: i32) {
        self.calls.push(Call::AutoStepDelay(ms));
    }
    fn set_auto_explore_search_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::AutoExploreSearch(enabled));
    }
    fn set_identification_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::Identify(enabled));
    }
    fn set_hunger_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::Hunger(enabled));
    }
    fn set_encumbrance_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::Encumbrance(enabled));
    }
    fn set_lighting_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::Lighting(enabled));
    }
    fn set_yendor_doom_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::YendorDoom(enabled));
    }
    fn set_bones_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::Bones(enabled));
    }
    fn set_player_class(&mut self, class: PlayerClass) {
        self.calls.push(Call::Class(class));
    }

    fn set_active_slot(&mut self, slot: &str) {
        self.calls.push(Call::ActiveSlot(slot.to_string()));
    }
    fn set_autosave_every_turns(&mut self, turns: u32) {
        self.calls.push(Call::AutosaveEvery(turns));
    }
    fn set_save_backups(&mut self, count: u32) {
        self.calls.push(Call::SaveBackups(count));
    }
    fn set_auto_mortem_enabled(&mut self, enabled: bool) {
        self.calls.push(Call::AutoMortem(enabled));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TurnLog;
    use std::rc::Rc;

    #[test]
    fn frozen_never_advances() {
        let mut sim = FrozenSimulation::new(3, 0xAB);
        sim.handle_action(ActionId(1));
        sim.update(0.016);
        sim.update(0.016);
        assert_eq!(sim.turns(), 3);
        assert_eq!(sim.updates, 2);
    }

    #[test]
    fn recording_reports_batched_turns() {
        let mut sim = RecordingSimulation::new(7);
        let log = TurnLog::shared();
        sim.set_turn_hook(Box::new(Rc::clone(&log)));
        sim.handle_action(ActionId(4));
        sim.update(0.016);
        sim.turns_per_action = 3;
        sim.handle_action(ActionId(4));
        sim.update(0.016);
        assert_eq!(
            log.borrow().entries(),
            &[(1, expected_hash(7, 1)), (4, expected_hash(7, 4))]
        );
        assert_eq!(sim.update_count(), 2);
    }
}
