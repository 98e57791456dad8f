//! The simulation interface consumed by replay tooling.

use std::cell::RefCell;
use std::rc::Rc;

use crate::id::{ActionId, Vec2i};
use crate::settings::{AutoPickupMode, PlayerClass};

/// Receives a notification each time the simulation completes a turn.
///
/// Called synchronously from inside [`Simulation::update`] (or wherever
/// the simulation resolves a turn), so implementations must not call
/// back into the simulation.
pub trait TurnObserver {
    /// A turn finished; `turn` is the new turn count and `hash` the
    /// simulation's [`determinism_hash`](Simulation::determinism_hash)
    /// at that point.
    fn on_turn(&mut self, turn: u32, hash: u64);
}

/// Shared observers: the installer keeps one handle and inspects the
/// observer's state between simulation calls.
impl<T: TurnObserver> TurnObserver for Rc<RefCell<T>> {
    fn on_turn(&mut self, turn: u32, hash: u64) {
        self.borrow_mut().on_turn(turn, hash);
    }
}

/// A game simulation that can be driven by recorded input.
///
/// The replay engine only ever touches a simulation through this trait:
/// it configures gameplay settings, starts a seeded run, feeds actions
/// and UI events, and advances time. Everything else (turn processing,
/// dungeon generation, the hash algorithm) is owned by the implementor.
pub trait Simulation {
    // ── Run lifecycle ───────────────────────────────────────────

    /// Start a fresh run from `seed`.
    fn new_game(&mut self, seed: u32);

    /// Feed one discrete action.
    fn handle_action(&mut self, action: ActionId);

    /// Advance simulated time by `dt` seconds.
    fn update(&mut self, dt: f32);

    /// Number of completed turns in the current run.
    fn turns(&self) -> u32;

    /// Digest of all state that must match between recording and playback.
    fn determinism_hash(&self) -> u64;

    /// Install the per-turn hook, replacing any previous one.
    fn set_turn_hook(&mut self, hook: Box<dyn TurnObserver>);

    /// Remove the per-turn hook, if any.
    fn clear_turn_hook(&mut self);

    // ── UI mode queries ─────────────────────────────────────────

    /// Whether the extended-command prompt is open.
    fn is_command_open(&self) -> bool;
    /// Whether the message history view is open.
    fn is_message_history_open(&self) -> bool;
    /// Whether the message history view is accepting search text.
    fn is_message_history_search_mode(&self) -> bool;
    /// Whether a targeting cursor is active.
    fn is_targeting(&self) -> bool;
    /// Whether the look cursor is active.
    fn is_looking(&self) -> bool;

    // ── UI mode mutators ────────────────────────────────────────

    /// Append text to the command prompt.
    fn command_text_input(&mut self, text: &str);
    /// Delete one character from the command prompt.
    fn command_backspace(&mut self);
    /// Autocomplete the command prompt.
    fn command_autocomplete(&mut self);
    /// Append text to the message history search.
    fn message_history_text_input(&mut self, text: &str);
    /// Delete one character from the message history search.
    fn message_history_backspace(&mut self);
    /// Toggle message history search mode.
    fn message_history_toggle_search_mode(&mut self);
    /// Clear the message history search.
    fn message_history_clear_search(&mut self);
    /// Begin auto-travel toward `pos`.
    fn request_auto_travel(&mut self, pos: Vec2i);
    /// Enter look mode with the cursor at `pos`.
    fn begin_look_at(&mut self, pos: Vec2i);
    /// Move the targeting cursor.
    fn set_target_cursor(&mut self, pos: Vec2i);
    /// Move the look cursor.
    fn set_look_cursor(&mut self, pos: Vec2i);

    // ── Gameplay settings ───────────────────────────────────────

    #[allow(missing_docs)]
    fn set_auto_pickup_mode(&mut self, mode: AutoPickupMode);
    #[allow(missing_docs)]
    fn set_auto_step_delay_ms(&mut self, ms: i32);
    #[allow(missing_docs)]
    fn set_auto_explore_search_enabled(&mut self, enabled: bool);
    #[allow(missing_docs)]
    fn set_identification_enabled(&mut self, enabled: bool);
    #[allow(missing_docs)]
    fn set_hunger_enabled(&mut self, enabled: bool);
    #[allow(missing_docs)]
    fn set_encumbrance_enabled(&mut self, enabled: bool);
    #[allow(missing_docs)]
    fn set_lighting_enabled(&mut self, enabled: bool);
    #[allow(missing_docs)]
    fn set_yendor_doom_enabled(&mut self, enabled: bool);
    #[allow(missing_docs)]
    fn set_bones_enabled(&mut self, enabled: bool);
    #[allow(missing_docs)]
    fn set_player_class(&mut self, class: PlayerClass);

    // ── Persistence side effects ────────────────────────────────

    /// Route saves to the named slot.
    fn set_active_slot(&mut self, slot: &str);
    /// Autosave cadence in turns; `0` disables autosave.
    fn set_autosave_every_turns(&mut self, turns: u32);
    /// Number of rotated save backups; `0` disables rotation.
    fn set_save_backups(&mut self, count: u32);
    /// Whether a death writes a mortem file.
    fn set_auto_mortem_enabled(&mut self, enabled: bool);
}
