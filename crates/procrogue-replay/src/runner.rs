//! Headless playback: drive a [`Simulation`] from a [`ReplayFile`] on a
//! fixed time step while verifying hash checkpoints.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use procrogue_core::{PlayerClass, Simulation};

use crate::error::ReplayError;
use crate::types::{EventKind, ReplayEvent, ReplayFile};
use crate::verify::{HashVerifier, VerifierState};

/// Smallest accepted fixed step.
pub const MIN_FRAME_MS: u32 = 1;
/// Largest accepted fixed step; matches the simulation's 0.1 s dt clamp.
pub const MAX_FRAME_MS: u32 = 100;
/// Upper bound on the dt passed to [`Simulation::update`], in seconds.
pub const MAX_DT_SECONDS: f32 = 0.1;
/// Simulated time allowed past the last event when no cap is given.
pub const DEFAULT_SLACK_MS: u32 = 5000;
/// Save slot used during playback so user saves are never touched.
pub const REPLAY_SLOT: &str = "__replay__";

// ── Options and results ─────────────────────────────────────────

/// Playback configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Fixed step in milliseconds. Clamped to
    /// [`MIN_FRAME_MS`]..=[`MAX_FRAME_MS`].
    pub frame_ms: u32,
    /// Whether `StateHash` checkpoints are checked.
    pub verify_hashes: bool,
    /// Simulated-time cap; `0` derives one from the replay.
    pub max_sim_ms: u32,
    /// Frame cap; `0` derives one from the time cap.
    pub max_frames: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            verify_hashes: true,
            max_sim_ms: 0,
            max_frames: 0,
        }
    }
}

impl RunOptions {
    /// The step actually used.
    pub fn effective_frame_ms(&self) -> u32 {
        self.frame_ms.clamp(MIN_FRAME_MS, MAX_FRAME_MS)
    }

    /// The simulated-time cap for `replay`.
    pub fn effective_max_sim_ms(&self, replay: &ReplayFile) -> u32 {
        if self.max_sim_ms > 0 {
            self.max_sim_ms
        } else {
            replay
                .last_event_ms()
                .saturating_add(DEFAULT_SLACK_MS)
                .max(DEFAULT_SLACK_MS)
        }
    }

    /// The frame cap for a given time cap.
    pub fn effective_max_frames(&self, max_sim_ms: u32) -> u32 {
        if self.max_frames > 0 {
            self.max_frames
        } else {
            (max_sim_ms / self.effective_frame_ms()).saturating_add(10)
        }
    }
}

/// Playback progress counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Simulated milliseconds elapsed.
    pub simulated_ms: u32,
    /// `update` calls made.
    pub frames: u32,
    /// Input events dispatched (checkpoints excluded).
    pub events_dispatched: u32,
    /// The simulation's turn count when playback stopped.
    pub turns: u32,
}

/// Stable failure category, as written to reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Playback succeeded.
    None,
    /// A checkpoint did not match.
    HashMismatch,
    /// A time or frame cap tripped.
    SafetyLimit,
    /// Anything else (load errors, trimming errors).
    Unknown,
}

impl FailureKind {
    /// Report token.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::HashMismatch => "hash_mismatch",
            Self::SafetyLimit => "safety_limit",
            Self::Unknown => "unknown",
        }
    }
}

// ── Preparation and dispatch ────────────────────────────────────

/// Configure `sim` from the replay header and start a fresh run.
///
/// Persistence side effects are disabled first so playback can never
/// overwrite a player's saves. Auto-pickup and auto-explore search are
/// applied again after `new_game`, since starting a run resets them.
pub fn prepare_game_for_replay<S: Simulation + ?Sized>(sim: &mut S, replay: &ReplayFile) {
    let meta = &replay.meta;

    sim.set_active_slot(REPLAY_SLOT);
    sim.set_autosave_every_turns(0);
    sim.set_save_backups(0);
    sim.set_auto_mortem_enabled(false);

    sim.set_auto_pickup_mode(meta.auto_pickup);
    sim.set_auto_step_delay_ms(meta.auto_step_delay_ms);
    sim.set_auto_explore_search_enabled(meta.auto_explore_search);
    sim.set_identification_enabled(meta.identify_items);
    sim.set_hunger_enabled(meta.hunger_enabled);
    sim.set_encumbrance_enabled(meta.encumbrance_enabled);
    sim.set_lighting_enabled(meta.lighting_enabled);
    sim.set_yendor_doom_enabled(meta.yendor_doom_enabled);
    sim.set_bones_enabled(meta.bones_enabled);

    let token = meta.player_class_id.as_str();
    if !token.trim().is_empty() {
        if let Err(err) = token.parse::<PlayerClass>() {
            tracing::warn!(%err, "falling back to default class");
        }
    }
    let class = PlayerClass::resolve_or_default(token);
    sim.set_player_class(class);

    sim.new_game(meta.seed);

    sim.set_auto_pickup_mode(meta.auto_pickup);
    sim.set_auto_explore_search_enabled(meta.auto_explore_search);
    tracing::debug!(seed = meta.seed, class = class.id(), "replay game prepared");
}

/// Route one event to `sim`. Returns `true` if it counts as a dispatched
/// input event.
///
/// UI events only reach the simulation while their mode is active: text
/// input goes to whichever text field is focused, prompt edits need the
/// command prompt open, history edits need the history open, and cursor
/// moves need targeting or looking. An event dropped by its mode check
/// still counts as dispatched.
pub fn dispatch_event<S: Simulation + ?Sized>(sim: &mut S, kind: &EventKind) -> bool {
    match kind {
        EventKind::StateHash { .. } => return false,
        EventKind::Action(id) => sim.handle_action(*id),
        EventKind::TextInput(text) => {
            if sim.is_command_open() {
                sim.command_text_input(text);
            } else if sim.is_message_history_open() && sim.is_message_history_search_mode() {
                sim.message_history_text_input(text);
            }
        }
        EventKind::CommandBackspace => {
            if sim.is_command_open() {
                sim.command_backspace();
            }
        }
        EventKind::CommandAutocomplete => {
            if sim.is_command_open() {
                sim.command_autocomplete();
            }
        }
        EventKind::MessageHistoryBackspace => {
            if sim.is_message_history_open() {
                sim.message_history_backspace();
            }
        }
        EventKind::MessageHistoryToggleSearch => {
            if sim.is_message_history_open() {
                sim.message_history_toggle_search_mode();
            }
        }
        EventKind::MessageHistoryClearSearch => {
            if sim.is_message_history_open() {
                sim.message_history_clear_search();
            }
        }
        EventKind::AutoTravel(p) => sim.request_auto_travel(*p),
        EventKind::BeginLook(p) => sim.begin_look_at(*p),
        EventKind::TargetCursor(p) => {
            if sim.is_targeting() {
                sim.set_target_cursor(*p);
            }
        }
        EventKind::LookCursor(p) => {
            if sim.is_looking() {
                sim.set_look_cursor(*p);
            }
        }
    }
    true
}

// ── Playback cursor ─────────────────────────────────────────────

/// Cursor over a replay's events in file order.
///
/// Events are released strictly in file order: an event with a smaller
/// timestamp than its predecessor is released together with it.
#[derive(Debug)]
pub struct Playback<'a> {
    events: &'a [ReplayEvent],
    next: usize,
}

impl<'a> Playback<'a> {
    /// A cursor at the first event.
    pub fn new(events: &'a [ReplayEvent]) -> Self {
        Self { events, next: 0 }
    }

    /// Return the next event if it is due at `elapsed_ms`, advancing.
    pub fn next_due(&mut self, elapsed_ms: u32) -> Option<&'a ReplayEvent> {
        let ev = self.events.get(self.next)?;
        if ev.t_ms > elapsed_ms {
            return None;
        }
        self.next += 1;
        Some(ev)
    }

    /// Whether every event has been released.
    pub fn is_finished(&self) -> bool {
        self.next >= self.events.len()
    }
}

/// Clears the simulation's turn hook when dropped, on every exit path.
struct HookGuard<'a, S: Simulation + ?Sized> {
    sim: &'a mut S,
}

impl<'a, S: Simulation + ?Sized> HookGuard<'a, S> {
    fn install(sim: &'a mut S, verifier: &Rc<RefCell<HashVerifier>>) -> Self {
        sim.set_turn_hook(Box::new(Rc::clone(verifier)));
        Self { sim }
    }
}

impl<S: Simulation + ?Sized> Deref for HookGuard<'_, S> {
    type Target = S;
    fn deref(&self) -> &S {
        self.sim
    }
}

impl<S: Simulation + ?Sized> DerefMut for HookGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.sim
    }
}

impl<S: Simulation + ?Sized> Drop for HookGuard<'_, S> {
    fn drop(&mut self) {
        self.sim.clear_turn_hook();
    }
}

// ── Main loop ───────────────────────────────────────────────────

fn check_desync<S: Simulation + ?Sized>(
    verifier: &RefCell<HashVerifier>,
    sim: &S,
    stats: &RunStats,
) -> Result<(), ReplayError> {
    match verifier.borrow().failure() {
        Some(desync) => Err(ReplayError::HashMismatch {
            desync: *desync,
            stats: RunStats {
                turns: sim.turns(),
                ..*stats
            },
        }),
        None => Ok(()),
    }
}

/// Play `replay` against `sim`, which must already be prepared with
/// [`prepare_game_for_replay`].
///
/// Each iteration dispatches every due event, stops successfully once
/// all events are dispatched and all checkpoints consumed, and otherwise
/// advances one fixed step. Reaching the time or frame cap first is a
/// [`ReplayError::SafetyLimit`].
pub fn run_replay_headless<S: Simulation + ?Sized>(
    sim: &mut S,
    replay: &ReplayFile,
    opts: &RunOptions,
) -> Result<RunStats, ReplayError> {
    let frame_ms = opts.effective_frame_ms();
    let max_sim_ms = opts.effective_max_sim_ms(replay);
    let max_frames = opts.effective_max_frames(max_sim_ms);

    let verifier = Rc::new(RefCell::new(HashVerifier::from_replay(replay)));
    let verifying = opts.verify_hashes && !verifier.borrow().is_empty();

    tracing::debug!(
        events = replay.events.len(),
        inputs = replay.input_event_count(),
        checkpoints = verifier.borrow().remaining(),
        frame_ms,
        max_sim_ms,
        max_frames,
        verifying,
        "starting headless replay"
    );

    let mut stats = RunStats::default();
    let mut playback = Playback::new(&replay.events);

    let mut guard;
    let sim: &mut S = if verifying {
        guard = HookGuard::install(sim, &verifier);
        let turns = guard.turns();
        let hash = guard.determinism_hash();
        verifier.borrow_mut().on_turn_observed(turns, hash);
        &mut *guard
    } else {
        sim.clear_turn_hook();
        sim
    };
    check_desync(&verifier, sim, &stats)?;

    loop {
        while let Some(ev) = playback.next_due(stats.simulated_ms) {
            if dispatch_event(sim, &ev.kind) {
                stats.events_dispatched += 1;
            }
            check_desync(&verifier, sim, &stats)?;
        }

        let hashes_done = !verifying || verifier.borrow().state() == VerifierState::Exhausted;
        if playback.is_finished() && hashes_done {
            break;
        }

        if stats.frames >= max_frames || stats.simulated_ms >= max_sim_ms {
            stats.turns = sim.turns();
            tracing::debug!(?stats, "headless replay hit safety limit");
            return Err(ReplayError::SafetyLimit {
                stats,
                max_sim_ms,
                max_frames,
            });
        }

        let step = frame_ms.min(max_sim_ms - stats.simulated_ms);
        stats.simulated_ms += step;
        let dt = (step as f32 / 1000.0).min(MAX_DT_SECONDS);
        sim.update(dt);
        stats.frames += 1;
        check_desync(&verifier, sim, &stats)?;
    }

    stats.turns = sim.turns();
    tracing::info!(
        turns = stats.turns,
        events = stats.events_dispatched,
        sim_ms = stats.simulated_ms,
        frames = stats.frames,
        "headless replay finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReplayMeta;
    use procrogue_core::ActionId;

    fn replay_with(events: Vec<ReplayEvent>) -> ReplayFile {
        ReplayFile {
            meta: ReplayMeta::default(),
            events,
        }
    }

    #[test]
    fn frame_ms_is_clamped() {
        let mut o = RunOptions::default();
        assert_eq!(o.effective_frame_ms(), 16);
        o.frame_ms = 0;
        assert_eq!(o.effective_frame_ms(), 1);
        o.frame_ms = 1000;
        assert_eq!(o.effective_frame_ms(), 100);
    }

    #[test]
    fn caps_are_derived_from_last_event() {
        let o = RunOptions::default();
        let empty = replay_with(Vec::new());
        assert_eq!(o.effective_max_sim_ms(&empty), 5000);

        let r = replay_with(vec![ReplayEvent::new(
            12_000,
            EventKind::Action(ActionId(1)),
        )]);
        assert_eq!(o.effective_max_sim_ms(&r), 17_000);
        assert_eq!(o.effective_max_frames(17_000), 17_000 / 16 + 10);

        let explicit = RunOptions {
            max_sim_ms: 100,
            max_frames: 3,
            ..o
        };
        assert_eq!(explicit.effective_max_sim_ms(&r), 100);
        assert_eq!(explicit.effective_max_frames(100), 3);
    }

    #[test]
    fn playback_releases_in_file_order() {
        let events = vec![
            ReplayEvent::new(0, EventKind::CommandBackspace),
            ReplayEvent::new(50, EventKind::CommandAutocomplete),
            ReplayEvent::new(10, EventKind::MessageHistoryBackspace),
        ];
        let mut p = Playback::new(&events);
        assert_eq!(p.next_due(0).map(|e| e.t_ms), Some(0));
        // The t=10 event waits behind the t=50 event.
        assert!(p.next_due(20).is_none());
        assert_eq!(p.next_due(50).map(|e| e.t_ms), Some(50));
        assert_eq!(p.next_due(50).map(|e| e.t_ms), Some(10));
        assert!(p.is_finished());
    }

    #[test]
    fn failure_kind_names() {
        assert_eq!(FailureKind::None.name(), "none");
        assert_eq!(FailureKind::HashMismatch.name(), "hash_mismatch");
        assert_eq!(FailureKind::SafetyLimit.name(), "safety_limit");
        assert_eq!(FailureKind::Unknown.name(), "unknown");
    }
}
