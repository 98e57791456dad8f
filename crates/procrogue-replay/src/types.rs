//! Data types for replay recording and playback.

use procrogue_core::{ActionId, AutoPickupMode, Vec2i};

use crate::FORMAT_VERSION;

/// Run configuration captured once, when recording starts.
///
/// Every setting that can make two runs with the same seed branch
/// differently lives here. Adding a new determinism-affecting setting
/// means extending this struct and the header codec together.
///
/// # Examples
///
/// ```
/// use procrogue_replay::ReplayMeta;
///
/// let meta = ReplayMeta {
///     seed: 42,
///     player_class_id: "wizard".into(),
///     ..ReplayMeta::default()
/// };
///
/// assert_eq!(meta.format_version, 1);
/// assert!(meta.identify_items);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayMeta {
    /// Header format version (`@procrogue_replay`).
    pub format_version: i32,
    /// Version of the game that recorded the file. Informational only.
    pub game_version: String,
    /// Dungeon seed passed to `new_game`.
    pub seed: u32,
    /// Starting class token; empty means the engine default.
    pub player_class_id: String,

    /// Auto-pickup mode (`@auto_pickup`, 0..=3).
    pub auto_pickup: AutoPickupMode,
    /// Delay between auto-travel/explore steps.
    pub auto_step_delay_ms: i32,
    /// Whether auto-explore searches dead ends.
    pub auto_explore_search: bool,
    /// Whether unidentified items exist at all.
    pub identify_items: bool,
    #[allow(missing_docs)]
    pub hunger_enabled: bool,
    #[allow(missing_docs)]
    pub encumbrance_enabled: bool,
    #[allow(missing_docs)]
    pub lighting_enabled: bool,
    /// Endgame doom escalation after the Amulet is taken.
    pub yendor_doom_enabled: bool,
    /// Whether bones (legacy corpse) levels may appear.
    pub bones_enabled: bool,
}

impl Default for ReplayMeta {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            game_version: String::new(),
            seed: 0,
            player_class_id: String::new(),
            auto_pickup: AutoPickupMode::Off,
            auto_step_delay_ms: 45,
            auto_explore_search: false,
            identify_items: true,
            hunger_enabled: false,
            encumbrance_enabled: false,
            lighting_enabled: false,
            yendor_doom_enabled: true,
            bones_enabled: true,
        }
    }
}

/// Payload of a recorded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// A discrete game action.
    Action(ActionId),
    /// A determinism checkpoint. Never dispatched as input; only matched
    /// against the hashes the simulation reports through its turn hook.
    StateHash {
        /// Turn the hash was taken at.
        turn: u32,
        /// The simulation's determinism hash at that turn.
        hash: u64,
    },
    /// Text typed into whichever text field was focused.
    TextInput(String),
    /// Backspace in the command prompt.
    CommandBackspace,
    /// Tab-completion in the command prompt.
    CommandAutocomplete,
    /// Backspace in the message history search.
    MessageHistoryBackspace,
    /// Toggle message history search mode.
    MessageHistoryToggleSearch,
    /// Clear the message history search.
    MessageHistoryClearSearch,
    /// Auto-travel request to a map position.
    AutoTravel(Vec2i),
    /// Look mode entered at a map position.
    BeginLook(Vec2i),
    /// Targeting cursor moved.
    TargetCursor(Vec2i),
    /// Look cursor moved.
    LookCursor(Vec2i),
}

impl EventKind {
    /// Line-format mnemonic for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Action(_) => "A",
            Self::StateHash { .. } => "H",
            Self::TextInput(_) => "TI",
            Self::CommandBackspace => "CB",
            Self::CommandAutocomplete => "CA",
            Self::MessageHistoryBackspace => "HB",
            Self::MessageHistoryToggleSearch => "HS",
            Self::MessageHistoryClearSearch => "HC",
            Self::AutoTravel(_) => "TR",
            Self::BeginLook(_) => "BL",
            Self::TargetCursor(_) => "TC",
            Self::LookCursor(_) => "LC",
        }
    }

    /// Whether this event is simulation input (everything but checkpoints).
    pub fn is_input(&self) -> bool {
        !matches!(self, Self::StateHash { .. })
    }
}

/// A single timestamped entry in a replay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayEvent {
    /// Milliseconds since recording started. Non-decreasing in
    /// well-formed files.
    pub t_ms: u32,
    /// What happened.
    pub kind: EventKind,
}

impl ReplayEvent {
    /// Construct an event.
    pub fn new(t_ms: u32, kind: EventKind) -> Self {
        Self { t_ms, kind }
    }
}

/// A fully loaded replay: header metadata plus events in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayFile {
    /// Header metadata.
    pub meta: ReplayMeta,
    /// Events, in the order they appear in the file.
    pub events: Vec<ReplayEvent>,
}

impl ReplayFile {
    /// Timestamp of the last event, or 0 for an event-less replay.
    pub fn last_event_ms(&self) -> u32 {
        self.events.last().map_or(0, |ev| ev.t_ms)
    }

    /// Number of input events (checkpoints excluded).
    pub fn input_event_count(&self) -> usize {
        self.events.iter().filter(|ev| ev.kind.is_input()).count()
    }
}
