//! Widget state store
//!
//! Single owner of position, size, visibility, personality, voice flags,
//! preferences and context. Engines receive `&mut WidgetStore` and mutate it
//! only through the setters below. Every setter that actually changes a
//! value records a `StoreChange`, which is delivered to subscribed listeners
//! immediately and queued for the owning widget to drain.

mod model;

pub use model::{
    AnimationSpeed, NetworkStatus, Preferences, SystemLoad, TimeOfDay, UserActivity, VoiceState,
    WidgetContext, WidgetState,
};

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::constants::defaults;
use crate::personality::PersonalityMode;
use crate::types::{Dimensions, Position, ScreenSize};

/// Change notifications emitted by the store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StoreChange {
    State { from: WidgetState, to: WidgetState },
    Position(Position),
    Size(Dimensions),
    Visibility(bool),
    Dragging(bool),
    Personality(PersonalityMode),
    Voice(VoiceState),
    TimeOfDay(TimeOfDay),
    UserActivity(UserActivity),
    SystemLoad(SystemLoad),
    BatteryLevel(Option<f64>),
    NetworkStatus(NetworkStatus),
    Screen(ScreenSize),
    Preferences(Preferences),
    Settings(bool),
    PersonalitySelector(bool),
    QuickActions(bool),
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StoreChange)>;

pub struct WidgetStore {
    state: WidgetState,
    position: Position,
    size: Dimensions,
    is_visible: bool,
    is_dragging: bool,
    current_personality: PersonalityMode,
    voice: VoiceState,
    context: WidgetContext,
    preferences: Preferences,
    show_settings: bool,
    show_personality_selector: bool,
    show_quick_actions: bool,

    pending: Vec<StoreChange>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for WidgetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetStore")
            .field("state", &self.state)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("is_visible", &self.is_visible)
            .field("is_dragging", &self.is_dragging)
            .field("current_personality", &self.current_personality)
            .field("voice", &self.voice)
            .field("context", &self.context)
            .field("preferences", &self.preferences)
            .field("show_settings", &self.show_settings)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new(ScreenSize::default(), Preferences::default())
    }
}

impl WidgetStore {
    /// Fresh store for a widget mounted on `screen`
    /// Starts collapsed near the top-right corner
    pub fn new(screen: ScreenSize, preferences: Preferences) -> Self {
        let state = WidgetState::Collapsed;
        Self {
            state,
            position: Position::new(
                screen.width - defaults::RIGHT_OFFSET,
                defaults::TOP_OFFSET,
            ),
            size: state.size(),
            is_visible: true,
            is_dragging: false,
            current_personality: PersonalityMode::default(),
            voice: VoiceState::default(),
            context: WidgetContext {
                screen,
                ..WidgetContext::default()
            },
            preferences,
            show_settings: false,
            show_personality_selector: false,
            show_quick_actions: false,
            pending: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // === Accessors ===

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn current_personality(&self) -> PersonalityMode {
        self.current_personality
    }

    pub fn voice(&self) -> &VoiceState {
        &self.voice
    }

    pub fn context(&self) -> &WidgetContext {
        &self.context
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn screen(&self) -> ScreenSize {
        self.context.screen
    }

    pub fn show_settings(&self) -> bool {
        self.show_settings
    }

    pub fn show_personality_selector(&self) -> bool {
        self.show_personality_selector
    }

    pub fn show_quick_actions(&self) -> bool {
        self.show_quick_actions
    }

    // === Subscription ===

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was already gone
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drain changes recorded since the last call
    pub fn take_changes(&mut self) -> Vec<StoreChange> {
        std::mem::take(&mut self.pending)
    }

    fn emit(&mut self, change: StoreChange) {
        debug!(change = ?change, "store changed");
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
        self.pending.push(change);
    }

    // === Mutators ===

    pub fn set_state(&mut self, state: WidgetState) {
        if self.state != state {
            let from = self.state;
            self.state = state;
            self.emit(StoreChange::State { from, to: state });
        }
    }

    pub fn set_position(&mut self, position: Position) {
        if self.position != position {
            self.position = position;
            self.emit(StoreChange::Position(position));
        }
    }

    pub fn set_size(&mut self, size: Dimensions) {
        if self.size != size {
            self.size = size;
            self.emit(StoreChange::Size(size));
        }
    }

    pub fn set_visibility(&mut self, visible: bool) {
        if self.is_visible != visible {
            self.is_visible = visible;
            self.emit(StoreChange::Visibility(visible));
        }
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        if self.is_dragging != dragging {
            self.is_dragging = dragging;
            self.emit(StoreChange::Dragging(dragging));
        }
    }

    pub fn switch_personality(&mut self, personality: PersonalityMode) {
        if self.current_personality != personality {
            self.current_personality = personality;
            self.emit(StoreChange::Personality(personality));
        }
    }

    pub fn update_voice_state(&mut self, update: impl FnOnce(&mut VoiceState)) {
        let mut voice = self.voice.clone();
        update(&mut voice);
        if voice != self.voice {
            self.voice = voice.clone();
            self.emit(StoreChange::Voice(voice));
        }
    }

    /// Apply a partial context update; one change is emitted per field that differs
    pub fn update_context(&mut self, update: impl FnOnce(&mut WidgetContext)) {
        let mut next = self.context.clone();
        update(&mut next);
        let prev = std::mem::replace(&mut self.context, next.clone());

        if prev.time_of_day != next.time_of_day {
            self.emit(StoreChange::TimeOfDay(next.time_of_day));
        }
        if prev.user_activity != next.user_activity {
            self.emit(StoreChange::UserActivity(next.user_activity));
        }
        if prev.system_load != next.system_load {
            self.emit(StoreChange::SystemLoad(next.system_load));
        }
        if prev.battery_level != next.battery_level {
            self.emit(StoreChange::BatteryLevel(next.battery_level));
        }
        if prev.network_status != next.network_status {
            self.emit(StoreChange::NetworkStatus(next.network_status));
        }
        if prev.screen != next.screen {
            self.emit(StoreChange::Screen(next.screen));
        }
    }

    pub fn update_preferences(&mut self, update: impl FnOnce(&mut Preferences)) {
        let mut prefs = self.preferences.clone();
        update(&mut prefs);
        if prefs != self.preferences {
            self.preferences = prefs.clone();
            self.emit(StoreChange::Preferences(prefs));
        }
    }

    pub fn toggle_settings(&mut self) {
        self.show_settings = !self.show_settings;
        self.emit(StoreChange::Settings(self.show_settings));
    }

    pub fn toggle_personality_selector(&mut self) {
        self.show_personality_selector = !self.show_personality_selector;
        self.emit(StoreChange::PersonalitySelector(self.show_personality_selector));
    }

    pub fn toggle_quick_actions(&mut self) {
        self.show_quick_actions = !self.show_quick_actions;
        self.emit(StoreChange::QuickActions(self.show_quick_actions));
    }

    /// Drop listeners and pending changes (widget unmount)
    pub fn teardown(&mut self) {
        self.listeners.clear();
        self.pending.clear();
    }
}
