//! Climate coordinator: the behavioural core.
//!
//! [`ClimateCoordinator`] owns the published [`ClimateUiState`], turns UI
//! intents into store operations and runs every time-boxed derived state
//! (gesture session, fan boost, highlights, status line) off a single
//! [`TimerTable`].  All I/O flows through the injected ports.
//!
//! ```text
//!  intents ──▶ ┌──────────────────────────────┐ ──▶ StateHandle ──▶ UI
//!              │      ClimateCoordinator      │
//!  tick()  ──▶ │ session · timers · snapshot  │ ──▶ FeedbackPort
//!              └──────────────┬───────────────┘
//!                             ▼
//!                        ClimateStore
//! ```
//!
//! Every intent and every timer expiry replaces the snapshot exactly once.
//! After the initial refresh in [`start`](ClimateCoordinator::start) the
//! coordinator does not follow hardware-driven changes; the store keeps
//! absorbing them internally and the next full resync picks them up.

use log::{debug, info};

use crate::config::ClimateConfig;
use crate::model::{
    BodyZone, ClimateUiState, FanDirection, StatusMessage, StatusTone, TemperatureDirection,
    UiVariant, ZoneAction, ZoneMap, ZoneSet,
};
use crate::timers::{TimerId, TimerTable};

use super::commands::ClimateCommand;
use super::ports::{ClimateStore, Clock, FeedbackPort};
use super::publish::StateHandle;

/// Multi-zone gesture in progress.
#[derive(Debug, Default)]
struct TouchSession {
    zones: ZoneSet,
    /// `None` until the first touch, and again after the session expires.
    last_touch_ms: Option<u64>,
}

impl TouchSession {
    fn within_window(&self, now_ms: u64, window_ms: u64) -> bool {
        self.last_touch_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < window_ms)
    }

    fn clear(&mut self) {
        self.zones.clear();
        self.last_touch_ms = None;
    }
}

// ───────────────────────────────────────────────────────────────
// ClimateCoordinator
// ───────────────────────────────────────────────────────────────

/// Single writer of the climate snapshot.
pub struct ClimateCoordinator<S: ClimateStore, C: Clock, F: FeedbackPort> {
    store: S,
    clock: C,
    feedback: F,
    config: ClimateConfig,
    state: ClimateUiState,
    handle: StateHandle,
    timers: TimerTable,
    session: TouchSession,
}

impl<S: ClimateStore, C: Clock, F: FeedbackPort> ClimateCoordinator<S, C, F> {
    /// Seed the snapshot synchronously from `store`.
    ///
    /// Does **not** connect the store; call [`start`](Self::start) next.
    pub fn new(store: S, clock: C, feedback: F, config: ClimateConfig) -> Self {
        let state = ClimateUiState {
            variant: UiVariant::default(),
            zone_temperature: ZoneMap::from_fn(|zone| store.zone_temperature(zone)),
            global_temperature: store.global_temperature(),
            min_temperature: store.temperature_range().min,
            max_temperature: store.temperature_range().max,
            zone_actions: ZoneMap::splat(ZoneAction::None),
            fan_speed: store.fan_speed(),
            fan_direction: FanDirection::default(),
            status: None,
        };
        let handle = StateHandle::new(state.clone());
        Self {
            store,
            clock,
            feedback,
            config,
            state,
            handle,
            timers: TimerTable::new(),
            session: TouchSession::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Connect the store (no-op for stores without a connection) and
    /// publish one refreshed snapshot.
    pub async fn start(&mut self) {
        self.store.connect().await;
        self.resync_from_store();
        self.publish();
        info!(
            "Climate started: {}\u{00b0}C ({}..{}), fan {}, ready={}",
            self.state.global_temperature,
            self.state.min_temperature,
            self.state.max_temperature,
            self.state.fan_speed,
            self.store.is_ready()
        );
    }

    /// Cooperative pump: absorb queued store notifications, then fire every
    /// due timer, earliest first.  Each expiry publishes once.
    pub fn tick(&mut self) {
        self.store.poll_events();
        let now = self.clock.now_ms();
        for id in self.timers.take_due(now) {
            self.on_timer(id);
            self.publish();
        }
    }

    /// Dispatch an intent.
    pub fn handle_command(&mut self, cmd: ClimateCommand) {
        match cmd {
            ClimateCommand::CycleUiVariant => self.cycle_ui_variant(),
            ClimateCommand::AdjustGlobalTemperature { direction } => {
                self.adjust_global_temperature(direction);
            }
            ClimateCommand::SetTargetTemperature { celsius } => {
                self.set_target_temperature(celsius);
            }
            ClimateCommand::SetFanSpeed { level } => self.set_fan_speed(level),
            ClimateCommand::SetFanDirection { direction } => self.set_fan_direction(direction),
            ClimateCommand::TriggerFanBoost => self.trigger_fan_boost(),
            ClimateCommand::ResetToDefaults => self.reset_to_defaults(),
            ClimateCommand::ZoneTouch { zone, felt_warm } => {
                self.handle_zone_touch(zone, felt_warm);
            }
            ClimateCommand::ToggleWarm { zone } => self.toggle_warm(zone),
            ClimateCommand::ToggleCold { zone } => self.toggle_cold(zone),
        }
    }

    // ── Intents ───────────────────────────────────────────────

    pub fn cycle_ui_variant(&mut self) {
        self.state.variant = self.state.variant.next();
        info!("UI variant -> {:?}", self.state.variant);
        self.publish();
    }

    /// One degree warmer or cooler.  Only the global value is republished.
    pub fn adjust_global_temperature(&mut self, direction: TemperatureDirection) {
        let now = self.clock.now_ms();
        let (verb, tone) = match direction {
            TemperatureDirection::Warmer => {
                self.store.warm();
                ("Warming", StatusTone::Heating)
            }
            TemperatureDirection::Cooler => {
                self.store.cool();
                ("Cooling", StatusTone::Cooling)
            }
        };
        self.state.global_temperature = self.store.global_temperature();
        let text = format!("{} to {}\u{00b0}C", verb, self.state.global_temperature);
        self.post_status(now, text, tone);
        self.publish();
    }

    /// Absolute target.  Only the global value is republished.
    pub fn set_target_temperature(&mut self, celsius: i32) {
        self.store.set_global_temperature(celsius);
        self.state.global_temperature = self.store.global_temperature();
        debug!(
            "Target {} -> {}\u{00b0}C",
            celsius, self.state.global_temperature
        );
        self.publish();
    }

    /// Manual fan level.  Overrides any boost in flight.
    pub fn set_fan_speed(&mut self, level: i32) {
        let level = level.clamp(0, i32::from(self.config.max_fan_speed)) as u8;
        if self.timers.cancel(TimerId::FanBoost) {
            debug!("Fan boost overridden by manual level {}", level);
        }
        self.store.set_fan_speed(level);
        self.state.fan_speed = self.store.fan_speed();
        self.publish();
    }

    /// Choosing a direction while the fan is off turns it on at level 1.
    pub fn set_fan_direction(&mut self, direction: FanDirection) {
        if self.store.fan_speed() == 0 {
            self.store.set_fan_speed(1);
        }
        self.store.set_fan_direction(direction);
        self.state.fan_direction = direction;
        self.state.fan_speed = self.store.fan_speed();
        self.publish();
    }

    pub fn trigger_fan_boost(&mut self) {
        let now = self.clock.now_ms();
        self.timers.cancel(TimerId::FanBoost);
        self.store.set_fan_speed(self.config.max_fan_speed);
        self.timers
            .schedule(TimerId::FanBoost, now + self.config.fan_boost_ms);
        self.state.fan_speed = self.store.fan_speed();
        info!(
            "Fan boost: level {} for {}ms",
            self.config.max_fan_speed, self.config.fan_boost_ms
        );
        self.publish();
    }

    /// Cancel everything pending, restore baseline and cruising fan, then
    /// resync the whole snapshot from the store.
    pub fn reset_to_defaults(&mut self) {
        let now = self.clock.now_ms();
        self.timers.cancel_all();
        self.session.clear();
        self.state.zone_actions.fill(ZoneAction::None);

        self.store
            .set_global_temperature(self.config.baseline_temperature_c);
        self.store.set_fan_speed(self.config.cruise_fan_speed);
        self.resync_from_store();

        self.feedback.play_feedback();
        let text = format!("Reset to {}\u{00b0}C", self.state.global_temperature);
        self.post_status(now, text, StatusTone::Neutral);
        info!(
            "Reset: {}\u{00b0}C, fan {}",
            self.state.global_temperature, self.state.fan_speed
        );
        self.publish();
    }

    /// Mannequin gesture.  Touches within the debounce window of the
    /// previous one accumulate into a single session.
    ///
    /// A zone that feels warm asks for cooling and is highlighted with
    /// [`ZoneAction::ColdActive`]; a cold zone the other way round.
    pub fn handle_zone_touch(&mut self, zone: BodyZone, felt_warm: bool) {
        let now = self.clock.now_ms();
        let window = self.config.debounce_window_ms;

        if self.session.within_window(now, window) {
            self.session.zones.insert(zone);
        } else {
            self.session.zones.clear();
            self.session.zones.insert(zone);
        }

        let direction = if self.session.zones.len() > 1 {
            FanDirection::FrontalFeet
        } else {
            zone.fan_direction()
        };
        let (target, action, tone) = if felt_warm {
            (
                self.config.cooling_target_c(),
                ZoneAction::ColdActive,
                StatusTone::Cooling,
            )
        } else {
            (
                self.config.heating_target_c(),
                ZoneAction::WarmActive,
                StatusTone::Heating,
            )
        };

        // The session owns the fan and the highlights from here on.
        self.timers.cancel(TimerId::FanBoost);
        self.store.set_fan_direction(direction);
        self.store.set_global_temperature(target);
        self.store.set_fan_speed(self.config.max_fan_speed);
        self.timers
            .schedule(TimerId::DebounceSession, now + window);

        for z in BodyZone::ALL {
            self.timers.cancel(TimerId::Highlight(z));
            self.state.zone_actions[z] = if self.session.zones.contains(z) {
                action
            } else {
                ZoneAction::None
            };
        }
        self.session.last_touch_ms = Some(now);

        self.state.fan_direction = direction;
        self.state.fan_speed = self.store.fan_speed();
        self.refresh_temperatures();

        debug!(
            "Zone touch {:?} (warm={}): {} zone(s), {:?}, target {}\u{00b0}C",
            zone,
            felt_warm,
            self.session.zones.len(),
            direction,
            target
        );
        self.feedback.play_feedback();
        let text = format!(
            "{} {}",
            if felt_warm { "Cooling" } else { "Warming" },
            self.session_labels()
        );
        self.post_status(now, text, tone);
        self.publish();
    }

    /// Per-zone warm button: one degree warmer plus a timed highlight.
    pub fn toggle_warm(&mut self, zone: BodyZone) {
        self.store.warm();
        self.highlight_zone(zone, ZoneAction::WarmActive);
    }

    /// Per-zone cold button: one degree cooler plus a timed highlight.
    pub fn toggle_cold(&mut self, zone: BodyZone) {
        self.store.cool();
        self.highlight_zone(zone, ZoneAction::ColdActive);
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Current snapshot (identical to the last published one).
    pub fn snapshot(&self) -> &ClimateUiState {
        &self.state
    }

    /// Cloneable observer handle for UI consumers.
    pub fn state_handle(&self) -> StateHandle {
        self.handle.clone()
    }

    /// Earliest pending timer deadline, for callers that sleep between ticks.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn is_timer_pending(&self, id: TimerId) -> bool {
        self.timers.is_pending(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Internal ──────────────────────────────────────────────

    fn on_timer(&mut self, id: TimerId) {
        match id {
            TimerId::DebounceSession => {
                self.store.set_fan_speed(self.config.cruise_fan_speed);
                self.state.fan_speed = self.store.fan_speed();
                self.state.zone_actions.fill(ZoneAction::None);
                self.session.clear();
                debug!("Touch session expired, fan -> {}", self.state.fan_speed);
            }
            TimerId::FanBoost => {
                self.store.set_fan_speed(self.config.cruise_fan_speed);
                self.state.fan_speed = self.store.fan_speed();
                info!("Fan boost ended, fan -> {}", self.state.fan_speed);
            }
            TimerId::Status => {
                self.state.status = None;
            }
            TimerId::Highlight(zone) => {
                self.state.zone_actions[zone] = ZoneAction::None;
                debug!("Highlight on {} cleared", zone.label());
            }
        }
    }

    fn highlight_zone(&mut self, zone: BodyZone, action: ZoneAction) {
        let now = self.clock.now_ms();
        self.state.zone_actions[zone] = action;
        self.timers.schedule(
            TimerId::Highlight(zone),
            now + self.config.highlight_timeout_ms,
        );
        self.refresh_temperatures();

        self.feedback.play_feedback();
        let (verb, tone) = match action {
            ZoneAction::ColdActive => ("Cooling", StatusTone::Cooling),
            _ => ("Warming", StatusTone::Heating),
        };
        let text = format!(
            "{} {} to {}\u{00b0}C",
            verb,
            zone.label(),
            self.state.global_temperature
        );
        self.post_status(now, text, tone);
        self.publish();
    }

    /// Replace the status line and restart its expiry.
    fn post_status(&mut self, now_ms: u64, text: String, tone: StatusTone) {
        self.state.status = Some(StatusMessage { text, tone });
        self.timers
            .schedule(TimerId::Status, now_ms + self.config.status_timeout_ms);
    }

    /// "head + feet" for the zones of the current session.
    fn session_labels(&self) -> String {
        self.session
            .zones
            .iter()
            .map(BodyZone::label)
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn refresh_temperatures(&mut self) {
        self.state.zone_temperature = ZoneMap::from_fn(|zone| self.store.zone_temperature(zone));
        self.state.global_temperature = self.store.global_temperature();
    }

    /// Pull every store-owned field into the snapshot.
    fn resync_from_store(&mut self) {
        self.refresh_temperatures();
        let range = self.store.temperature_range();
        self.state.min_temperature = range.min;
        self.state.max_temperature = range.max;
        self.state.fan_speed = self.store.fan_speed();
    }

    fn publish(&mut self) {
        self.handle.publish(self.state.clone());
    }
}
