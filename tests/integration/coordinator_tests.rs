//! Integration tests for the coordinator over both stores.
//!
//! Time is driven by [`ManualClock`]; timers only fire when the test calls
//! `tick()`, exactly as the cooperative runtime would.

use futures_lite::future::block_on;

use efferest_hvac::app::commands::ClimateCommand;
use efferest_hvac::app::coordinator::ClimateCoordinator;
use efferest_hvac::app::ports::{ClimateStore, PropertyKind, RawValue};
use efferest_hvac::config::ClimateConfig;
use efferest_hvac::model::{BodyZone, FanDirection, StatusTone, TemperatureDirection, ZoneAction};
use efferest_hvac::store::{HardwareClimateStore, InMemoryClimateStore};
use efferest_hvac::timers::TimerId;

use super::mock_bus::{CountingFeedback, FAN_AREA, ManualClock, MockBus};

type MemoryCoordinator = ClimateCoordinator<InMemoryClimateStore, ManualClock, CountingFeedback>;
type HardwareCoordinator =
    ClimateCoordinator<HardwareClimateStore<MockBus>, ManualClock, CountingFeedback>;

fn memory() -> (MemoryCoordinator, ManualClock, CountingFeedback) {
    let clock = ManualClock::default();
    let feedback = CountingFeedback::default();
    let c = ClimateCoordinator::new(
        InMemoryClimateStore::new(),
        clock.clone(),
        feedback.clone(),
        ClimateConfig::default(),
    );
    (c, clock, feedback)
}

fn hardware(bus: MockBus) -> (HardwareCoordinator, ManualClock) {
    let clock = ManualClock::default();
    let mut c = ClimateCoordinator::new(
        HardwareClimateStore::new(bus),
        clock.clone(),
        CountingFeedback::default(),
        ClimateConfig::default(),
    );
    block_on(c.start());
    (c, clock)
}

fn actions(c: &MemoryCoordinator) -> [ZoneAction; 3] {
    BodyZone::ALL.map(|z| c.snapshot().zone_actions[z])
}

// ── Start ─────────────────────────────────────────────────────

#[test]
fn start_refreshes_snapshot_once_from_connected_store() {
    let clock = ManualClock::default();
    let mut c = ClimateCoordinator::new(
        HardwareClimateStore::new(MockBus::integral()),
        clock,
        CountingFeedback::default(),
        ClimateConfig::default(),
    );
    let handle = c.state_handle();
    // Seeded before connect: store defaults.
    assert_eq!(c.snapshot().global_temperature, 22);
    assert_eq!(c.snapshot().max_temperature, 28);

    block_on(c.start());

    assert_eq!(handle.version(), 1);
    let s = handle.snapshot();
    assert_eq!(s.global_temperature, 20);
    assert_eq!((s.min_temperature, s.max_temperature), (17, 30));
    assert_eq!(s.fan_speed, 1);
}

#[test]
fn start_on_memory_store_still_publishes() {
    let (mut c, _, _) = memory();
    block_on(c.start());
    assert_eq!(c.state_handle().version(), 1);
    assert_eq!(c.snapshot().global_temperature, 22);
}

#[test]
fn hardware_changes_after_start_are_not_republished() {
    let (mut c, _) = hardware(MockBus::fractional());
    let version = c.state_handle().version();

    c.store()
        .bus()
        .notify(PropertyKind::Temperature, RawValue::Float(26.0));
    c.tick();

    assert_eq!(c.store().global_temperature(), 26);
    assert_eq!(c.snapshot().global_temperature, 21);
    assert_eq!(c.state_handle().version(), version);
}

// ── Zone-touch debounce ───────────────────────────────────────

#[test]
fn two_warm_touches_within_window_combine() {
    let (mut c, clock, feedback) = memory();

    c.handle_zone_touch(BodyZone::Upper, true);
    clock.advance(2_000);
    c.handle_zone_touch(BodyZone::Lower, true);

    let s = c.snapshot();
    assert_eq!(s.fan_direction, FanDirection::FrontalFeet);
    assert_eq!(
        actions(&c),
        [ZoneAction::ColdActive, ZoneAction::None, ZoneAction::ColdActive]
    );
    assert_eq!(s.global_temperature, 18);
    assert_eq!(s.fan_speed, 5);
    assert_eq!(feedback.count(), 2);
    assert_eq!(s.status.as_ref().map(|m| m.tone), Some(StatusTone::Cooling));
}

#[test]
fn session_expiry_restores_cruise_and_clears_highlights() {
    let (mut c, clock, _) = memory();
    c.handle_zone_touch(BodyZone::Upper, true);
    clock.advance(2_000);
    c.handle_zone_touch(BodyZone::Lower, true);

    // Timer restarted by the second touch: due at 12 s.
    clock.set(11_999);
    c.tick();
    assert_eq!(c.snapshot().fan_speed, 5);

    clock.set(12_000);
    c.tick();
    assert_eq!(c.snapshot().fan_speed, 2);
    assert_eq!(actions(&c), [ZoneAction::None; 3]);
    assert!(!c.is_timer_pending(TimerId::DebounceSession));
}

#[test]
fn touch_after_expiry_starts_fresh_single_zone_session() {
    let (mut c, clock, _) = memory();
    c.handle_zone_touch(BodyZone::Upper, true);
    clock.advance(2_000);
    c.handle_zone_touch(BodyZone::Lower, true);
    clock.advance(10_000);
    c.tick();

    clock.advance(500);
    c.handle_zone_touch(BodyZone::Middle, false);

    let s = c.snapshot();
    assert_eq!(
        actions(&c),
        [ZoneAction::None, ZoneAction::WarmActive, ZoneAction::None]
    );
    assert_eq!(s.fan_direction, FanDirection::FrontalFeet);
    assert_eq!(s.global_temperature, 24);
}

#[test]
fn late_touch_without_tick_still_starts_fresh_session() {
    let (mut c, clock, _) = memory();
    c.handle_zone_touch(BodyZone::Middle, true);
    clock.advance(10_000);
    c.handle_zone_touch(BodyZone::Lower, true);

    assert_eq!(c.snapshot().fan_direction, FanDirection::Feet);
    assert_eq!(
        actions(&c),
        [ZoneAction::None, ZoneAction::None, ZoneAction::ColdActive]
    );
}

#[test]
fn single_zone_touch_uses_zone_direction() {
    for (zone, direction) in [
        (BodyZone::Upper, FanDirection::Frontal),
        (BodyZone::Middle, FanDirection::FrontalFeet),
        (BodyZone::Lower, FanDirection::Feet),
    ] {
        let (mut c, _, _) = memory();
        c.handle_zone_touch(zone, false);
        assert_eq!(c.snapshot().fan_direction, direction);
    }
}

#[test]
fn latest_polarity_recolours_the_whole_session() {
    let (mut c, clock, _) = memory();
    c.handle_zone_touch(BodyZone::Upper, true);
    clock.advance(1_000);
    c.handle_zone_touch(BodyZone::Middle, false);

    assert_eq!(
        actions(&c),
        [ZoneAction::WarmActive, ZoneAction::WarmActive, ZoneAction::None]
    );
    assert_eq!(c.snapshot().global_temperature, 24);
}

#[test]
fn zone_touch_reaches_hardware_direction_and_fan() {
    let (mut c, _) = hardware(MockBus::fractional());
    c.handle_zone_touch(BodyZone::Lower, true);

    let bus = c.store().bus();
    assert_eq!(
        bus.last_write(PropertyKind::FanDirection),
        Some(RawValue::Int(0x2))
    );
    assert_eq!(
        bus.last_write(PropertyKind::Temperature),
        Some(RawValue::Float(18.0))
    );
    assert_eq!(bus.last_write(PropertyKind::FanSpeed), Some(RawValue::Int(5)));
}

// ── Fan boost ─────────────────────────────────────────────────

#[test]
fn boost_reverts_to_cruise_after_window() {
    let (mut c, clock, _) = memory();
    c.trigger_fan_boost();
    assert_eq!(c.snapshot().fan_speed, 5);

    clock.advance(9_999);
    c.tick();
    assert_eq!(c.snapshot().fan_speed, 5);

    clock.advance(1);
    c.tick();
    assert_eq!(c.snapshot().fan_speed, 2);
}

#[test]
fn manual_fan_speed_cancels_boost() {
    let (mut c, clock, _) = memory();
    c.trigger_fan_boost();
    clock.advance(3_000);
    c.set_fan_speed(3);
    assert!(!c.is_timer_pending(TimerId::FanBoost));

    clock.advance(60_000);
    c.tick();
    assert_eq!(c.snapshot().fan_speed, 3);
}

#[test]
fn retriggered_boost_restarts_its_timer() {
    let (mut c, clock, _) = memory();
    c.trigger_fan_boost();
    clock.set(6_000);
    c.trigger_fan_boost();

    clock.set(10_000);
    c.tick();
    assert_eq!(c.snapshot().fan_speed, 5);

    clock.set(16_000);
    c.tick();
    assert_eq!(c.snapshot().fan_speed, 2);
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn reset_is_deterministic_and_cancels_pending_timers() {
    let (mut c, clock, feedback) = memory();
    c.handle_zone_touch(BodyZone::Upper, false);
    c.trigger_fan_boost();
    c.toggle_cold(BodyZone::Lower);
    c.set_target_temperature(27);

    c.reset_to_defaults();

    let s = c.snapshot();
    assert_eq!(s.global_temperature, 21);
    assert_eq!(s.fan_speed, 2);
    assert_eq!(actions(&c), [ZoneAction::None; 3]);
    for zone in BodyZone::ALL {
        assert_eq!(s.zone_temperature[zone], 21);
    }
    assert!(!c.is_timer_pending(TimerId::FanBoost));
    assert!(!c.is_timer_pending(TimerId::DebounceSession));
    assert!(!c.is_timer_pending(TimerId::Highlight(BodyZone::Lower)));
    assert_eq!(feedback.count(), 3);

    // Nothing late may overwrite the reset values.
    clock.advance(60_000);
    c.tick();
    assert_eq!(c.snapshot().global_temperature, 21);
    assert_eq!(c.snapshot().fan_speed, 2);
    assert!(c.snapshot().status.is_none());
}

#[test]
fn reset_on_hardware_writes_baseline() {
    let (mut c, _) = hardware(MockBus::fractional());
    c.set_fan_speed(5);
    c.reset_to_defaults();
    let bus = c.store().bus();
    assert_eq!(
        bus.last_write(PropertyKind::Temperature),
        Some(RawValue::Float(21.0))
    );
    assert_eq!(bus.last_write(PropertyKind::FanSpeed), Some(RawValue::Int(2)));
}

#[test]
fn touch_after_reset_starts_new_session() {
    let (mut c, clock, _) = memory();
    c.handle_zone_touch(BodyZone::Upper, true);
    c.reset_to_defaults();
    clock.advance(1_000);
    c.handle_zone_touch(BodyZone::Lower, true);
    assert_eq!(
        actions(&c),
        [ZoneAction::None, ZoneAction::None, ZoneAction::ColdActive]
    );
}

// ── Other intents ─────────────────────────────────────────────

#[test]
fn variant_cycles_and_wraps() {
    let (mut c, _, _) = memory();
    let start = c.snapshot().variant;
    for _ in 0..3 {
        c.cycle_ui_variant();
    }
    assert_eq!(c.snapshot().variant, start);
}

#[test]
fn fan_direction_while_off_on_hardware() {
    let mut bus = MockBus::fractional();
    bus.fan_speed = Ok(RawValue::Int(0));
    let (mut c, _) = hardware(bus);

    c.set_fan_direction(FanDirection::FeetWindshield);

    assert_eq!(c.snapshot().fan_speed, 1);
    assert_eq!(c.snapshot().fan_direction, FanDirection::FeetWindshield);
    assert_eq!(
        c.store().bus().writes(),
        vec![
            (PropertyKind::FanSpeed, FAN_AREA, RawValue::Int(1)),
            (PropertyKind::FanDirection, FAN_AREA, RawValue::Int(0x6)),
        ]
    );
}

#[test]
fn target_temperature_is_snapped_by_the_store() {
    let (mut c, _) = hardware(MockBus::fractional());
    c.set_target_temperature(35);
    assert_eq!(c.snapshot().global_temperature, 28);
    c.set_target_temperature(-5);
    assert_eq!(c.snapshot().global_temperature, 16);
}

#[test]
fn commands_dispatch_to_intents() {
    let (mut c, clock, _) = memory();
    c.handle_command(ClimateCommand::AdjustGlobalTemperature {
        direction: TemperatureDirection::Cooler,
    });
    assert_eq!(c.snapshot().global_temperature, 21);

    c.handle_command(ClimateCommand::ToggleWarm {
        zone: BodyZone::Upper,
    });
    assert_eq!(c.snapshot().zone_actions[BodyZone::Upper], ZoneAction::WarmActive);

    c.handle_command(ClimateCommand::SetFanSpeed { level: 9 });
    assert_eq!(c.snapshot().fan_speed, 5);

    c.handle_command(ClimateCommand::ZoneTouch {
        zone: BodyZone::Lower,
        felt_warm: true,
    });
    assert_eq!(c.snapshot().global_temperature, 18);

    clock.advance(10_000);
    c.handle_command(ClimateCommand::ResetToDefaults);
    assert_eq!(c.snapshot().global_temperature, 21);
}

#[test]
fn zone_touch_clears_toggle_highlights_outside_the_session() {
    let (mut c, clock, _) = memory();
    c.toggle_warm(BodyZone::Upper);
    clock.advance(1_000);
    c.handle_zone_touch(BodyZone::Lower, true);
    assert_eq!(
        actions(&c),
        [ZoneAction::None, ZoneAction::None, ZoneAction::ColdActive]
    );
    assert!(!c.is_timer_pending(TimerId::Highlight(BodyZone::Upper)));
}

#[test]
fn observer_sees_latest_version() {
    let (mut c, _, _) = memory();
    let handle = c.state_handle();
    let seen = handle.version();
    c.trigger_fan_boost();
    let (version, state) = block_on(handle.changed_since(seen));
    assert_eq!(version, seen + 1);
    assert_eq!(state.fan_speed, 5);
}
