//! Efferest HVAC simulator: composition root.
//!
//! Wires the climate core to the in-process adapters and plays a scripted
//! sequence of UI intents against it, logging every published snapshot.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  futures_lite::block_on                                      │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  edge_executor::LocalExecutor                          │  │
//! │  │                                                        │  │
//! │  │  ┌───────────┐   ┌──────────────┐   ┌──────────────┐   │  │
//! │  │  │ tick loop │   │ script       │   │ observer     │   │  │
//! │  │  │ 100ms ⏱   │   │ intents      │   │ changed_since│   │  │
//! │  │  └─────┬─────┘   └──────┬───────┘   └──────▲───────┘   │  │
//! │  │        └──── Rc<RefCell<ClimateCoordinator>> ──┘        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `efferest-hvac-sim [config.json] [script.json]`
#![deny(unused_must_use)]

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use efferest_hvac::adapters::feedback::LogFeedback;
use efferest_hvac::adapters::sim_bus::SimulatedBus;
use efferest_hvac::adapters::time::MonotonicClock;
use efferest_hvac::app::commands::ClimateCommand;
use efferest_hvac::app::coordinator::ClimateCoordinator;
use efferest_hvac::app::ports::{ClimateStore, PropertyKind, RawValue};
use efferest_hvac::app::publish::StateHandle;
use efferest_hvac::config::ClimateConfig;
use efferest_hvac::model::{BodyZone, ClimateUiState};
use efferest_hvac::store::HardwareClimateStore;

type SimCoordinator =
    ClimateCoordinator<HardwareClimateStore<SimulatedBus>, MonotonicClock, LogFeedback>;
type SharedCoordinator = Rc<RefCell<SimCoordinator>>;

/// Timer pump period.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// One scripted intent, issued `after_ms` after the previous one.
#[derive(Debug, Deserialize)]
struct ScriptStep {
    #[serde(default)]
    after_ms: u64,
    command: ClimateCommand,
}

const DEFAULT_SCRIPT: &str = r#"[
    { "command": { "intent": "cycle_ui_variant" } },
    { "after_ms": 500,  "command": { "intent": "zone_touch", "zone": "Upper", "felt_warm": true } },
    { "after_ms": 2000, "command": { "intent": "zone_touch", "zone": "Lower", "felt_warm": true } },
    { "after_ms": 1000, "command": { "intent": "toggle_warm", "zone": "Middle" } },
    { "after_ms": 500,  "command": { "intent": "trigger_fan_boost" } },
    { "after_ms": 1000, "command": { "intent": "set_fan_speed", "level": 3 } },
    { "after_ms": 500,  "command": { "intent": "adjust_global_temperature", "direction": "Warmer" } },
    { "after_ms": 1000, "command": { "intent": "set_fan_direction", "direction": "FeetWindshield" } },
    { "after_ms": 12000, "command": { "intent": "reset_to_defaults" } }
]"#;

// ── Tasks ─────────────────────────────────────────────────────

async fn tick_loop(coordinator: SharedCoordinator) {
    loop {
        coordinator.borrow_mut().tick();
        async_io_mini::Timer::after(TICK_INTERVAL).await;
    }
}

async fn observe(handle: StateHandle) {
    let mut seen = handle.version();
    loop {
        let (version, state) = handle.changed_since(seen).await;
        log_snapshot(version, &state);
        seen = version;
    }
}

async fn run_script(coordinator: SharedCoordinator, steps: Vec<ScriptStep>) {
    for step in steps {
        if step.after_ms > 0 {
            async_io_mini::Timer::after(Duration::from_millis(step.after_ms)).await;
        }
        info!("INTENT | {:?}", step.command);
        coordinator.borrow_mut().handle_command(step.command);
    }
    // Let every pending timer run out.
    while coordinator.borrow().next_deadline().is_some() {
        async_io_mini::Timer::after(TICK_INTERVAL).await;
    }
}

fn log_snapshot(version: u64, s: &ClimateUiState) {
    info!(
        "STATE #{} | {:?} | {}\u{00b0}C (zones {}/{}/{}) | fan {} {:?} | actions {:?}/{:?}/{:?} | {}",
        version,
        s.variant,
        s.global_temperature,
        s.zone_temperature[BodyZone::Upper],
        s.zone_temperature[BodyZone::Middle],
        s.zone_temperature[BodyZone::Lower],
        s.fan_speed,
        s.fan_direction,
        s.zone_actions[BodyZone::Upper],
        s.zone_actions[BodyZone::Middle],
        s.zone_actions[BodyZone::Lower],
        s.status.as_ref().map_or("-", |m| m.text.as_str()),
    );
}

// ── Setup ─────────────────────────────────────────────────────

fn load_config(path: Option<&str>) -> Result<ClimateConfig> {
    let Some(path) = path else {
        info!("Config: defaults");
        return Ok(ClimateConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
    let config = ClimateConfig::from_json(&json).with_context(|| format!("loading {}", path))?;
    info!("Config loaded from {}", path);
    Ok(config)
}

fn load_script(path: Option<&str>) -> Result<Vec<ScriptStep>> {
    let json = match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?,
        None => DEFAULT_SCRIPT.to_owned(),
    };
    serde_json::from_str(&json).context("parsing intent script")
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Efferest HVAC simulator v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let steps = load_script(args.get(1).map(String::as_str))?;

    let bus = SimulatedBus::new();
    let knob = bus.clone();
    let mut coordinator = ClimateCoordinator::new(
        HardwareClimateStore::new(bus),
        MonotonicClock::new(),
        LogFeedback::new(),
        config,
    );
    futures_lite::future::block_on(coordinator.start());

    let handle = coordinator.state_handle();
    let coordinator: SharedCoordinator = Rc::new(RefCell::new(coordinator));

    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    executor.spawn(tick_loop(coordinator.clone())).detach();
    executor.spawn(observe(handle)).detach();

    info!("Playing {} scripted intents", steps.len());
    futures_lite::future::block_on(executor.run(run_script(coordinator.clone(), steps)));

    // A change made outside the head unit reaches the store but not the
    // published snapshot until the next full resync.
    knob.inject(PropertyKind::Temperature, RawValue::Float(26.0));
    let mut c = coordinator.borrow_mut();
    c.tick();
    info!(
        "Knob moved to 26\u{00b0}C: store reads {}\u{00b0}C, snapshot shows {}\u{00b0}C",
        c.store().global_temperature(),
        c.snapshot().global_temperature
    );
    Ok(())
}
