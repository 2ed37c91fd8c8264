//! Sonar Rover Firmware — Main Entry Point
//!
//! Hexagonal architecture around a single blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RangingEngine        MotorActuator     LogEventSink           │
//! │  (ObstacleSensor)     (Drive)           (EventSink)            │
//! │    └─ EspEchoPort (echo edge ISR + one-shot timeout)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            RoverService (pure logic)                   │    │
//! │  │  FSM: WALKING · STOP · TURNING                         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Tick timer (5 ms) ─▶ SharedSignals ◀─ echo / timeout ISRs     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use sonar_rover::adapters::hardware::EspEchoPort;
use sonar_rover::adapters::log_sink::LogEventSink;
use sonar_rover::app::service::RoverService;
use sonar_rover::config::RoverConfig;
use sonar_rover::drivers::{board, hw_timer, watchdog::Watchdog};
use sonar_rover::sensors::{PulseTiming, RangingEngine};
use sonar_rover::signals::SharedSignals;

/// Step counter and ranging flags, shared with the timer and GPIO
/// interrupt handlers.
static SIGNALS: SharedSignals = SharedSignals::new();

/// Build the effective configuration: defaults, or a JSON document baked in
/// at build time through `SONAR_ROVER_CONFIG`.
fn load_config() -> RoverConfig {
    let Some(json) = option_env!("SONAR_ROVER_CONFIG") else {
        return RoverConfig::default();
    };
    match RoverConfig::from_json(json) {
        Ok(cfg) => {
            info!("Config: build-time override applied");
            cfg
        }
        Err(e) => {
            warn!("Config: override rejected ({}), using defaults", e);
            RoverConfig::default()
        }
    }
}

/// Initialisation failure is fatal; the task watchdog resets the chip.
fn halt(what: &str, e: impl core::fmt::Display) -> ! {
    error!("{} failed: {} — halting", what, e);
    #[allow(clippy::empty_loop)]
    loop {}
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SonarRover v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();
    if let Err(e) = config.validate() {
        halt("Config validation", e);
    }
    info!(
        "Config: tick={}ms walk={} ticks ({}ms) turn={} ticks ({}ms), echo window {}us (~{}mm)",
        config.tick_period_ms,
        config.walk_duration_ticks,
        config.walk_duration_ms(),
        config.turn_duration_ticks,
        config.turn_duration_ms(),
        config.echo_timeout_us,
        config.detection_range_mm(),
    );

    // ── 3. Peripherals ────────────────────────────────────────
    let peripherals = esp_idf_hal::peripherals::Peripherals::take()?;
    let board = match board::init(peripherals.ledc, &config) {
        Ok(b) => b,
        Err(e) => halt("HAL init", e),
    };
    let board::Board {
        trigger,
        echo,
        mut motors,
        delay,
        ..
    } = board;

    let echo_port = match EspEchoPort::new(echo, &SIGNALS) {
        Ok(p) => p,
        Err(e) => halt("Echo port init", e),
    };

    // ── 4. Tick source ────────────────────────────────────────
    let _tick = match hw_timer::start_tick_timer(&SIGNALS, config.tick_period_ms) {
        Ok(t) => t,
        Err(e) => halt("Tick timer", e),
    };
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    // ── 5. Core ───────────────────────────────────────────────
    let mut sensor = RangingEngine::new(
        trigger,
        delay,
        echo_port,
        &SIGNALS,
        PulseTiming::from_config(&config),
    );
    let mut sink = LogEventSink::new();
    let mut app = RoverService::new(&config, &SIGNALS);
    app.start(&mut motors, &mut sink);

    // ── 6. Control loop ───────────────────────────────────────
    app.run(&mut sensor, &mut motors, &mut sink, || watchdog.feed())
}
