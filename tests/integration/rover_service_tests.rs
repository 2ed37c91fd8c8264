//! Integration tests for the RoverService → FSM → drive pipeline.
//!
//! The scripted sensor advances the step counter by one tick per ranging
//! attempt, so loop iterations and ticks line up the way they do on the
//! rover when an attempt takes about one tick period.

use super::mock_hw::{
    EchoReply, MockDelay, MockTrigger, RecordingDrive, RecordingSink, ScriptedEchoPort,
    ScriptedSensor, timeline,
};

use sonar_rover::app::events::AppEvent;
use sonar_rover::app::service::RoverService;
use sonar_rover::config::RoverConfig;
use sonar_rover::fsm::StateId;
use sonar_rover::fsm::context::Motion;
use sonar_rover::sensors::{PulseTiming, RangingEngine};
use sonar_rover::signals::SharedSignals;

fn started<'s>(
    signals: &'s SharedSignals,
    config: &RoverConfig,
) -> (RoverService<'s>, RecordingDrive, RecordingSink) {
    let mut app = RoverService::new(config, signals);
    let mut drive = RecordingDrive::new();
    let mut sink = RecordingSink::new();
    app.start(&mut drive, &mut sink);
    (app, drive, sink)
}

fn transitions(sink: &RecordingSink) -> Vec<(StateId, StateId)> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::StateChanged { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_enters_walking_and_drives_forward() {
    let signals = SharedSignals::new();
    let (app, drive, sink) = started(&signals, &RoverConfig::default());

    assert_eq!(app.state(), StateId::Walking);
    assert_eq!(app.steps(), 0);
    assert_eq!(drive.calls, vec![Motion::Forward]);
    assert_eq!(sink.events, vec![AppEvent::Started(StateId::Walking)]);
}

// ── WALKING ───────────────────────────────────────────────────

#[test]
fn walking_leaves_counter_alone_while_clear() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    let mut sensor = ScriptedSensor::new(&signals);

    for steps in [0, 1, 57, 198, 199] {
        signals.restore_steps(steps);
        app.step(&mut sensor, &mut drive, &mut sink);
        assert_eq!(app.state(), StateId::Walking);
        assert_eq!(app.steps(), steps);
    }
    assert_eq!(drive.calls, vec![Motion::Forward]);
}

#[test]
fn walking_turns_when_counter_first_reaches_threshold() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    let mut sensor = ScriptedSensor::new(&signals).ticking(1);

    while app.state() == StateId::Walking {
        app.step(&mut sensor, &mut drive, &mut sink);
        assert!(app.loop_count() <= 201, "never turned");
    }

    assert_eq!(app.state(), StateId::Turning);
    assert_eq!(app.loop_count(), 201);
    assert_eq!(sensor.calls, 200, "no ranging on the turning iteration");
    assert_eq!(app.steps(), 0);
    assert_eq!(drive.calls, vec![Motion::Forward, Motion::Turn]);
}

#[test]
fn obstacle_stops_and_saves_counter() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    signals.restore_steps(120);
    let mut sensor = ScriptedSensor::new(&signals).answer(&[true]);

    app.step(&mut sensor, &mut drive, &mut sink);

    assert_eq!(app.state(), StateId::Stop);
    assert_eq!(app.last_step_count(), 120);
    assert_eq!(drive.last(), Some(Motion::Stop));
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::StateChanged {
            from: StateId::Walking,
            to: StateId::Stop,
            steps: 120,
        })
    );
}

// ── STOP ──────────────────────────────────────────────────────

#[test]
fn stop_holds_without_reissuing_motor_commands() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    let mut sensor = ScriptedSensor::new(&signals).answer(&[true; 6]).ticking(1);

    for _ in 0..6 {
        app.step(&mut sensor, &mut drive, &mut sink);
    }

    assert_eq!(app.state(), StateId::Stop);
    assert_eq!(drive.calls, vec![Motion::Forward, Motion::Stop]);
}

#[test]
fn clearing_restores_saved_counter_not_zero() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    signals.restore_steps(80);
    let mut sensor = ScriptedSensor::new(&signals)
        .answer(&[true, true, true, false])
        .ticking(1);

    for _ in 0..4 {
        app.step(&mut sensor, &mut drive, &mut sink);
    }

    assert_eq!(app.state(), StateId::Walking);
    // Saved after the first attempt's tick; the paused ticks are dropped.
    assert_eq!(app.last_step_count(), 81);
    assert_eq!(app.steps(), 81);
    assert_eq!(drive.calls, vec![Motion::Forward, Motion::Stop, Motion::Forward]);
}

// ── TURNING ───────────────────────────────────────────────────

#[test]
fn turning_ends_when_counter_first_exceeds_threshold() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    let mut sensor = ScriptedSensor::new(&signals);
    signals.restore_steps(200);
    app.step(&mut sensor, &mut drive, &mut sink);
    assert_eq!(app.state(), StateId::Turning);

    let mut seen = Vec::new();
    while app.state() == StateId::Turning {
        signals.on_tick();
        seen.push(signals.steps());
        app.step(&mut sensor, &mut drive, &mut sink);
        assert!(seen.len() <= 151, "never finished turning");
    }

    assert_eq!(seen.last(), Some(&151));
    assert_eq!(app.steps(), 0);
    assert_eq!(sensor.calls, 0, "turning never ranges");
    assert_eq!(drive.calls, vec![Motion::Forward, Motion::Turn, Motion::Forward]);
}

// ── Whole cycle ───────────────────────────────────────────────

#[test]
fn paused_walk_still_covers_the_full_leg() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    let mut answers = vec![false; 49];
    answers.extend([true, true, true, false]);
    let mut sensor = ScriptedSensor::new(&signals).answer(&answers).ticking(1);

    while app.state() != StateId::Turning {
        app.step(&mut sensor, &mut drive, &mut sink);
        assert!(app.loop_count() < 1_000);
    }

    // 200 attempts while walking plus 3 while stopped.
    assert_eq!(sensor.calls, 203);
    assert_eq!(
        transitions(&sink),
        vec![
            (StateId::Walking, StateId::Stop),
            (StateId::Stop, StateId::Walking),
            (StateId::Walking, StateId::Turning),
        ]
    );
    assert_eq!(
        drive.calls,
        vec![Motion::Forward, Motion::Stop, Motion::Forward, Motion::Turn]
    );
}

#[test]
fn history_records_each_transition() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    let mut sensor = ScriptedSensor::new(&signals).answer(&[true, false]);

    app.step(&mut sensor, &mut drive, &mut sink);
    app.step(&mut sensor, &mut drive, &mut sink);

    let history: Vec<_> = app.transitions().map(|t| (t.from, t.to, t.loop_count)).collect();
    assert_eq!(
        history,
        vec![
            (StateId::Walking, StateId::Stop, 1),
            (StateId::Stop, StateId::Walking, 2),
        ]
    );
}

// ── Faults and telemetry ──────────────────────────────────────

#[test]
fn drive_fault_is_reported_and_loop_continues() {
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &RoverConfig::default());
    drive.failing = true;
    let mut sensor = ScriptedSensor::new(&signals).answer(&[true, false]);

    app.step(&mut sensor, &mut drive, &mut sink);
    assert_eq!(app.state(), StateId::Stop);
    assert!(sink.events.contains(&AppEvent::DriveFault(Motion::Stop)));

    drive.failing = false;
    app.step(&mut sensor, &mut drive, &mut sink);
    assert_eq!(app.state(), StateId::Walking);
    assert_eq!(drive.last(), Some(Motion::Forward));
}

#[test]
fn telemetry_carries_ranging_stats() {
    let config = RoverConfig {
        telemetry_interval_loops: 4,
        ..RoverConfig::default()
    };
    let signals = SharedSignals::new();
    let (mut app, mut drive, mut sink) = started(&signals, &config);

    let tl = timeline();
    let mut port = ScriptedEchoPort::new(&signals, tl.clone());
    port.push(EchoReply::Silent);
    port.push(EchoReply::Silent);
    port.push(EchoReply::Silent);
    let mut sensor = RangingEngine::new(
        MockTrigger { timeline: tl.clone() },
        MockDelay { timeline: tl.clone() },
        port,
        &signals,
        PulseTiming::from_config(&config),
    );

    for _ in 0..4 {
        app.step(&mut sensor, &mut drive, &mut sink);
    }

    let telemetry: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 1);
    let t = &telemetry[0];
    assert_eq!(t.state, StateId::Walking);
    assert_eq!(t.loop_count, 4);
    assert_eq!(t.motion, Motion::Forward);
    assert_eq!(t.ranging.attempts, 4);
    assert_eq!(t.ranging.timeouts, 4);
}

#[test]
fn real_ranging_engine_drives_the_fsm() {
    let signals = SharedSignals::new();
    let config = RoverConfig::default();
    let (mut app, mut drive, mut sink) = started(&signals, &config);

    let tl = timeline();
    let mut port = ScriptedEchoPort::new(&signals, tl.clone());
    port.push(EchoReply::Silent);
    port.push(EchoReply::Echo { waits: 1 });
    port.push(EchoReply::Echo { waits: 0 });
    port.push(EchoReply::Silent);
    let mut sensor = RangingEngine::new(
        MockTrigger { timeline: tl.clone() },
        MockDelay { timeline: tl.clone() },
        port,
        &signals,
        PulseTiming::from_config(&config),
    );

    let states: Vec<StateId> = (0..4)
        .map(|_| {
            app.step(&mut sensor, &mut drive, &mut sink);
            app.state()
        })
        .collect();

    assert_eq!(
        states,
        vec![StateId::Walking, StateId::Stop, StateId::Stop, StateId::Walking]
    );
    assert!(!signals.echo_pending());
    assert!(!signals.timeout_pending());
}
