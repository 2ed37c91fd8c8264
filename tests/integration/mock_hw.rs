//! Mock hardware for integration tests.
//!
//! The trigger pin, delay and echo port share one [`Timeline`] so tests can
//! assert on the exact order of HAL calls across all three. The drive,
//! sensor and sink mocks record what the service asked of them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};
use sonar_rover::app::events::AppEvent;
use sonar_rover::app::ports::{Drive, EchoTimerPort, EventSink, ObstacleSensor};
use sonar_rover::fsm::context::Motion;
use sonar_rover::signals::SharedSignals;

// ── HAL call record ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalCall {
    TriggerLow,
    TriggerHigh,
    DelayUs(u32),
    ArmEdge,
    DisarmEdge,
    StartTimeout(u32),
    StopTimeout,
    Wait,
}

pub type Timeline = Rc<RefCell<Vec<HalCall>>>;

pub fn timeline() -> Timeline {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockHalError;

// ── Trigger pin + delay ───────────────────────────────────────

pub struct MockTrigger {
    pub timeline: Timeline,
}

impl ErrorType for MockTrigger {
    type Error = core::convert::Infallible;
}

impl OutputPin for MockTrigger {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.timeline.borrow_mut().push(HalCall::TriggerLow);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.timeline.borrow_mut().push(HalCall::TriggerHigh);
        Ok(())
    }
}

/// Trigger pin whose writes fail by position: write `n` (counting from
/// zero across the pin's lifetime) returns an error if `n` is in
/// `failing_writes`. Only successful writes reach the timeline.
pub struct FlakyTrigger {
    pub timeline: Timeline,
    pub failing_writes: Vec<usize>,
    pub writes: usize,
}

#[allow(dead_code)]
impl FlakyTrigger {
    pub fn new(timeline: Timeline, failing_writes: &[usize]) -> Self {
        Self {
            timeline,
            failing_writes: failing_writes.to_vec(),
            writes: 0,
        }
    }

    fn write(&mut self, call: HalCall) -> Result<(), MockHalError> {
        let n = self.writes;
        self.writes += 1;
        if self.failing_writes.contains(&n) {
            return Err(MockHalError);
        }
        self.timeline.borrow_mut().push(call);
        Ok(())
    }
}

impl embedded_hal::digital::Error for MockHalError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl ErrorType for FlakyTrigger {
    type Error = MockHalError;
}

impl OutputPin for FlakyTrigger {
    fn set_low(&mut self) -> Result<(), MockHalError> {
        self.write(HalCall::TriggerLow)
    }

    fn set_high(&mut self) -> Result<(), MockHalError> {
        self.write(HalCall::TriggerHigh)
    }
}

pub struct MockDelay {
    pub timeline: Timeline,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.timeline.borrow_mut().push(HalCall::DelayUs(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.timeline.borrow_mut().push(HalCall::DelayUs(us));
    }
}

// ── Echo port ─────────────────────────────────────────────────

/// What the "hardware" does during one ranging attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoReply {
    /// Falling edge after `waits` spurious wake-ups.
    Echo { waits: u32 },
    /// Nothing comes back; the timeout fires on the first wait.
    Silent,
    /// Edge and timeout both latched before the first wait.
    Both,
    /// Edge arrives while the interrupt is being armed.
    EchoWhileArming,
    /// Arming the edge interrupt fails.
    ArmFails,
}

/// Echo port that replays one [`EchoReply`] per attempt. With an empty
/// script every attempt is [`EchoReply::Silent`].
pub struct ScriptedEchoPort<'s> {
    pub timeline: Timeline,
    signals: &'s SharedSignals,
    script: VecDeque<EchoReply>,
    current: EchoReply,
    waits_left: u32,
    /// Tick interrupts delivered on every wait, to model time passing.
    pub ticks_per_wait: u32,
    pub edge_armed: bool,
    pub timer_running: bool,
}

#[allow(dead_code)]
impl<'s> ScriptedEchoPort<'s> {
    pub fn new(signals: &'s SharedSignals, timeline: Timeline) -> Self {
        Self {
            timeline,
            signals,
            script: VecDeque::new(),
            current: EchoReply::Silent,
            waits_left: 0,
            ticks_per_wait: 0,
            edge_armed: false,
            timer_running: false,
        }
    }

    pub fn push(&mut self, reply: EchoReply) {
        self.script.push_back(reply);
    }

    fn record(&self, call: HalCall) {
        self.timeline.borrow_mut().push(call);
    }
}

impl EchoTimerPort for ScriptedEchoPort<'_> {
    type Error = MockHalError;

    fn arm_edge_interrupt(&mut self) -> Result<(), MockHalError> {
        self.record(HalCall::ArmEdge);
        self.current = self.script.pop_front().unwrap_or(EchoReply::Silent);
        match self.current {
            EchoReply::ArmFails => return Err(MockHalError),
            EchoReply::EchoWhileArming => self.signals.on_echo_edge(),
            EchoReply::Echo { waits } => self.waits_left = waits,
            _ => {}
        }
        self.edge_armed = true;
        Ok(())
    }

    fn disarm_edge_interrupt(&mut self) -> Result<(), MockHalError> {
        self.record(HalCall::DisarmEdge);
        self.edge_armed = false;
        Ok(())
    }

    fn start_timeout(&mut self, duration_us: u32) -> Result<(), MockHalError> {
        self.record(HalCall::StartTimeout(duration_us));
        self.timer_running = true;
        Ok(())
    }

    fn stop_timeout(&mut self) -> Result<(), MockHalError> {
        self.record(HalCall::StopTimeout);
        self.timer_running = false;
        Ok(())
    }

    fn wait_for_interrupt(&mut self) {
        self.record(HalCall::Wait);
        for _ in 0..self.ticks_per_wait {
            self.signals.on_tick();
        }
        match self.current {
            EchoReply::Echo { .. } if self.waits_left > 0 => self.waits_left -= 1,
            EchoReply::Echo { .. } | EchoReply::EchoWhileArming => self.signals.on_echo_edge(),
            EchoReply::Both => {
                self.signals.on_timeout();
                self.signals.on_echo_edge();
            }
            EchoReply::Silent | EchoReply::ArmFails => self.signals.on_timeout(),
        }
    }
}

// ── Obstacle sensor ───────────────────────────────────────────

/// Answers from a script (then `false`) and advances the step counter on
/// every call, the way ticks keep arriving during a real attempt.
pub struct ScriptedSensor<'s> {
    signals: &'s SharedSignals,
    answers: VecDeque<bool>,
    pub ticks_per_call: u32,
    pub calls: u32,
}

#[allow(dead_code)]
impl<'s> ScriptedSensor<'s> {
    pub fn new(signals: &'s SharedSignals) -> Self {
        Self {
            signals,
            answers: VecDeque::new(),
            ticks_per_call: 0,
            calls: 0,
        }
    }

    pub fn answer(mut self, answers: &[bool]) -> Self {
        self.answers.extend(answers.iter().copied());
        self
    }

    pub fn ticking(mut self, ticks_per_call: u32) -> Self {
        self.ticks_per_call = ticks_per_call;
        self
    }
}

impl ObstacleSensor for ScriptedSensor<'_> {
    fn has_object(&mut self) -> bool {
        self.calls += 1;
        for _ in 0..self.ticks_per_call {
            self.signals.on_tick();
        }
        self.answers.pop_front().unwrap_or(false)
    }
}

// ── Drive ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDrive {
    pub calls: Vec<Motion>,
    /// Fail every command while set.
    pub failing: bool,
}

#[allow(dead_code)]
impl RecordingDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<Motion> {
        self.calls.last().copied()
    }

    fn record(&mut self, motion: Motion) -> Result<(), MockHalError> {
        self.calls.push(motion);
        if self.failing { Err(MockHalError) } else { Ok(()) }
    }
}

impl Drive for RecordingDrive {
    type Error = MockHalError;

    fn drive_forward(&mut self) -> Result<(), MockHalError> {
        self.record(Motion::Forward)
    }

    fn stop(&mut self) -> Result<(), MockHalError> {
        self.record(Motion::Stop)
    }

    fn turn(&mut self) -> Result<(), MockHalError> {
        self.record(Motion::Turn)
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_changes(&self) -> Vec<&AppEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::StateChanged { .. }))
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
