//! Application service — the hexagonal core.
//!
//! [`RoverService`] owns the FSM and its context. One call to
//! [`RoverService::step`] is one iteration of the control loop:
//!
//! ```text
//!  ObstacleSensor ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                     │      RoverService      │
//!          Drive   ◀──│   FSM · step counter   │
//!                     └────────────────────────┘
//! ```
//!
//! All I/O flows through port traits passed in at the call site, so the
//! whole loop runs on the host against mocks.

use heapless::HistoryBuffer;
use log::{info, warn};

use crate::config::RoverConfig;
use crate::fsm::context::{FsmContext, Motion};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::sensors::ultrasonic::RangingStats;
use crate::signals::SharedSignals;

use super::events::{AppEvent, TelemetryData};
use super::ports::{Drive, EventSink, ObstacleSensor};

/// Transitions kept for diagnostics.
pub const TRANSITION_HISTORY: usize = 8;

/// One entry of the transition history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    /// Step counter right after the transition.
    pub steps: u32,
    /// Loop iteration on which it happened.
    pub loop_count: u64,
}

// ───────────────────────────────────────────────────────────────
// RoverService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct RoverService<'s> {
    fsm: Fsm,
    ctx: FsmContext<'s>,
    telemetry_interval_loops: u32,
    history: HistoryBuffer<Transition, TRANSITION_HISTORY>,
}

impl<'s> RoverService<'s> {
    /// Construct the service. Does **not** start the FSM — call
    /// [`start`](Self::start) next.
    pub fn new(config: &RoverConfig, signals: &'s SharedSignals) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Walking),
            ctx: FsmContext::new(config, signals),
            telemetry_interval_loops: config.telemetry_interval_loops,
            history: HistoryBuffer::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Begin the first walking leg from a zero step count.
    pub fn start(&mut self, drive: &mut impl Drive, sink: &mut impl EventSink) {
        self.ctx.signals.reset_steps();
        self.fsm.start(&mut self.ctx);
        self.apply_motion(drive, sink);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("RoverService started in {}", self.fsm.current_state());
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one control-loop iteration: FSM → drive → events.
    ///
    /// Blocks for at most one ranging attempt.
    pub fn step(
        &mut self,
        sensor: &mut impl ObstacleSensor,
        drive: &mut impl Drive,
        sink: &mut impl EventSink,
    ) {
        if let Some(from) = self.fsm.tick(&mut self.ctx, sensor) {
            self.apply_motion(drive, sink);

            let transition = Transition {
                from,
                to: self.fsm.current_state(),
                steps: self.ctx.steps(),
                loop_count: self.fsm.tick_count(),
            };
            self.history.write(transition);
            sink.emit(&AppEvent::StateChanged {
                from: transition.from,
                to: transition.to,
                steps: transition.steps,
            });
        }

        let interval = u64::from(self.telemetry_interval_loops);
        if interval > 0 && self.fsm.tick_count() % interval == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry(sensor.stats())));
        }
    }

    /// Run the control loop forever. `after_step` runs once per iteration
    /// (watchdog feed).
    pub fn run(
        &mut self,
        sensor: &mut impl ObstacleSensor,
        drive: &mut impl Drive,
        sink: &mut impl EventSink,
        mut after_step: impl FnMut(),
    ) -> ! {
        loop {
            self.step(sensor, drive, sink);
            after_step();
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self, ranging: RangingStats) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            steps: self.ctx.steps(),
            last_step_count: self.ctx.last_step_count,
            motion: self.ctx.motion(),
            loop_count: self.fsm.tick_count(),
            ranging,
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    /// Current step count.
    pub fn steps(&self) -> u32 {
        self.ctx.steps()
    }

    /// Step count saved on the last entry into STOP.
    pub fn last_step_count(&self) -> u32 {
        self.ctx.last_step_count
    }

    /// Last motion applied to the drive.
    pub fn motion(&self) -> Motion {
        self.ctx.motion()
    }

    /// Control-loop iterations since start.
    pub fn loop_count(&self) -> u64 {
        self.fsm.tick_count()
    }

    /// Recent transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.history.oldest_ordered()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate the pending FSM motion into a drive port call.
    fn apply_motion(&mut self, drive: &mut impl Drive, sink: &mut impl EventSink) {
        let Some(motion) = self.ctx.take_pending_motion() else {
            return;
        };

        let result = match motion {
            Motion::Forward => drive.drive_forward(),
            Motion::Stop => drive.stop(),
            Motion::Turn => drive.turn(),
        };

        if let Err(e) = result {
            warn!("drive: {:?} failed: {:?}", motion, e);
            sink.emit(&AppEvent::DriveFault(motion));
        }
    }
}
