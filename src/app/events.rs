//! Outbound application events.
//!
//! The [`RoverService`](super::service::RoverService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.

use crate::fsm::StateId;
use crate::fsm::context::Motion;
use crate::sensors::ultrasonic::RangingStats;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries the initial state).
    Started(StateId),

    /// The FSM transitioned between states. `steps` is the step counter
    /// right after the transition.
    StateChanged { from: StateId, to: StateId, steps: u32 },

    /// A motor command could not be applied.
    DriveFault(Motion),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub state: StateId,
    pub steps: u32,
    pub last_step_count: u32,
    pub motion: Motion,
    pub loop_count: u64,
    pub ranging: RangingStats,
}
