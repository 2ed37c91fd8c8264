//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RoverService (domain)
//! ```
//!
//! Driven adapters (ranging engine, motor actuator, echo peripherals, event
//! sinks) implement these traits. The [`RoverService`](super::service::RoverService)
//! and [`RangingEngine`](crate::sensors::ultrasonic::RangingEngine) consume
//! them via generics, so the domain core never touches registers directly.
//!
//! Plain pins, delays and PWM channels are not re-specified here: they use
//! the `embedded-hal` 1.0 traits (`OutputPin`, `DelayNs`, `SetDutyCycle`).

use crate::sensors::ultrasonic::RangingStats;

// ───────────────────────────────────────────────────────────────
// Obstacle sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the state machine asks whether something is in range.
///
/// The call blocks for at most one ranging attempt. It never fails: any
/// fault resolves to `false`.
pub trait ObstacleSensor {
    fn has_object(&mut self) -> bool;

    /// Running attempt counters, for telemetry.
    fn stats(&self) -> RangingStats {
        RangingStats::default()
    }
}

// ───────────────────────────────────────────────────────────────
// Drive port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the three commanded motions.
pub trait Drive {
    type Error: core::fmt::Debug;

    /// Both motors forward.
    fn drive_forward(&mut self) -> Result<(), Self::Error>;

    /// Both motors off.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Spin in place.
    fn turn(&mut self) -> Result<(), Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Echo / timeout peripheral port (HAL collaborator)
// ───────────────────────────────────────────────────────────────

/// The interrupt plumbing one ranging attempt needs.
///
/// Implementations route the echo-edge interrupt to
/// [`SharedSignals::on_echo_edge`](crate::signals::SharedSignals::on_echo_edge)
/// and the timeout interrupt to
/// [`SharedSignals::on_timeout`](crate::signals::SharedSignals::on_timeout);
/// the edge polarity is fixed when the peripheral is set up.
pub trait EchoTimerPort {
    type Error: core::fmt::Debug;

    /// Enable the echo-edge interrupt.
    fn arm_edge_interrupt(&mut self) -> Result<(), Self::Error>;

    /// Disable the echo-edge interrupt.
    fn disarm_edge_interrupt(&mut self) -> Result<(), Self::Error>;

    /// Start the one-shot timeout timer from a zero count.
    fn start_timeout(&mut self, duration_us: u32) -> Result<(), Self::Error>;

    /// Stop the timeout timer and reset its count to zero.
    fn stop_timeout(&mut self) -> Result<(), Self::Error>;

    /// Suspend the caller until any interrupt has been serviced.
    ///
    /// Must not busy-spin. Spurious returns are allowed; the caller
    /// re-checks its flags.
    fn wait_for_interrupt(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
