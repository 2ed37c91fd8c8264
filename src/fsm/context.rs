//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the single struct that state handlers read from and
//! write to: the interrupt-shared step counter, the saved step count for the
//! STOP pause, the behaviour thresholds and the motion command the service
//! applies after each tick.

use crate::config::RoverConfig;
use crate::signals::SharedSignals;

// ---------------------------------------------------------------------------
// Motion commands (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// The three motions the drive port understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Forward,
    Stop,
    Turn,
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext<'s> {
    // -- Timing --
    /// Step counter and ranging flags shared with the interrupt handlers.
    pub signals: &'s SharedSignals,
    /// Step count saved on entering STOP, restored on leaving it.
    pub last_step_count: u32,

    // -- Thresholds (ticks) --
    pub walk_duration_ticks: u32,
    pub turn_duration_ticks: u32,

    // -- Outputs --
    /// Motion requested by the last `on_enter`, not yet applied.
    pending_motion: Option<Motion>,
    /// Last motion handed to the drive port.
    motion: Motion,
}

impl<'s> FsmContext<'s> {
    pub fn new(config: &RoverConfig, signals: &'s SharedSignals) -> Self {
        Self {
            signals,
            last_step_count: 0,
            walk_duration_ticks: config.walk_duration_ticks,
            turn_duration_ticks: config.turn_duration_ticks,
            pending_motion: None,
            motion: Motion::Stop,
        }
    }

    /// Request a motion; the service applies it after the current tick.
    pub fn command(&mut self, motion: Motion) {
        self.pending_motion = Some(motion);
    }

    /// Hand the pending motion to the caller, recording it as current.
    pub fn take_pending_motion(&mut self) -> Option<Motion> {
        let motion = self.pending_motion.take()?;
        self.motion = motion;
        Some(motion)
    }

    /// Last motion taken by the service.
    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Current step count.
    pub fn steps(&self) -> u32 {
        self.signals.steps()
    }
}
