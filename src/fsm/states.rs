//! Concrete state handler functions and table builder.
//!
//! ```text
//!              [object]                      [clear]
//!   WALKING ─────────────▶ STOP    STOP ─────────────▶ WALKING
//!      │   save steps            (restore steps)
//!      │
//!      │ [steps >= walk]                     [steps > turn]
//!      └──────────────────▶ TURNING ─────────────────▶ WALKING
//!          reset steps                  reset steps
//! ```
//!
//! Step-counter bookkeeping happens in `on_update`, right where the
//! transition is decided. The matching motion command is issued by the
//! target state's `on_enter`.

use super::context::{FsmContext, Motion};
use super::{StateDescriptor, StateId};
use crate::app::ports::ObstacleSensor;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table. Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Walking,
            on_enter: Some(walking_enter),
            on_exit: None,
            on_update: walking_update,
        },
        StateDescriptor {
            id: StateId::Stop,
            on_enter: Some(stop_enter),
            on_exit: None,
            on_update: stop_update,
        },
        StateDescriptor {
            id: StateId::Turning,
            on_enter: Some(turning_enter),
            on_exit: None,
            on_update: turning_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  WALKING
// ═══════════════════════════════════════════════════════════════════════════

fn walking_enter(ctx: &mut FsmContext<'_>) {
    ctx.command(Motion::Forward);
}

fn walking_update(ctx: &mut FsmContext<'_>, sensor: &mut dyn ObstacleSensor) -> Option<StateId> {
    if ctx.steps() >= ctx.walk_duration_ticks {
        ctx.signals.reset_steps();
        return Some(StateId::Turning);
    }

    if sensor.has_object() {
        // Ticks keep arriving during the attempt; save the count as of now.
        ctx.last_step_count = ctx.steps();
        return Some(StateId::Stop);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STOP — obstacle ahead, poll until the path clears
// ═══════════════════════════════════════════════════════════════════════════

fn stop_enter(ctx: &mut FsmContext<'_>) {
    ctx.command(Motion::Stop);
}

fn stop_update(ctx: &mut FsmContext<'_>, sensor: &mut dyn ObstacleSensor) -> Option<StateId> {
    if sensor.has_object() {
        return None;
    }

    ctx.signals.restore_steps(ctx.last_step_count);
    Some(StateId::Walking)
}

// ═══════════════════════════════════════════════════════════════════════════
//  TURNING
// ═══════════════════════════════════════════════════════════════════════════

fn turning_enter(ctx: &mut FsmContext<'_>) {
    ctx.command(Motion::Turn);
}

fn turning_update(ctx: &mut FsmContext<'_>, _sensor: &mut dyn ObstacleSensor) -> Option<StateId> {
    if ctx.steps() > ctx.turn_duration_ticks {
        ctx.signals.reset_steps();
        return Some(StateId::Walking);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
