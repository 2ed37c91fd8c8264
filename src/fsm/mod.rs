//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                       │
//! │  ┌─────────┬───────────┬──────────┬────────────────────────────┐  │
//! │  │ StateId │ on_enter  │ on_exit  │ on_update                  │  │
//! │  ├─────────┼───────────┼──────────┼────────────────────────────┤  │
//! │  │ Walking │ fn(ctx)   │ -        │ fn(ctx, sensor)->Option<>  │  │
//! │  │ Stop    │ fn(ctx)   │ -        │ fn(ctx, sensor)->Option<>  │  │
//! │  │ Turning │ fn(ctx)   │ -        │ fn(ctx, sensor)->Option<>  │  │
//! │  └─────────┴───────────┴──────────┴────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state, handing
//! it the obstacle sensor so the state decides whether a ranging attempt is
//! needed at all. If it returns `Some(next_id)`, the engine runs `on_exit`
//! for the current state, then `on_enter` for the next. Exactly one state is
//! active at any time and transitions only happen here.

pub mod context;
pub mod states;

use core::fmt;

use context::FsmContext;
use log::debug;

use crate::app::ports::ObstacleSensor;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all behaviour states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Walking = 0,
    Stop = 1,
    Turning = 2,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 3;

    pub fn name(self) -> &'static str {
        match self {
            Self::Walking => "WALKING",
            Self::Stop => "STOP",
            Self::Turning => "TURNING",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut FsmContext<'_>);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut FsmContext<'_>, &mut dyn ObstacleSensor) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap.
pub struct StateDescriptor {
    pub id: StateId,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Control-loop iterations since start (wraps at u64::MAX).
    tick_count: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut FsmContext<'_>) {
        debug!("FSM starting in state: {}", self.current_state());
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one control-loop iteration.
    ///
    /// Returns the state that was left, if a transition happened.
    pub fn tick(&mut self, ctx: &mut FsmContext<'_>, sensor: &mut dyn ObstacleSensor) -> Option<StateId> {
        self.tick_count = self.tick_count.wrapping_add(1);

        let next = (self.table[self.current].on_update)(ctx, sensor)?;
        let prev = self.current_state();
        self.transition(next, ctx);
        Some(prev)
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        self.table[self.current].id
    }

    /// Total iterations since start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut FsmContext<'_>) {
        let next_idx = next_id as usize;

        debug!(
            "FSM transition: {} -> {}",
            self.current_state(),
            self.table[next_idx].id
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
