//! Interrupt-to-main-loop shared state.
//!
//! Three interrupt sources write here; the control loop is the only reader.
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────────┐
//! │ Tick timer   │────▶│ step_count (u32)    │──┐
//! │ Echo edge    │────▶│ echo       (bool)   │──┼──▶ control loop
//! │ Echo timeout │────▶│ timeout    (bool)   │──┘    (reader / clearer)
//! └──────────────┘     └─────────────────────┘
//! ```
//!
//! Every field is a single atomic word, so there is nothing to lock:
//!
//! - `step_count` is incremented only by the tick handler. The control loop
//!   resets, snapshots and restores it with single atomic stores and loads,
//!   which can never tear against the increment.
//! - `echo` and `timeout` are one-bit handshakes, not queues. A second edge
//!   before the flag is consumed is lost. Only the ranging engine clears
//!   them, and it always does so before re-arming.
//!
//! One `SharedSignals` lives for the whole program and is handed by
//! reference to every component and interrupt handler.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::sensors::ultrasonic::RangingOutcome;

/// Atomics shared between interrupt handlers and the control loop.
#[derive(Debug, Default)]
pub struct SharedSignals {
    step_count: AtomicU32,
    echo: AtomicBool,
    timeout: AtomicBool,
}

impl SharedSignals {
    pub const fn new() -> Self {
        Self {
            step_count: AtomicU32::new(0),
            echo: AtomicBool::new(false),
            timeout: AtomicBool::new(false),
        }
    }

    // ── Interrupt side ────────────────────────────────────────

    /// Tick handler body. Wraps at `u32::MAX`.
    pub fn on_tick(&self) {
        self.step_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Echo-edge handler body.
    pub fn on_echo_edge(&self) {
        self.echo.store(true, Ordering::Release);
    }

    /// Timeout-timer handler body.
    pub fn on_timeout(&self) {
        self.timeout.store(true, Ordering::Release);
    }

    // ── Control-loop side ─────────────────────────────────────

    /// Current step count.
    pub fn steps(&self) -> u32 {
        self.step_count.load(Ordering::Relaxed)
    }

    /// Zero the step counter on entering a new phase.
    pub fn reset_steps(&self) {
        self.step_count.store(0, Ordering::Relaxed);
    }

    /// Put back a previously saved step count.
    pub fn restore_steps(&self, steps: u32) {
        self.step_count.store(steps, Ordering::Relaxed);
    }

    /// Check the ranging handshake. The echo flag is read first, so when
    /// both are already set the echo wins.
    pub fn poll_ranging(&self) -> Option<RangingOutcome> {
        if self.echo.load(Ordering::Acquire) {
            Some(RangingOutcome::Echo)
        } else if self.timeout.load(Ordering::Acquire) {
            Some(RangingOutcome::Timeout)
        } else {
            None
        }
    }

    /// Drop both ranging flags.
    pub fn clear_ranging(&self) {
        self.echo.store(false, Ordering::Release);
        self.timeout.store(false, Ordering::Release);
    }

    pub fn echo_pending(&self) -> bool {
        self.echo.load(Ordering::Acquire)
    }

    pub fn timeout_pending(&self) -> bool {
        self.timeout.load(Ordering::Acquire)
    }
}
