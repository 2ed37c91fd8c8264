//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={} | steps={} saved={} | motion={:?} | loops={} | \
                     ranging={}/{} echo, {} timeout, {} fault",
                    t.state,
                    t.steps,
                    t.last_step_count,
                    t.motion,
                    t.loop_count,
                    t.ranging.echoes,
                    t.ranging.attempts,
                    t.ranging.timeouts,
                    t.ranging.faults,
                );
            }
            AppEvent::StateChanged { from, to, steps } => {
                info!("STATE | {} -> {} | steps={}", from, to, steps);
            }
            AppEvent::DriveFault(motion) => {
                warn!("DRIVE | {:?} not applied", motion);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
        }
    }
}
