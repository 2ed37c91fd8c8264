//! HC-SR04 ultrasonic ranging engine.
//!
//! One ranging attempt:
//!
//! ```text
//!  trigger  ──┐  2us  ┌── 10us ──┐
//!             └───────┘          └──────────────────────────────
//!  arm echo edge + start timeout ─▶ wait for interrupt ─▶ first flag wins
//!                                                       ─▶ teardown
//! ```
//!
//! The echo line is high for the time of flight; its falling edge ends the
//! pulse. If that edge arrives before the timeout window closes, something
//! is within range. The timer resolution is too coarse for a calibrated
//! distance, so the engine reports presence only and the timeout window is
//! the detection radius (see [`RoverConfig::detection_range_mm`]).
//!
//! Teardown (disarm edge, stop and zero the timer, clear both flags) lives
//! in the `Drop` of `ArmedAttempt`, so it runs on every exit path,
//! including HAL errors half-way through arming.

use core::fmt;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{trace, warn};

use crate::app::ports::{EchoTimerPort, ObstacleSensor};
use crate::config::RoverConfig;
use crate::signals::SharedSignals;

/// Result of one ranging attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangingOutcome {
    /// Echo edge observed before the timeout: object in range.
    Echo,
    /// Timeout fired first: nothing in range (or no sensor at all).
    Timeout,
}

/// Running counters, wrapping at `u32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangingStats {
    pub attempts: u32,
    pub echoes: u32,
    pub timeouts: u32,
    /// Attempts aborted by a pin or peripheral error.
    pub faults: u32,
}

/// Trigger pulse shape and echo window, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    pub settle_us: u32,
    pub pulse_us: u32,
    pub timeout_us: u32,
}

impl PulseTiming {
    pub fn from_config(config: &RoverConfig) -> Self {
        Self {
            settle_us: config.trigger_settle_us,
            pulse_us: config.trigger_pulse_us,
            timeout_us: config.echo_timeout_us,
        }
    }
}

/// Why an attempt was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangingError<T, P> {
    /// Writing the trigger pin failed.
    Trigger(T),
    /// Arming the echo interrupt or the timeout timer failed.
    Port(P),
}

impl<T: fmt::Debug, P: fmt::Debug> fmt::Display for RangingError<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trigger(e) => write!(f, "trigger pin: {e:?}"),
            Self::Port(e) => write!(f, "echo port: {e:?}"),
        }
    }
}

/// Ultrasonic ranging engine.
///
/// Generic over the trigger pin, a microsecond delay primitive and the
/// echo/timeout peripheral port, so the same code runs on the ESP32 and
/// against host mocks.
pub struct RangingEngine<'s, T, D, P> {
    trigger: T,
    delay: D,
    port: P,
    signals: &'s SharedSignals,
    timing: PulseTiming,
    stats: RangingStats,
}

impl<'s, T, D, P> RangingEngine<'s, T, D, P>
where
    T: OutputPin,
    D: DelayNs,
    P: EchoTimerPort,
{
    pub fn new(trigger: T, delay: D, port: P, signals: &'s SharedSignals, timing: PulseTiming) -> Self {
        Self {
            trigger,
            delay,
            port,
            signals,
            timing,
            stats: RangingStats::default(),
        }
    }

    /// Run one attempt and fold every failure into "no object".
    pub fn has_object(&mut self) -> bool {
        self.stats.attempts = self.stats.attempts.wrapping_add(1);
        match self.measure() {
            Ok(RangingOutcome::Echo) => {
                self.stats.echoes = self.stats.echoes.wrapping_add(1);
                trace!("ranging: echo");
                true
            }
            Ok(RangingOutcome::Timeout) => {
                self.stats.timeouts = self.stats.timeouts.wrapping_add(1);
                trace!("ranging: timeout");
                false
            }
            Err(e) => {
                self.stats.faults = self.stats.faults.wrapping_add(1);
                warn!("ranging: attempt aborted ({}), treating path as clear", e);
                false
            }
        }
    }

    /// Run one attempt and report exactly what happened.
    pub fn measure(&mut self) -> Result<RangingOutcome, RangingError<T::Error, P::Error>> {
        // Anything latched since the last teardown is stale.
        self.signals.clear_ranging();

        let mut attempt = ArmedAttempt {
            port: &mut self.port,
            signals: self.signals,
        };

        if let Err(e) = fire_trigger(&mut self.trigger, &mut self.delay, &self.timing) {
            return Err(RangingError::Trigger(e));
        }
        if let Err(e) = attempt.port.arm_edge_interrupt() {
            return Err(RangingError::Port(e));
        }
        if let Err(e) = attempt.port.start_timeout(self.timing.timeout_us) {
            return Err(RangingError::Port(e));
        }

        Ok(attempt.wait())
    }

    pub fn stats(&self) -> RangingStats {
        self.stats
    }

    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}

impl<T, D, P> ObstacleSensor for RangingEngine<'_, T, D, P>
where
    T: OutputPin,
    D: DelayNs,
    P: EchoTimerPort,
{
    fn has_object(&mut self) -> bool {
        RangingEngine::has_object(self)
    }

    fn stats(&self) -> RangingStats {
        self.stats
    }
}

/// Low for `settle_us`, high for `pulse_us`, back low.
///
/// Once the pin may have gone high, a failed write is followed by one
/// best-effort `set_low` so the sensor is not left triggering.
fn fire_trigger<T: OutputPin, D: DelayNs>(
    trigger: &mut T,
    delay: &mut D,
    timing: &PulseTiming,
) -> Result<(), T::Error> {
    trigger.set_low()?;
    delay.delay_us(timing.settle_us);
    let pulse = trigger.set_high().and_then(|()| {
        delay.delay_us(timing.pulse_us);
        trigger.set_low()
    });
    if pulse.is_err() {
        let _ = trigger.set_low();
    }
    pulse
}

/// Scope guard for one attempt. Tears the peripherals down when dropped.
struct ArmedAttempt<'a, P: EchoTimerPort> {
    port: &'a mut P,
    signals: &'a SharedSignals,
}

impl<P: EchoTimerPort> ArmedAttempt<'_, P> {
    /// Block until either flag is set. Flags are polled before every wait
    /// so an interrupt that fired during arming is not slept through.
    fn wait(&mut self) -> RangingOutcome {
        loop {
            if let Some(outcome) = self.signals.poll_ranging() {
                return outcome;
            }
            self.port.wait_for_interrupt();
        }
    }
}

impl<P: EchoTimerPort> Drop for ArmedAttempt<'_, P> {
    fn drop(&mut self) {
        if let Err(e) = self.port.disarm_edge_interrupt() {
            warn!("ranging: echo disarm failed: {:?}", e);
        }
        if let Err(e) = self.port.stop_timeout() {
            warn!("ranging: timeout stop failed: {:?}", e);
        }
        self.signals.clear_ranging();
    }
}
