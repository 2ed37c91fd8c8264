//! System configuration parameters
//!
//! All tunable parameters for the rover. Defaults reproduce the reference
//! robot: 5 ms tick, 1 s walking legs, 750 ms turns, a 640 us echo window
//! and 25 % motor duty.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Speed of sound in dry air at ~20 °C, in millimetres per microsecond.
const SPEED_OF_SOUND_MM_PER_US: f32 = 0.343;

/// Core rover configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverConfig {
    // --- Timebase ---
    /// Tick source period (milliseconds)
    pub tick_period_ms: u32,

    // --- Behaviour ---
    /// Ticks spent walking before the rover turns (exclusive upper bound)
    pub walk_duration_ticks: u32,
    /// The turn ends once the step counter exceeds this many ticks
    pub turn_duration_ticks: u32,

    // --- Ultrasonic ranging ---
    /// Trigger held low before the pulse (microseconds)
    pub trigger_settle_us: u32,
    /// Trigger pulse width (microseconds)
    pub trigger_pulse_us: u32,
    /// Echo timeout window (microseconds); doubles as the detection radius
    pub echo_timeout_us: u32,

    // --- Motors ---
    /// Fixed motor PWM duty cycle (0-100%)
    pub motor_duty_percent: u8,
    /// Motor PWM frequency (Hz)
    pub motor_pwm_freq_hz: u32,

    // --- Housekeeping ---
    /// Loop iterations between telemetry events (0 disables telemetry)
    pub telemetry_interval_loops: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            // Timebase
            tick_period_ms: 5,

            // Behaviour
            walk_duration_ticks: 200, // 1 s
            turn_duration_ticks: 150, // 750 ms

            // Ranging
            trigger_settle_us: 2,
            trigger_pulse_us: 10,
            echo_timeout_us: 640, // 10 x 64 us prescaled timer ticks

            // Motors
            motor_duty_percent: 25,
            motor_pwm_freq_hz: 2_000,

            // Housekeeping
            telemetry_interval_loops: 2_000,
            watchdog_timeout_ms: 2_000,
        }
    }
}

impl RoverConfig {
    /// Parse a JSON override and validate it.
    ///
    /// Missing fields fall back to their defaults, so a partial document
    /// such as `{"motor_duty_percent": 40}` is accepted.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values. Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_period_ms must be > 0"));
        }
        if self.walk_duration_ticks == 0 {
            return Err(ConfigError::ValidationFailed(
                "walk_duration_ticks must be > 0",
            ));
        }
        if self.trigger_pulse_us < 10 {
            return Err(ConfigError::ValidationFailed(
                "trigger_pulse_us must be >= 10",
            ));
        }
        if self.trigger_settle_us < 2 {
            return Err(ConfigError::ValidationFailed(
                "trigger_settle_us must be >= 2",
            ));
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::ValidationFailed("echo_timeout_us must be > 0"));
        }
        // A ranging attempt must fit inside one tick.
        if self.echo_timeout_us >= self.tick_period_ms.saturating_mul(1_000) {
            return Err(ConfigError::ValidationFailed(
                "echo_timeout_us must be shorter than one tick",
            ));
        }
        if self.motor_duty_percent == 0 || self.motor_duty_percent > 100 {
            return Err(ConfigError::ValidationFailed(
                "motor_duty_percent must be 1-100",
            ));
        }
        if self.motor_pwm_freq_hz == 0 {
            return Err(ConfigError::ValidationFailed(
                "motor_pwm_freq_hz must be > 0",
            ));
        }
        if self.watchdog_timeout_ms <= self.tick_period_ms {
            return Err(ConfigError::ValidationFailed(
                "watchdog_timeout_ms must exceed one tick",
            ));
        }
        Ok(())
    }

    /// Effective detection radius encoded by the echo timeout window (mm).
    pub fn detection_range_mm(&self) -> u32 {
        (self.echo_timeout_us as f32 * SPEED_OF_SOUND_MM_PER_US / 2.0) as u32
    }

    /// Walking leg duration in milliseconds. Widened so any pair of `u32`
    /// fields the validator accepts fits.
    pub fn walk_duration_ms(&self) -> u64 {
        u64::from(self.walk_duration_ticks) * u64::from(self.tick_period_ms)
    }

    /// Turn duration in milliseconds.
    pub fn turn_duration_ms(&self) -> u64 {
        u64::from(self.turn_duration_ticks) * u64::from(self.tick_period_ms)
    }
}
