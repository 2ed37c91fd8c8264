//! Error types for the rover firmware.
//!
//! Control-loop outcomes are never errors: a failed ranging attempt is
//! "no object" and a failed motor command is logged and reported as an
//! event. What remains here are start-up failures, which `main` logs before
//! halting. All variants are `Copy`.

use core::fmt;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override document is not valid JSON for [`RoverConfig`](crate::config::RoverConfig).
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl core::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Hardware initialisation errors
// ---------------------------------------------------------------------------

/// Errors during one-shot peripheral initialisation. Carries the raw
/// ESP-IDF return code where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    PwmConfigFailed(i32),
    TimerCreateFailed(i32),
    TimerStartFailed(i32),
    IsrSubscribeFailed(i32),
}

impl fmt::Display for HwInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
            Self::PwmConfigFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={rc})"),
            Self::TimerCreateFailed(rc) => write!(f, "esp_timer create failed (rc={rc})"),
            Self::TimerStartFailed(rc) => write!(f, "esp_timer start failed (rc={rc})"),
            Self::IsrSubscribeFailed(rc) => write!(f, "echo ISR subscribe failed (rc={rc})"),
        }
    }
}

impl core::error::Error for HwInitError {}
