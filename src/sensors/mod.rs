//! Sensor subsystem.
//!
//! The rover has a single sensor: an HC-SR04 ultrasonic ranger driven by
//! [`ultrasonic::RangingEngine`], which implements the
//! [`ObstacleSensor`](crate::app::ports::ObstacleSensor) port.

pub mod ultrasonic;

pub use ultrasonic::{PulseTiming, RangingEngine, RangingError, RangingOutcome, RangingStats};
