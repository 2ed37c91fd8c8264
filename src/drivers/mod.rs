//! Actuator drivers, hardware initialisation, and peripheral helpers.

#[cfg(target_os = "espidf")]
pub mod board;
pub mod hw_timer;
pub mod motor;
pub mod watchdog;
