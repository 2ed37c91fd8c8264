//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the behaviour rules for the rover: the
//! walk / stop / turn cycle driven by the step counter and the obstacle
//! sensor. All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod events;
pub mod ports;
pub mod service;
