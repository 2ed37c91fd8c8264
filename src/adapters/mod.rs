//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                         |
//! |------------|----------------|-------------------------------------|
//! | `hardware` | EchoTimerPort  | ESP32 GPIO interrupt, esp_timer     |
//! | `log_sink` | EventSink      | Serial log output                   |
//!
//! The trigger pin, delay and motor pins implement embedded-hal traits
//! directly and need no adapter.

#[cfg(target_os = "espidf")]
pub mod hardware;
pub mod log_sink;
