//! GPIO / peripheral pin assignments for the rover main board (ESP32-S3).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers. The motor block is an L298N-style dual H-bridge
//! with its ENA/ENB inputs fed from LEDC PWM.

// ---------------------------------------------------------------------------
// Left motor
// ---------------------------------------------------------------------------

/// Direction input IN1 (HIGH with IN2 LOW = forward).
pub const MOTOR_L1_GPIO: i32 = 5;
/// Direction input IN2.
pub const MOTOR_L2_GPIO: i32 = 6;
/// ENA — LEDC channel 0.
pub const MOTOR_L_PWM_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Right motor
// ---------------------------------------------------------------------------

/// Direction input IN3 (HIGH with IN4 LOW = forward).
pub const MOTOR_R1_GPIO: i32 = 2;
/// Direction input IN4.
pub const MOTOR_R2_GPIO: i32 = 1;
/// ENB — LEDC channel 1.
pub const MOTOR_R_PWM_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Ultrasonic sensor (HC-SR04)
// ---------------------------------------------------------------------------

/// Push-pull output, idles LOW.
pub const ULTRASONIC_TRIGGER_GPIO: i32 = 11;
/// Floating input through a 5 V -> 3.3 V divider. Interrupt on falling edge.
pub const ULTRASONIC_ECHO_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits). 10-bit gives 0 – 1023 duty levels.
/// `drivers::board` maps this onto the LEDC timer; 8, 10, 12, 13 and 14
/// are accepted there.
pub const PWM_RESOLUTION_BITS: u32 = 10;
