//! Dual DC motor driver (L298N-style H-bridge).
//!
//! Each motor has two direction inputs; speed comes from a PWM channel on
//! the bridge enable input, set once at start-up to a fixed duty. There is
//! no closed-loop speed control.
//!
//! | Motion  | L1 | L2 | R1 | R2 |
//! |---------|----|----|----|----|
//! | forward | H  | L  | H  | L  |
//! | stop    | L  | L  | L  | L  |
//! | turn    | H  | L  | L  | H  |
//!
//! The driver keeps no state of its own: every call writes all four pins.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::info;

use crate::app::ports::Drive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
    /// Both inputs low: the motor coasts.
    Off,
}

/// One H-bridge half: the IN1/IN2 pair of a single motor.
pub struct HBridgeChannel<P> {
    in1: P,
    in2: P,
}

impl<P: OutputPin> HBridgeChannel<P> {
    pub fn new(in1: P, in2: P) -> Self {
        Self { in1, in2 }
    }

    /// The input that has to go low is always written first, so the bridge
    /// never sees both inputs high (brake) on the way between directions.
    pub fn set(&mut self, direction: Direction) -> Result<(), P::Error> {
        match direction {
            Direction::Forward => {
                self.in2.set_low()?;
                self.in1.set_high()
            }
            Direction::Reverse => {
                self.in1.set_low()?;
                self.in2.set_high()
            }
            Direction::Off => {
                self.in1.set_low()?;
                self.in2.set_low()
            }
        }
    }
}

/// Left and right motor pairs behind the [`Drive`] port.
pub struct MotorActuator<P> {
    left: HBridgeChannel<P>,
    right: HBridgeChannel<P>,
}

impl<P: OutputPin> MotorActuator<P> {
    pub fn new(left: HBridgeChannel<P>, right: HBridgeChannel<P>) -> Self {
        Self { left, right }
    }

    fn set(&mut self, left: Direction, right: Direction) -> Result<(), P::Error> {
        self.left.set(left)?;
        self.right.set(right)
    }
}

impl<P: OutputPin> Drive for MotorActuator<P> {
    type Error = P::Error;

    fn drive_forward(&mut self) -> Result<(), Self::Error> {
        self.set(Direction::Forward, Direction::Forward)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.set(Direction::Off, Direction::Off)
    }

    fn turn(&mut self) -> Result<(), Self::Error> {
        self.set(Direction::Forward, Direction::Reverse)
    }
}

/// Program a motor enable channel with its fixed duty. Called once per
/// channel at start-up.
pub fn set_fixed_duty<C: SetDutyCycle>(channel: &mut C, duty_percent: u8) -> Result<(), C::Error> {
    channel.set_duty_cycle_percent(duty_percent.min(100))?;
    info!(
        "motor: PWM duty fixed at {}% ({}/{})",
        duty_percent,
        channel.max_duty_cycle() as u32 * duty_percent.min(100) as u32 / 100,
        channel.max_duty_cycle()
    );
    Ok(())
}
