//! One-shot peripheral initialisation.
//!
//! Claims the GPIOs named in [`pins`](crate::pins), configures the motor
//! direction outputs (all LOW), the LEDC PWM channels on the bridge enable
//! inputs at a fixed duty, the ultrasonic trigger output (LOW) and the echo
//! input. Called once from `main()` before the control loop starts.

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::{AnyInputPin, AnyOutputPin, Input, Output, PinDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, LEDC, Resolution};
use esp_idf_hal::units::FromValueType;
use esp_idf_svc::sys::{EspError, ESP_FAIL};
use log::info;

use crate::app::ports::Drive;
use crate::config::RoverConfig;
use crate::drivers::motor::{set_fixed_duty, HBridgeChannel, MotorActuator};
use crate::error::HwInitError;
use crate::pins;

pub type OutPin = PinDriver<'static, AnyOutputPin, Output>;
pub type InPin = PinDriver<'static, AnyInputPin, Input>;

/// LEDC timer resolution, chosen by [`pins::PWM_RESOLUTION_BITS`]. An
/// unsupported width fails the build.
const PWM_RESOLUTION: Resolution = match pins::PWM_RESOLUTION_BITS {
    8 => Resolution::Bits8,
    10 => Resolution::Bits10,
    12 => Resolution::Bits12,
    13 => Resolution::Bits13,
    14 => Resolution::Bits14,
    _ => panic!("PWM_RESOLUTION_BITS has no LEDC equivalent"),
};

/// Every peripheral the control loop needs, configured and idle.
pub struct Board {
    pub trigger: OutPin,
    pub echo: InPin,
    pub motors: MotorActuator<OutPin>,
    pub delay: Ets,
    /// Enable channels; held so the duty set at start-up stays applied.
    _pwm: [LedcDriver<'static>; 2],
}

fn gpio_err(e: EspError) -> HwInitError {
    HwInitError::GpioConfigFailed(e.code())
}

fn pwm_err(e: EspError) -> HwInitError {
    HwInitError::PwmConfigFailed(e.code())
}

/// embedded-hal errors carry no ESP-IDF return code.
fn hal_err(e: impl core::fmt::Debug, wrap: fn(i32) -> HwInitError) -> HwInitError {
    log::error!("board: {:?}", e);
    wrap(ESP_FAIL)
}

fn output(gpio: i32) -> Result<OutPin, HwInitError> {
    // SAFETY: every GPIO number in `pins` is claimed exactly once, here.
    let mut pin = PinDriver::output(unsafe { AnyOutputPin::new(gpio) }).map_err(gpio_err)?;
    pin.set_low().map_err(gpio_err)?;
    Ok(pin)
}

pub fn init(ledc: LEDC, config: &RoverConfig) -> Result<Board, HwInitError> {
    // ── Motor direction pins ──────────────────────────────────
    let mut motors = MotorActuator::new(
        HBridgeChannel::new(output(pins::MOTOR_L1_GPIO)?, output(pins::MOTOR_L2_GPIO)?),
        HBridgeChannel::new(output(pins::MOTOR_R1_GPIO)?, output(pins::MOTOR_R2_GPIO)?),
    );
    motors
        .stop()
        .map_err(|e| hal_err(e, HwInitError::GpioConfigFailed))?;

    // ── Motor enable PWM ──────────────────────────────────────
    let timer = LedcTimerDriver::new(
        ledc.timer0,
        &TimerConfig::new()
            .frequency(config.motor_pwm_freq_hz.Hz())
            .resolution(PWM_RESOLUTION),
    )
    .map_err(pwm_err)?;
    // The channels only need the timer configured; it runs for the whole
    // program.
    let timer = Box::leak(Box::new(timer));

    // SAFETY: see `output`.
    let mut left = LedcDriver::new(ledc.channel0, &*timer, unsafe {
        AnyOutputPin::new(pins::MOTOR_L_PWM_GPIO)
    })
    .map_err(pwm_err)?;
    // SAFETY: see `output`.
    let mut right = LedcDriver::new(ledc.channel1, &*timer, unsafe {
        AnyOutputPin::new(pins::MOTOR_R_PWM_GPIO)
    })
    .map_err(pwm_err)?;
    set_fixed_duty(&mut left, config.motor_duty_percent)
        .map_err(|e| hal_err(e, HwInitError::PwmConfigFailed))?;
    set_fixed_duty(&mut right, config.motor_duty_percent)
        .map_err(|e| hal_err(e, HwInitError::PwmConfigFailed))?;
    info!(
        "board: motor PWM {}Hz, {}-bit",
        config.motor_pwm_freq_hz,
        pins::PWM_RESOLUTION_BITS
    );

    // ── Ultrasonic sensor ─────────────────────────────────────
    let trigger = output(pins::ULTRASONIC_TRIGGER_GPIO)?;
    // SAFETY: see `output`.
    let echo = PinDriver::input(unsafe { AnyInputPin::new(pins::ULTRASONIC_ECHO_GPIO) })
        .map_err(gpio_err)?;

    info!("board: all peripherals configured");
    Ok(Board {
        trigger,
        echo,
        motors,
        delay: Ets,
        _pwm: [left, right],
    })
}
