//! Hardware adapter for the echo side of the ultrasonic sensor.
//!
//! [`EspEchoPort`] implements [`EchoTimerPort`] with:
//!
//! - a GPIO interrupt on the echo pin, **falling edge** (end of the echo
//!   pulse), registered once through `PinDriver::subscribe`;
//! - a one-shot esp_timer for the timeout window;
//! - a FreeRTOS task notification so the control task sleeps until either
//!   fires.
//!
//! Both interrupt paths set their flag in [`SharedSignals`] before
//! notifying, so a wake-up always finds its flag already visible.

use core::ffi::c_void;
use core::num::NonZeroU32;
use std::sync::Arc;

use esp_idf_hal::delay::TickType;
use esp_idf_hal::gpio::InterruptType;
use esp_idf_hal::task::notification::{Notification, Notifier};
use esp_idf_svc::sys::EspError;
use log::info;

use crate::app::ports::EchoTimerPort;
use crate::drivers::board::InPin;
use crate::drivers::hw_timer::HwTimer;
use crate::error::HwInitError;
use crate::signals::SharedSignals;

/// Upper bound on one sleep; the caller re-checks its flags either way.
const WAIT_MS: u64 = 10;

/// Shared by both interrupt paths. Lives for the rest of the program.
struct EchoWake {
    signals: &'static SharedSignals,
    notifier: Arc<Notifier>,
}

impl EchoWake {
    fn wake(&self) {
        // SAFETY: the notified task is the control task, which owns the
        // `Notification` for the lifetime of the program.
        unsafe {
            self.notifier.notify_and_yield(NonZeroU32::MIN);
        }
    }
}

unsafe extern "C" fn timeout_cb(arg: *mut c_void) {
    // SAFETY: `arg` is the leaked `&'static EchoWake` from `EspEchoPort::new`.
    let wake = unsafe { &*(arg as *const EchoWake) };
    wake.signals.on_timeout();
    wake.wake();
}

pub struct EspEchoPort {
    echo: InPin,
    timeout: HwTimer,
    notification: Notification,
}

impl EspEchoPort {
    pub fn new(mut echo: InPin, signals: &'static SharedSignals) -> Result<Self, HwInitError> {
        let notification = Notification::new();
        let wake: &'static EchoWake = Box::leak(Box::new(EchoWake {
            signals,
            notifier: notification.notifier(),
        }));

        echo.set_interrupt_type(InterruptType::NegEdge)
            .map_err(|e| HwInitError::IsrSubscribeFailed(e.code()))?;
        // SAFETY: the callback runs in ISR context and only touches atomics
        // and a task notification.
        unsafe {
            echo.subscribe(move || {
                wake.signals.on_echo_edge();
                wake.wake();
            })
        }
        .map_err(|e| HwInitError::IsrSubscribeFailed(e.code()))?;
        // Stays off until the first attempt arms it.
        echo.disable_interrupt()
            .map_err(|e| HwInitError::IsrSubscribeFailed(e.code()))?;

        let arg = wake as *const EchoWake as *mut c_void;
        // SAFETY: `wake` is 'static and `timeout_cb` only reads through it.
        let timeout = unsafe { HwTimer::new(c"echo_timeout", timeout_cb, arg) }
            .map_err(|e| HwInitError::TimerCreateFailed(e.code()))?;

        info!("echo: falling-edge interrupt + one-shot timeout ready");
        Ok(Self {
            echo,
            timeout,
            notification,
        })
    }
}

impl EchoTimerPort for EspEchoPort {
    type Error = EspError;

    fn arm_edge_interrupt(&mut self) -> Result<(), EspError> {
        self.echo.enable_interrupt()
    }

    fn disarm_edge_interrupt(&mut self) -> Result<(), EspError> {
        self.echo.disable_interrupt()
    }

    fn start_timeout(&mut self, duration_us: u32) -> Result<(), EspError> {
        self.timeout.start_once(u64::from(duration_us))
    }

    fn stop_timeout(&mut self) -> Result<(), EspError> {
        self.timeout.stop()
    }

    fn wait_for_interrupt(&mut self) {
        let _ = self
            .notification
            .wait(TickType::new_millis(WAIT_MS).ticks());
    }
}
