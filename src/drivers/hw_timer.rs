//! Hardware timers on top of ESP-IDF's esp_timer API.
//!
//! Two timers run the rover:
//!
//! - the **tick timer**, periodic at `tick_period_ms`, which advances the
//!   step counter in [`SharedSignals`];
//! - the **echo timeout**, a one-shot armed once per ranging attempt (owned
//!   by the echo adapter).
//!
//! Timer callbacks execute in the ESP timer task context (not ISR) and only
//! touch atomics. On simulation targets the tick timer is a background
//! thread that sleeps between ticks.

use crate::error::HwInitError;
use crate::signals::SharedSignals;

#[cfg(target_os = "espidf")]
use core::ffi::{CStr, c_void};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

// ── Raw esp_timer handle ──────────────────────────────────────

/// Callback signature expected by `esp_timer_create`.
#[cfg(target_os = "espidf")]
pub type TimerCallback = unsafe extern "C" fn(*mut c_void);

/// Owned esp_timer handle. Stopped and deleted on drop.
#[cfg(target_os = "espidf")]
pub struct HwTimer {
    handle: esp_timer_handle_t,
}

#[cfg(target_os = "espidf")]
impl HwTimer {
    /// Create a stopped timer dispatched from the esp_timer task.
    ///
    /// # Safety
    ///
    /// `arg` must stay valid for as long as the timer exists, and
    /// `callback` may only read through it.
    pub unsafe fn new(
        name: &'static CStr,
        callback: TimerCallback,
        arg: *mut c_void,
    ) -> Result<Self, EspError> {
        let args = esp_timer_create_args_t {
            callback: Some(callback),
            arg,
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: name.as_ptr(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: `args` outlives the call; `handle` is a valid out-pointer.
        esp!(unsafe { esp_timer_create(&args, &mut handle) })?;
        Ok(Self { handle })
    }

    pub fn start_periodic(&mut self, period_us: u64) -> Result<(), EspError> {
        // SAFETY: handle was created in `new` and is deleted only in Drop.
        esp!(unsafe { esp_timer_start_periodic(self.handle, period_us) })
    }

    pub fn start_once(&mut self, timeout_us: u64) -> Result<(), EspError> {
        // SAFETY: see `start_periodic`.
        esp!(unsafe { esp_timer_start_once(self.handle, timeout_us) })
    }

    /// Stop the timer. Stopping a timer that is not running is not an error.
    pub fn stop(&mut self) -> Result<(), EspError> {
        // SAFETY: see `start_periodic`.
        let rc = unsafe { esp_timer_stop(self.handle) };
        if rc == ESP_ERR_INVALID_STATE as esp_err_t {
            return Ok(());
        }
        esp!(rc)
    }
}

#[cfg(target_os = "espidf")]
impl Drop for HwTimer {
    fn drop(&mut self) {
        // SAFETY: the handle is valid and never used after this point.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

// ── Tick timer ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut c_void) {
    // SAFETY: `arg` is the `&'static SharedSignals` passed to
    // `start_tick_timer`.
    let signals = unsafe { &*(arg as *const SharedSignals) };
    signals.on_tick();
}

/// Periodic step-counter source. Ticking stops when this is dropped.
pub struct TickTimer {
    #[cfg(target_os = "espidf")]
    _timer: HwTimer,

    #[cfg(not(target_os = "espidf"))]
    stop: std::sync::Arc<core::sync::atomic::AtomicBool>,
    #[cfg(not(target_os = "espidf"))]
    thread: Option<std::thread::JoinHandle<()>>,
}

/// Start the periodic tick that drives the step counter.
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(
    signals: &'static SharedSignals,
    period_ms: u32,
) -> Result<TickTimer, HwInitError> {
    let arg = signals as *const SharedSignals as *mut c_void;
    // SAFETY: `signals` is 'static and `tick_cb` only calls `on_tick`.
    let mut timer = unsafe { HwTimer::new(c"tick", tick_cb, arg) }
        .map_err(|e| HwInitError::TimerCreateFailed(e.code()))?;
    timer
        .start_periodic(u64::from(period_ms) * 1_000)
        .map_err(|e| HwInitError::TimerStartFailed(e.code()))?;

    info!("hw_timer: tick@{}ms started", period_ms);
    Ok(TickTimer { _timer: timer })
}

#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(
    signals: &'static SharedSignals,
    period_ms: u32,
) -> Result<TickTimer, HwInitError> {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    let stop = Arc::new(AtomicBool::new(false));
    let period = Duration::from_millis(u64::from(period_ms.max(1)));
    let thread = std::thread::Builder::new()
        .name("tick".into())
        .spawn({
            let stop = Arc::clone(&stop);
            move || {
                while !stop.load(Ordering::Relaxed) {
                    std::thread::sleep(period);
                    signals.on_tick();
                }
            }
        })
        .map_err(|_| HwInitError::TimerCreateFailed(-1))?;

    info!("hw_timer(sim): tick@{}ms on a sleep thread", period_ms);
    Ok(TickTimer {
        stop,
        thread: Some(thread),
    })
}

#[cfg(not(target_os = "espidf"))]
impl Drop for TickTimer {
    fn drop(&mut self) {
        self.stop
            .store(true, core::sync::atomic::Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
