//! ESP32 time adapter.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: measures from a process-wide
//!   `Instant` epoch for host-side testing and simulation.
//!
//! Every adapter instance reads the same clock, so hold timestamps written
//! by the transport compare directly with the control loop's `now`.

use core::time::Duration;

use crate::app::ports::TimePort;

/// Monotonic time since boot.
#[cfg(target_os = "espidf")]
pub fn monotonic_now() -> Duration {
    // SAFETY: esp_timer_get_time is callable from any task once the
    // system timer is up, which happens before app_main.
    let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    Duration::from_micros(us as u64)
}

/// Monotonic time since first use.
#[cfg(not(target_os = "espidf"))]
pub fn monotonic_now() -> Duration {
    use std::sync::OnceLock;
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

/// Time adapter for the ESP32-S3 platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct Esp32TimeAdapter;

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl TimePort for Esp32TimeAdapter {
    fn now_us(&self) -> u64 {
        monotonic_now().as_micros() as u64
    }
}
