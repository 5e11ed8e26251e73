//! Steering configuration parameters
//!
//! All tunable parameters for the steering controller.
//! Values can be overridden via NVS (non-volatile storage).

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::{PulseTiming, RampRate, SteeringBounds};
use crate::error::Result;

/// Core steering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteeringConfig {
    // --- Output ---
    /// PCA9685 output channel driving the steering servo (0-15)
    pub servo_channel: u8,
    /// PWM frequency in Hz (servo frame rate)
    pub pwm_frequency_hz: u16,

    // --- Travel ---
    /// Pulse width at full left lock (µs)
    pub left_limit_us: u16,
    /// Pulse width for straight ahead (µs)
    pub center_us: u16,
    /// Pulse width at full right lock (µs)
    pub right_limit_us: u16,

    // --- Motion ---
    /// Ramp and slew rate (µs per second)
    pub ramp_rate_us_per_sec: f32,

    // --- Timing ---
    /// Control loop period (milliseconds)
    pub tick_interval_ms: u32,
    /// A direction stays held this long after its last message (milliseconds)
    pub hold_window_ms: u32,
    /// Telemetry log interval (milliseconds, 0 = off)
    pub telemetry_interval_ms: u32,

    // --- Network ---
    /// HTTP / WebSocket listen port
    pub http_port: u16,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            // Output
            servo_channel: 0,
            pwm_frequency_hz: 50, // 20 ms frame

            // Travel
            left_limit_us: 600,
            center_us: 1800,
            right_limit_us: 2400,

            // Motion
            ramp_rate_us_per_sec: 1000.0,

            // Timing
            tick_interval_ms: 5,        // 200 Hz
            hold_window_ms: 70,         // client keep-alive is 40 ms
            telemetry_interval_ms: 5000,

            // Network
            http_port: 8000,
        }
    }
}

impl SteeringConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if self.servo_channel > 15 {
            return Err(ConfigError::ValidationFailed("servo_channel must be 0–15"));
        }
        // PCA9685 prescaler limits (prescale 3..=255 at 25 MHz).
        if !(24..=1526).contains(&self.pwm_frequency_hz) {
            return Err(ConfigError::ValidationFailed(
                "pwm_frequency_hz must be 24–1526",
            ));
        }
        if self.left_limit_us == 0 {
            return Err(ConfigError::ValidationFailed("left_limit_us must be > 0"));
        }
        if !(self.left_limit_us < self.center_us && self.center_us < self.right_limit_us) {
            return Err(ConfigError::ValidationFailed(
                "limits must satisfy left_limit_us < center_us < right_limit_us",
            ));
        }
        if f32::from(self.right_limit_us) >= self.pwm_period_us() {
            return Err(ConfigError::ValidationFailed(
                "right_limit_us must be shorter than the PWM period",
            ));
        }
        if !self.ramp_rate_us_per_sec.is_finite()
            || !(1.0..=100_000.0).contains(&self.ramp_rate_us_per_sec)
        {
            return Err(ConfigError::ValidationFailed(
                "ramp_rate_us_per_sec must be 1–100000",
            ));
        }
        if !(1..=100).contains(&self.tick_interval_ms) {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be 1–100"));
        }
        if self.hold_window_ms < self.tick_interval_ms || self.hold_window_ms > 2000 {
            return Err(ConfigError::ValidationFailed(
                "hold_window_ms must be tick_interval_ms–2000",
            ));
        }
        if self.telemetry_interval_ms != 0 && self.telemetry_interval_ms < self.tick_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_ms must be 0 or ≥ tick_interval_ms",
            ));
        }
        if self.http_port == 0 {
            return Err(ConfigError::ValidationFailed("http_port must be non-zero"));
        }
        Ok(())
    }

    pub fn bounds(&self) -> Result<SteeringBounds> {
        SteeringBounds::new(
            f32::from(self.left_limit_us),
            f32::from(self.center_us),
            f32::from(self.right_limit_us),
        )
    }

    pub fn ramp_rate(&self) -> Result<RampRate> {
        RampRate::new(self.ramp_rate_us_per_sec)
    }

    pub fn pulse_timing(&self) -> Result<PulseTiming> {
        PulseTiming::from_frequency(self.pwm_frequency_hz)
    }

    /// PWM period in microseconds (`1e6 / pwm_frequency_hz`).
    pub fn pwm_period_us(&self) -> f32 {
        1_000_000.0 / f32::from(self.pwm_frequency_hz.max(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    pub fn hold_window_us(&self) -> u64 {
        u64::from(self.hold_window_ms) * 1000
    }

    /// Control ticks between telemetry reports, `None` when disabled.
    pub fn telemetry_every_ticks(&self) -> Option<u32> {
        if self.telemetry_interval_ms == 0 {
            return None;
        }
        Some((self.telemetry_interval_ms / self.tick_interval_ms.max(1)).max(1))
    }
}
