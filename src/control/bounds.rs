//! Travel limits, ramp rate, and pulse-width → duty conversion.
//!
//! All positions are servo pulse widths in microseconds.  The bounds are
//! the only place positions get clamped; nothing downstream re-checks them.

use crate::error::{Error, Result};

/// Immutable (left, center, right) triple with `left < center < right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringBounds {
    left_us: f32,
    center_us: f32,
    right_us: f32,
}

impl SteeringBounds {
    pub fn new(left_us: f32, center_us: f32, right_us: f32) -> Result<Self> {
        if !(left_us.is_finite() && center_us.is_finite() && right_us.is_finite()) {
            return Err(Error::Config("steering bounds must be finite"));
        }
        if !(left_us < center_us && center_us < right_us) {
            return Err(Error::Config("steering bounds must satisfy left < center < right"));
        }
        Ok(Self {
            left_us,
            center_us,
            right_us,
        })
    }

    pub fn left(&self) -> f32 {
        self.left_us
    }

    pub fn center(&self) -> f32 {
        self.center_us
    }

    pub fn right(&self) -> f32 {
        self.right_us
    }

    /// Full travel from left to right limit.
    pub fn span(&self) -> f32 {
        self.right_us - self.left_us
    }

    pub fn clamp(&self, us: f32) -> f32 {
        us.clamp(self.left_us, self.right_us)
    }

    pub fn contains(&self, us: f32) -> bool {
        (self.left_us..=self.right_us).contains(&us)
    }
}

/// Shared rate limit for target ramping and current slewing, in µs/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampRate(f32);

impl RampRate {
    pub fn new(us_per_sec: f32) -> Result<Self> {
        if !us_per_sec.is_finite() || us_per_sec <= 0.0 {
            return Err(Error::Config("ramp rate must be finite and > 0"));
        }
        Ok(Self(us_per_sec))
    }

    pub fn us_per_sec(&self) -> f32 {
        self.0
    }

    /// Largest position change allowed over `dt_secs`.
    pub fn max_step(&self, dt_secs: f32) -> f32 {
        self.0 * dt_secs
    }
}

/// PWM period and duty resolution of the output channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseTiming {
    period_us: f32,
}

impl PulseTiming {
    /// 16-bit duty scale; `FULL_SCALE` means "always on".
    pub const FULL_SCALE: u16 = 0xFFFF;

    pub fn from_frequency(hz: u16) -> Result<Self> {
        if hz == 0 {
            return Err(Error::Config("PWM frequency must be > 0"));
        }
        Ok(Self {
            period_us: 1_000_000.0 / f32::from(hz),
        })
    }

    pub fn period_us(&self) -> f32 {
        self.period_us
    }

    /// Pulse width → duty, rounded to nearest and saturated to `0..=FULL_SCALE`.
    pub fn duty_for(&self, pulse_us: f32) -> u16 {
        let scaled = (pulse_us / self.period_us * f32::from(Self::FULL_SCALE)).round();
        // `as` saturates out-of-range floats and maps NaN to 0.
        scaled as u16
    }
}
