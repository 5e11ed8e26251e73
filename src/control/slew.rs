//! Ramped target + slew-limited current position.
//!
//! Two positions share one rate limit: while a direction is held the
//! *target* ramps toward that side, and every tick the *current* position
//! moves toward the target by at most `rate × dt`.  A stop or center is
//! therefore just a new target for the same slew logic.

use super::bounds::{RampRate, SteeringBounds};

/// Autonomous ramp direction derived from the held inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampDirection {
    Left,
    Idle,
    Right,
}

impl RampDirection {
    /// Opposite holds cancel rather than average.
    pub fn from_holds(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Self::Left,
            (false, true) => Self::Right,
            _ => Self::Idle,
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Idle => 0.0,
            Self::Right => 1.0,
        }
    }
}

/// Position state of the steering output.
#[derive(Debug, Clone)]
pub struct SteeringAxis {
    bounds: SteeringBounds,
    rate: RampRate,
    current_us: f32,
    target_us: f32,
}

impl SteeringAxis {
    /// Both positions start at center.
    pub fn new(bounds: SteeringBounds, rate: RampRate) -> Self {
        Self {
            bounds,
            rate,
            current_us: bounds.center(),
            target_us: bounds.center(),
        }
    }

    /// Advance one tick of `dt_secs` and return the new current position.
    pub fn step(&mut self, direction: RampDirection, dt_secs: f32) -> f32 {
        // NaN and negative dt collapse to a zero-length tick.
        let dt = dt_secs.max(0.0);
        let max_step = self.rate.max_step(dt);

        if direction != RampDirection::Idle {
            self.target_us = self.bounds.clamp(self.target_us + direction.sign() * max_step);
        }

        let delta = self.target_us - self.current_us;
        if delta.abs() > max_step {
            self.current_us += max_step.copysign(delta);
        } else {
            self.current_us = self.target_us;
        }
        self.current_us = self.bounds.clamp(self.current_us);
        self.current_us
    }

    /// Point the target back at center; the current position still slews.
    pub fn recenter(&mut self) {
        self.target_us = self.bounds.center();
    }

    pub fn current(&self) -> f32 {
        self.current_us
    }

    pub fn target(&self) -> f32 {
        self.target_us
    }

    pub fn bounds(&self) -> &SteeringBounds {
        &self.bounds
    }

    pub fn rate(&self) -> RampRate {
        self.rate
    }

    /// True once the current position has converged onto the target.
    pub fn is_settled(&self) -> bool {
        self.current_us == self.target_us
    }
}
