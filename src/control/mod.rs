//! Steering motion model: bounds, unit conversion, and the ramp/slew axis.

pub mod bounds;
pub mod slew;

pub use bounds::{PulseTiming, RampRate, SteeringBounds};
pub use slew::{RampDirection, SteeringAxis};
