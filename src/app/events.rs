//! Outbound application events.
//!
//! The [`SteeringService`](super::service::SteeringService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them.

use super::commands::OverrideCommand;
use crate::error::ActuatorError;

/// Structured events emitted by the steering core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop wrote its initial center position.
    Started { center_us: f32 },

    /// A stop/center override was applied at the start of a tick.
    OverrideApplied {
        command: OverrideCommand,
        target_us: f32,
    },

    /// First failed write after a healthy period.
    ActuatorFault {
        error: ActuatorError,
        position_us: f32,
    },

    /// First successful write after one or more failures.
    ActuatorRecovered { failed_writes: u32 },

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The loop exited and the output was disabled.
    Stopped { ticks: u64 },
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub current_us: f32,
    pub target_us: f32,
    pub hold_left: bool,
    pub hold_right: bool,
    pub controller: Option<u32>,
    pub ticks: u64,
    pub overruns: u32,
    pub write_failures: u32,
}
