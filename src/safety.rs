//! Actuator write supervisor.
//!
//! The control loop never retries a failed write inside a tick; the next
//! tick is the retry.  The supervisor watches the stream of write results
//! so that a flaky bus is reported once on onset and once on recovery
//! instead of once per tick.
//!
//! ## Fault lifecycle
//!
//! 1. A write fails while healthy → `ActuatorFault` is emitted, the
//!    supervisor latches the faulted state.
//! 2. Further failures only bump the counters.
//! 3. The next successful write → `ActuatorRecovered` carrying the number
//!    of writes lost, and the latch clears.

use crate::app::events::AppEvent;
use crate::error::ActuatorError;
use log::{error, info};

#[derive(Debug, Default)]
pub struct ActuatorSupervisor {
    /// Failures since the last successful write.
    streak: u32,
    /// Failures since boot.
    total_failures: u32,
    faulted: bool,
}

impl ActuatorSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one write result.  Returns an event on fault/recovery edges.
    pub fn observe(
        &mut self,
        result: &Result<(), ActuatorError>,
        position_us: f32,
    ) -> Option<AppEvent> {
        match result {
            Ok(()) => {
                if !self.faulted {
                    return None;
                }
                info!("ACTUATOR FAULT CLEARED after {} failed writes", self.streak);
                let failed_writes = self.streak;
                self.faulted = false;
                self.streak = 0;
                Some(AppEvent::ActuatorRecovered { failed_writes })
            }
            Err(e) => {
                self.streak = self.streak.saturating_add(1);
                self.total_failures = self.total_failures.saturating_add(1);
                if self.faulted {
                    return None;
                }
                error!("ACTUATOR FAULT SET: {e} at {position_us:.1}us");
                self.faulted = true;
                Some(AppEvent::ActuatorFault {
                    error: *e,
                    position_us,
                })
            }
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn total_failures(&self) -> u32 {
        self.total_failures
    }
}
