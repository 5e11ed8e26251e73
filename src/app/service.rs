//! Steering service: the hexagonal core.
//!
//! [`SteeringService`] owns the motion axis and the actuator supervisor.
//! It exposes a hardware-agnostic per-tick API; all I/O flows through
//! port traits injected at call sites, so the whole control loop can be
//! driven deterministically from tests with a fake clock.
//!
//! ```text
//!  SharedSteering ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!   (holds, override) │     SteeringService     │
//!   ActuatorPort  ◀── │  axis · supervisor      │
//!                     └─────────────────────────┘
//! ```

use log::info;

use crate::config::SteeringConfig;
use crate::control::{RampDirection, SteeringAxis};
use crate::error::Result;
use crate::safety::ActuatorSupervisor;

use super::commands::OverrideCommand;
use super::events::{AppEvent, TelemetryData};
use super::input::HoldSnapshot;
use super::ports::{ActuatorPort, EventSink};
use super::shared::SharedSteering;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub current_us: f32,
    pub target_us: f32,
    pub direction: RampDirection,
    pub override_applied: Option<OverrideCommand>,
    pub write_ok: bool,
}

pub struct SteeringService {
    axis: SteeringAxis,
    supervisor: ActuatorSupervisor,
    hold_window_us: u64,
    telemetry_every: Option<u32>,
    telemetry_countdown: u32,
    last_holds: HoldSnapshot,
    tick_count: u64,
}

impl SteeringService {
    /// Construct the service from a validated configuration.
    pub fn new(config: &SteeringConfig) -> Result<Self> {
        let axis = SteeringAxis::new(config.bounds()?, config.ramp_rate()?);
        let telemetry_every = config.telemetry_every_ticks();
        Ok(Self {
            axis,
            supervisor: ActuatorSupervisor::new(),
            hold_window_us: config.hold_window_us(),
            telemetry_every,
            telemetry_countdown: telemetry_every.unwrap_or(0),
            last_holds: HoldSnapshot::default(),
            tick_count: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Write the center position before the first tick.
    pub fn start(
        &mut self,
        shared: &SharedSteering,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        let center = self.axis.bounds().center();
        shared.publish_position(self.axis.current(), self.axis.target());
        self.write(center, shared, hw, sink);
        sink.emit(&AppEvent::Started { center_us: center });
        info!("SteeringService started at {:.0}us", center);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: override → holds → ramp/slew → write.
    ///
    /// `dt_secs` is the measured time since the previous tick.  A failed
    /// write is reported and the tick still completes.
    pub fn tick(
        &mut self,
        now_us: u64,
        dt_secs: f32,
        shared: &SharedSteering,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.tick_count += 1;

        // 1. Pending stop / center from the transport.
        let override_applied = shared.input.take_override();
        if let Some(command) = override_applied {
            match command {
                OverrideCommand::Center => self.axis.recenter(),
                OverrideCommand::Stop => {}
            }
            sink.emit(&AppEvent::OverrideApplied {
                command,
                target_us: self.axis.target(),
            });
        }

        // 2. Consistent snapshot of both holds.
        let holds = shared.input.snapshot(now_us, self.hold_window_us);
        self.last_holds = holds;
        let direction = holds.direction();

        // 3. Ramp target, slew current, clamp.
        let current = self.axis.step(direction, dt_secs);
        let target = self.axis.target();
        shared.publish_position(current, target);

        // 4. Physical output.
        let write_ok = self.write(current, shared, hw, sink);

        shared.record_tick();
        self.maybe_emit_telemetry(shared, sink);

        TickReport {
            current_us: current,
            target_us: target,
            direction,
            override_applied,
            write_ok,
        }
    }

    /// Disable and release the output.  Called once the loop has exited.
    pub fn stop(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.shutdown();
        sink.emit(&AppEvent::Stopped {
            ticks: self.tick_count,
        });
        info!("SteeringService stopped after {} ticks", self.tick_count);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self, shared: &SharedSteering) -> TelemetryData {
        TelemetryData {
            current_us: self.axis.current(),
            target_us: self.axis.target(),
            hold_left: self.last_holds.left,
            hold_right: self.last_holds.right,
            controller: shared.controller.current().map(|c| c.get()),
            ticks: self.tick_count,
            overruns: shared.overruns(),
            write_failures: self.supervisor.total_failures(),
        }
    }

    pub fn current_us(&self) -> f32 {
        self.axis.current()
    }

    pub fn target_us(&self) -> f32 {
        self.axis.target()
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn write(
        &mut self,
        position_us: f32,
        shared: &SharedSteering,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let result = hw.set_position(position_us);
        if let Some(event) = self.supervisor.observe(&result, position_us) {
            sink.emit(&event);
        }
        shared.set_write_failures(self.supervisor.total_failures());
        result.is_ok()
    }

    fn maybe_emit_telemetry(&mut self, shared: &SharedSteering, sink: &mut impl EventSink) {
        let Some(every) = self.telemetry_every else {
            return;
        };
        self.telemetry_countdown = self.telemetry_countdown.saturating_sub(1);
        if self.telemetry_countdown == 0 {
            self.telemetry_countdown = every;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry(shared)));
        }
    }
}
