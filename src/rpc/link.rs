//! Transport-facing control link.
//!
//! [`ControlLink`] is the single entry point the WebSocket server calls:
//!
//! ```text
//!   open  ──▶ connect()     claim control (last connect wins)
//!   frame ──▶ on_frame()    supersede check → decode → rate limit (holds) → InputState
//!   close ──▶ disconnect()  release control if still held
//!   GET /health ──▶ health()
//! ```
//!
//! It never blocks and never touches the actuator; the control loop picks
//! up whatever was written to [`InputState`](crate::app::input::InputState)
//! on its next tick.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::app::commands::SteerCommand;
use crate::app::input::Direction;
use crate::app::ports::TimePort;
use crate::app::shared::SharedSteering;

use super::codec::{DecodeError, decode_command};
use super::session::{Session, SessionTable};

/// What happened to one received frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Decoded and written to the input state.
    Applied,
    /// Not a recognised command; dropped without reply.
    Ignored,
    /// Sender lost control to a newer connection; dropped.
    Superseded,
    /// Sender exceeded its frame rate; dropped.
    RateLimited,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub cur_us: i32,
    pub target_us: i32,
    pub controller: Option<u32>,
    pub ticks: u32,
    pub write_failures: u32,
}

pub struct ControlLink<T: TimePort> {
    shared: Arc<SharedSteering>,
    clock: T,
}

impl<T: TimePort> ControlLink<T> {
    pub fn new(shared: Arc<SharedSteering>, clock: T) -> Self {
        Self { shared, clock }
    }

    pub fn shared(&self) -> &Arc<SharedSteering> {
        &self.shared
    }

    /// A new connection takes control.  Holds from the previous
    /// controller stay in place and expire through the hold window.
    pub fn connect(&self) -> Session {
        let (id, prev) = self.shared.controller.claim();
        match prev {
            Some(prev) => info!("Controller {} connected, superseding {}", id, prev),
            None => info!("Controller {} connected", id),
        }
        Session::new(id)
    }

    /// Connect and register the session under `handle`.  A full table
    /// makes room by dropping a connection that has already lost control.
    pub fn open(&self, table: &mut SessionTable, handle: i32) -> bool {
        let slot = &self.shared.controller;
        match table.insert_evicting(handle, self.connect(), |id| slot.is_current(id)) {
            Ok(None) => true,
            Ok(Some((old, evicted))) => {
                info!("Session table full, evicting connection {}", old);
                self.disconnect(evicted);
                true
            }
            Err(session) => {
                warn!("Session table full, refusing connection {}", handle);
                self.disconnect(session);
                false
            }
        }
    }

    pub fn on_frame(&self, session: &mut Session, frame: &[u8]) -> FrameOutcome {
        if !self.shared.controller.is_current(session.controller()) {
            return FrameOutcome::Superseded;
        }

        let command = match decode_command(frame) {
            Ok(command) => command,
            Err(DecodeError::TooLong(len)) => {
                warn!("Controller {}: dropped {} byte frame", session.controller(), len);
                return FrameOutcome::Ignored;
            }
            Err(e) => {
                debug!("Controller {}: {}", session.controller(), e);
                return FrameOutcome::Ignored;
            }
        };

        // Stop and center are never throttled.
        let admitted = match command {
            SteerCommand::Hold { .. } => session.try_admit(),
            SteerCommand::Stop | SteerCommand::Center => {
                session.admit_unmetered();
                true
            }
        };
        if !admitted {
            if session.dropped().is_power_of_two() {
                warn!(
                    "Controller {}: rate limited ({} dropped)",
                    session.controller(),
                    session.dropped()
                );
            }
            return FrameOutcome::RateLimited;
        }

        self.apply(command);
        FrameOutcome::Applied
    }

    /// Connection closed.  Returns `true` if it still held control.
    pub fn disconnect(&self, session: Session) -> bool {
        let released = self.shared.controller.release(session.controller());
        info!(
            "Controller {} disconnected ({} frames, {} dropped{})",
            session.controller(),
            session.accepted(),
            session.dropped(),
            if released { ", control released" } else { "" }
        );
        released
    }

    pub fn health(&self) -> HealthReport {
        let position = self.shared.position();
        HealthReport {
            ok: self.shared.is_running(),
            cur_us: position.current_us as i32,
            target_us: position.target_us as i32,
            controller: self.shared.controller.current().map(|c| c.get()),
            ticks: self.shared.ticks(),
            write_failures: self.shared.write_failures(),
        }
    }

    fn apply(&self, command: SteerCommand) {
        let input = &self.shared.input;
        match command {
            SteerCommand::Hold { left, right } => {
                let now = self.clock.now_us();
                for (direction, held) in [(Direction::Left, left), (Direction::Right, right)] {
                    match held {
                        Some(true) => input.record_hold(direction, now),
                        Some(false) => input.record_release(direction),
                        None => {}
                    }
                }
            }
            SteerCommand::Stop => input.stop(),
            SteerCommand::Center => input.center(),
        }
    }
}
