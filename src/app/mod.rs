//! Application core: steering logic and the loop that runs it.
//!
//! Everything except [`control_task`] is pure logic.  All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod control_task;
pub mod events;
pub mod input;
pub mod ports;
pub mod service;
pub mod shared;
