//! State shared between the control task and the transport handlers.
//!
//! One [`SharedSteering`] is created at startup and handed out as an
//! `Arc` to both sides.  The transport writes holds, overrides and the
//! controller slot; the control task publishes positions and counters.

use core::cell::Cell;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use super::input::InputState;

// ───────────────────────────────────────────────────────────────
// Controller ownership
// ───────────────────────────────────────────────────────────────

/// Identifier of a transport connection that claimed control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(u32);

impl ControllerId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Last-connect-wins owner slot.  `0` means no controller.
pub struct ControllerSlot {
    current: AtomicU32,
    next_id: AtomicU32,
}

impl Default for ControllerSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerSlot {
    pub const fn new() -> Self {
        Self {
            current: AtomicU32::new(0),
            next_id: AtomicU32::new(1),
        }
    }

    /// Take control unconditionally.  Returns the new id and the one it
    /// superseded, if any.
    pub fn claim(&self) -> (ControllerId, Option<ControllerId>) {
        let id = loop {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                break id;
            }
        };
        let prev = self.current.swap(id, Ordering::AcqRel);
        (ControllerId(id), (prev != 0).then_some(ControllerId(prev)))
    }

    pub fn is_current(&self, id: ControllerId) -> bool {
        self.current.load(Ordering::Acquire) == id.0
    }

    /// Give up control if `id` still holds it.
    pub fn release(&self, id: ControllerId) -> bool {
        self.current
            .compare_exchange(id.0, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn current(&self) -> Option<ControllerId> {
        match self.current.load(Ordering::Acquire) {
            0 => None,
            id => Some(ControllerId(id)),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Published positions
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSnapshot {
    pub current_us: f32,
    pub target_us: f32,
}

// ───────────────────────────────────────────────────────────────
// SharedSteering
// ───────────────────────────────────────────────────────────────

pub struct SharedSteering {
    pub input: InputState,
    pub controller: ControllerSlot,
    position: Mutex<CriticalSectionRawMutex, Cell<PositionSnapshot>>,
    running: AtomicBool,
    ticks: AtomicU32,
    overruns: AtomicU32,
    write_failures: AtomicU32,
}

impl SharedSteering {
    /// Fresh state with both positions at `center_us`.
    pub fn new(center_us: f32) -> Self {
        Self {
            input: InputState::new(),
            controller: ControllerSlot::new(),
            position: Mutex::new(Cell::new(PositionSnapshot {
                current_us: center_us,
                target_us: center_us,
            })),
            running: AtomicBool::new(true),
            ticks: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
            write_failures: AtomicU32::new(0),
        }
    }

    pub fn publish_position(&self, current_us: f32, target_us: f32) {
        self.position.lock(|cell| {
            cell.set(PositionSnapshot {
                current_us,
                target_us,
            });
        });
    }

    pub fn position(&self) -> PositionSnapshot {
        self.position.lock(Cell::get)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask the control task to finish its current tick and exit.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn set_overruns(&self, n: u32) {
        self.overruns.store(n, Ordering::Relaxed);
    }

    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    pub fn set_write_failures(&self, n: u32) {
        self.write_failures.store(n, Ordering::Relaxed);
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures.load(Ordering::Relaxed)
    }
}
