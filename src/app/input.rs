//! Hold timestamps and the pending override slot.
//!
//! Written by the transport on every received command, read once per tick
//! by the control loop.  Both timestamps live behind one critical-section
//! mutex so a tick always sees a consistent pair.
//!
//! Overrides arriving between two ticks are merged, not replaced: a
//! pending center survives a later stop (see [`OverrideCommand::merge`]).

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use super::commands::OverrideCommand;
use crate::control::RampDirection;

/// Sentinel timestamp: the direction has not been held recently.
pub const NEVER: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HoldTimes {
    left_us: u64,
    right_us: u64,
}

impl HoldTimes {
    const CLEARED: Self = Self {
        left_us: NEVER,
        right_us: NEVER,
    };

    fn set(&mut self, direction: Direction, ts: u64) {
        match direction {
            Direction::Left => self.left_us = ts,
            Direction::Right => self.right_us = ts,
        }
    }
}

/// Which directions were held at the snapshot instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HoldSnapshot {
    pub left: bool,
    pub right: bool,
}

impl HoldSnapshot {
    pub fn direction(self) -> RampDirection {
        RampDirection::from_holds(self.left, self.right)
    }
}

fn is_fresh(last_us: u64, now_us: u64, window_us: u64) -> bool {
    last_us != NEVER && now_us.saturating_sub(last_us) <= window_us
}

pub struct InputState {
    holds: Mutex<CriticalSectionRawMutex, Cell<HoldTimes>>,
    pending: Mutex<CriticalSectionRawMutex, Cell<Option<OverrideCommand>>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub const fn new() -> Self {
        Self {
            holds: Mutex::new(Cell::new(HoldTimes::CLEARED)),
            pending: Mutex::new(Cell::new(None)),
        }
    }

    /// Mark `direction` as held at `timestamp_us`.
    pub fn record_hold(&self, direction: Direction, timestamp_us: u64) {
        self.update(|h| h.set(direction, timestamp_us));
    }

    /// Forget `direction`; its hold-window test fails from now on.
    pub fn record_release(&self, direction: Direction) {
        self.update(|h| h.set(direction, NEVER));
    }

    /// Clear both holds and ask the loop to freeze its target.
    pub fn stop(&self) {
        self.clear();
        self.push_override(OverrideCommand::Stop);
    }

    /// Clear both holds and ask the loop to retarget center.
    pub fn center(&self) {
        self.clear();
        self.push_override(OverrideCommand::Center);
    }

    pub fn clear(&self) {
        self.holds.lock(|cell| cell.set(HoldTimes::CLEARED));
    }

    /// Read both holds together against `now_us`.
    pub fn snapshot(&self, now_us: u64, window_us: u64) -> HoldSnapshot {
        let h = self.holds.lock(Cell::get);
        HoldSnapshot {
            left: is_fresh(h.left_us, now_us, window_us),
            right: is_fresh(h.right_us, now_us, window_us),
        }
    }

    /// Last hold timestamp for `direction`, `None` if never/released.
    pub fn last_seen(&self, direction: Direction) -> Option<u64> {
        let h = self.holds.lock(Cell::get);
        let ts = match direction {
            Direction::Left => h.left_us,
            Direction::Right => h.right_us,
        };
        (ts != NEVER).then_some(ts)
    }

    /// Take the pending override, if any.
    pub fn take_override(&self) -> Option<OverrideCommand> {
        self.pending.lock(Cell::take)
    }

    fn push_override(&self, command: OverrideCommand) {
        self.pending.lock(|cell| cell.set(Some(OverrideCommand::merge(cell.get(), command))));
    }

    fn update(&self, f: impl FnOnce(&mut HoldTimes)) {
        self.holds.lock(|cell| {
            let mut h = cell.get();
            f(&mut h);
            cell.set(h);
        });
    }
}
