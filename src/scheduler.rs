//! Fixed-rate tick scheduler.
//!
//! Deadlines accumulate (`next = previous + period`) instead of restarting
//! the interval after each tick, so the long-run tick rate converges to
//! `1 / period` even when individual ticks run late.  `dt` handed to the
//! control loop is always the *measured* time since the previous tick.
//!
//! ```text
//!  deadline:   D0        D1        D2        D3
//!  ticks:      |T0       | T1 (late)   |T2   |T3
//!              ◀─period─▶◀─period─▶◀─period─▶
//!  T2 runs early relative to T1 so the schedule catches back up.
//! ```
//!
//! If the loop falls more than [`MAX_CATCH_UP_PERIODS`] behind (debugger
//! halt, flash write stall) the schedule resyncs to now instead of
//! replaying a burst of back-to-back ticks.

use core::time::Duration;

/// Lag (in periods) beyond which the deadline is reset to now.
pub const MAX_CATCH_UP_PERIODS: u64 = 8;

#[derive(Debug, Clone)]
pub struct TickScheduler {
    period_us: u64,
    next_deadline_us: u64,
    last_tick_us: Option<u64>,
    ticks: u64,
    overruns: u32,
    resyncs: u32,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period_us: (period.as_micros() as u64).max(1),
            next_deadline_us: 0,
            last_tick_us: None,
            ticks: 0,
            overruns: 0,
            resyncs: 0,
        }
    }

    /// Anchor the schedule: the first tick is due one period after `now_us`.
    pub fn start(&mut self, now_us: u64) {
        self.last_tick_us = Some(now_us);
        self.next_deadline_us = now_us.saturating_add(self.period_us);
    }

    pub fn period_us(&self) -> u64 {
        self.period_us
    }

    /// How long to sleep before the next tick is due (zero if overdue).
    pub fn time_until_due(&self, now_us: u64) -> Duration {
        Duration::from_micros(self.next_deadline_us.saturating_sub(now_us))
    }

    pub fn is_due(&self, now_us: u64) -> bool {
        now_us >= self.next_deadline_us
    }

    /// Mark a tick as starting at `now_us`; returns `dt` in seconds since
    /// the previous tick (or since [`start`](Self::start)).
    pub fn begin_tick(&mut self, now_us: u64) -> f32 {
        let last = self.last_tick_us.unwrap_or(now_us);
        let dt_us = now_us.saturating_sub(last);
        self.last_tick_us = Some(now_us);
        self.ticks += 1;

        let lateness = now_us.saturating_sub(self.next_deadline_us);
        if lateness >= self.period_us {
            self.overruns = self.overruns.saturating_add(1);
        }

        self.next_deadline_us = self.next_deadline_us.saturating_add(self.period_us);
        if lateness > MAX_CATCH_UP_PERIODS * self.period_us {
            self.resyncs = self.resyncs.saturating_add(1);
            log::warn!("scheduler: {}us behind, resyncing", lateness);
            self.next_deadline_us = now_us.saturating_add(self.period_us);
        }

        dt_us as f32 / 1_000_000.0
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks that started a full period or more past their deadline.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    pub fn resyncs(&self) -> u32 {
        self.resyncs
    }
}
