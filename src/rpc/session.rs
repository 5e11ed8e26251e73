//! Per-connection session state.
//!
//! Each WebSocket connection gets a [`Session`] carrying the controller id
//! it claimed on connect and a token-bucket rate limiter.  The bucket
//! starts full, so a client gets `RATE_BURST` frames immediately and then
//! `RATE_PER_SEC` frames per second.

use burster::Limiter;
use core::time::Duration;
use heapless::Vec;

use crate::adapters::time::monotonic_now;
use crate::app::shared::ControllerId;

/// Maximum concurrently open control connections.
pub const MAX_SESSIONS: usize = 4;

/// Sustained frames per second per connection.
pub const RATE_PER_SEC: u64 = 50;

/// Frames accepted back-to-back before throttling starts.
pub const RATE_BURST: u64 = 50;

pub struct Session {
    controller: ControllerId,
    rate_limiter: burster::TokenBucket<fn() -> Duration>,
    accepted: u32,
    dropped: u32,
}

impl Session {
    pub fn new(controller: ControllerId) -> Self {
        Self {
            controller,
            rate_limiter: burster::TokenBucket::new_with_time_provider(
                RATE_PER_SEC,
                RATE_BURST,
                monotonic_now as fn() -> Duration,
            ),
            accepted: 0,
            dropped: 0,
        }
    }

    pub fn controller(&self) -> ControllerId {
        self.controller
    }

    /// Spend one token.  Returns `false` when the client is over its rate.
    pub fn try_admit(&mut self) -> bool {
        if self.rate_limiter.try_consume(1).is_ok() {
            self.accepted = self.accepted.saturating_add(1);
            true
        } else {
            self.dropped = self.dropped.saturating_add(1);
            false
        }
    }

    /// Count a frame that bypasses the bucket.
    pub fn admit_unmetered(&mut self) {
        self.accepted = self.accepted.saturating_add(1);
    }

    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Fixed-capacity map from transport connection handle to [`Session`].
#[derive(Default)]
pub struct SessionTable {
    entries: Vec<(i32, Session), MAX_SESSIONS>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` under `handle`, replacing any stale entry with
    /// the same handle.  Hands the session back when the table is full.
    pub fn insert(&mut self, handle: i32, session: Session) -> Result<(), Session> {
        if let Some(slot) = self.get_mut(handle) {
            *slot = session;
            return Ok(());
        }
        self.entries
            .push((handle, session))
            .map_err(|(_, session)| session)
    }

    /// Register `session`, evicting the oldest entry whose controller
    /// fails `is_current` when the table is full.  Returns the evicted
    /// entry, or hands `session` back if every entry is still current.
    pub fn insert_evicting(
        &mut self,
        handle: i32,
        session: Session,
        is_current: impl Fn(ControllerId) -> bool,
    ) -> Result<Option<(i32, Session)>, Session> {
        if !self.entries.is_full() || self.get_mut(handle).is_some() {
            return self.insert(handle, session).map(|()| None);
        }
        let Some(idx) = self
            .entries
            .iter()
            .position(|(_, s)| !is_current(s.controller()))
        else {
            return Err(session);
        };
        let evicted = self.entries.remove(idx);
        self.insert(handle, session).map(|()| Some(evicted))
    }

    pub fn get_mut(&mut self, handle: i32) -> Option<&mut Session> {
        self.entries
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, s)| s)
    }

    pub fn remove(&mut self, handle: i32) -> Option<Session> {
        let idx = self.entries.iter().position(|(h, _)| *h == handle)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
