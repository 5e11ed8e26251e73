//! Mock adapters for integration tests.
//!
//! Every mock hands out cloneable handles backed by `Arc`, so a test can
//! keep inspecting the call history after the mock itself has been moved
//! into a service or onto the control thread.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use rcsteer::app::events::AppEvent;
use rcsteer::app::ports::{ActuatorPort, EventSink, TimePort};
use rcsteer::error::ActuatorError;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetPosition(f32),
    Disabled,
    Released,
}

// ── MockActuator ──────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockActuator {
    calls: Arc<Mutex<Vec<ActuatorCall>>>,
    fail: Arc<AtomicBool>,
    released: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `set_position` fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn positions(&self) -> Vec<f32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ActuatorCall::SetPosition(us) => Some(us),
                _ => None,
            })
            .collect()
    }

    pub fn last_position(&self) -> Option<f32> {
        self.positions().last().copied()
    }
}

impl ActuatorPort for MockActuator {
    fn set_position(&mut self, pulse_us: f32) -> Result<(), ActuatorError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(ActuatorError::Released);
        }
        self.calls
            .lock()
            .unwrap()
            .push(ActuatorCall::SetPosition(pulse_us));
        if self.fail.load(Ordering::SeqCst) {
            Err(ActuatorError::I2cWriteFailed(ErrorKind::Bus))
        } else {
            Ok(())
        }
    }

    fn shutdown(&mut self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push(ActuatorCall::Disabled);
        calls.push(ActuatorCall::Released);
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Test-controlled monotonic clock.
#[derive(Clone, Default)]
pub struct ManualClock(Arc<AtomicU64>);

#[allow(dead_code)]
impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_us(&self, us: u64) -> u64 {
        self.0.fetch_add(us, Ordering::SeqCst) + us
    }
}

impl TimePort for ManualClock {
    fn now_us(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<AppEvent>>>);

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

// ── MockI2c ───────────────────────────────────────────────────

#[derive(Default)]
struct BusState {
    registers: HashMap<(u8, u8), u8>,
    pointer: u8,
    writes: Vec<(u8, Vec<u8>)>,
}

/// Register-file I²C device model.  A write of `[reg, data..]` stores
/// `data` from `reg` upward; a lone `[reg]` sets the read pointer.
#[derive(Clone, Default)]
pub struct MockI2c {
    state: Arc<Mutex<BusState>>,
    fail: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Every multi-byte write, in order, as `(address, bytes)`.
    pub fn writes(&self) -> Vec<(u8, Vec<u8>)> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }

    pub fn register(&self, address: u8, reg: u8) -> u8 {
        let state = self.state.lock().unwrap();
        state.registers.get(&(address, reg)).copied().unwrap_or(0)
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        let mut state = self.state.lock().unwrap();
        for op in operations.iter_mut() {
            match op {
                Operation::Write(bytes) => {
                    let Some((&reg, data)) = bytes.split_first() else {
                        continue;
                    };
                    state.pointer = reg;
                    if data.is_empty() {
                        continue;
                    }
                    for (i, &b) in data.iter().enumerate() {
                        state.registers.insert((address, reg.wrapping_add(i as u8)), b);
                    }
                    state.writes.push((address, bytes.to_vec()));
                }
                Operation::Read(buf) => {
                    let base = state.pointer;
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = state
                            .registers
                            .get(&(address, base.wrapping_add(i as u8)))
                            .copied()
                            .unwrap_or(0);
                    }
                }
            }
        }
        Ok(())
    }
}
