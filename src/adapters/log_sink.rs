//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | cur={:.0}us tgt={:.0}us | hold L={} R={} | ctl={} | \
                     ticks={} overruns={} write_fails={}",
                    t.current_us,
                    t.target_us,
                    u8::from(t.hold_left),
                    u8::from(t.hold_right),
                    t.controller.map_or_else(|| "-".into(), |c| format!("#{c}")),
                    t.ticks,
                    t.overruns,
                    t.write_failures,
                );
            }
            AppEvent::OverrideApplied { command, target_us } => {
                info!("OVERRIDE | {:?} -> target={:.0}us", command, target_us);
            }
            AppEvent::ActuatorFault { error, position_us } => {
                warn!("FAULT | write failed at {:.0}us: {}", position_us, error);
            }
            AppEvent::ActuatorRecovered { failed_writes } => {
                info!("FAULT | cleared after {} failed writes", failed_writes);
            }
            AppEvent::Started { center_us } => {
                info!("START | center={:.0}us", center_us);
            }
            AppEvent::Stopped { ticks } => {
                info!("STOP | output disabled after {} ticks", ticks);
            }
        }
    }
}
