//! Fuzz target: `ControlLink::on_frame` feeding a live `SteeringAxis`
//!
//! Splits the input into frames, pushes them through the link and ticks
//! the steering service after each one.  The output must stay inside the
//! configured limits whatever the client sends.
//!
//! cargo fuzz run fuzz_control_link

#![no_main]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use rcsteer::app::events::AppEvent;
use rcsteer::app::ports::{ActuatorPort, EventSink, TimePort};
use rcsteer::app::service::SteeringService;
use rcsteer::app::shared::SharedSteering;
use rcsteer::config::SteeringConfig;
use rcsteer::error::ActuatorError;
use rcsteer::rpc::link::ControlLink;

#[derive(Clone)]
struct StepClock(Rc<Cell<u64>>);

impl TimePort for StepClock {
    fn now_us(&self) -> u64 {
        self.0.get()
    }
}

struct BoundsCheck;

impl ActuatorPort for BoundsCheck {
    fn set_position(&mut self, pulse_us: f32) -> Result<(), ActuatorError> {
        assert!((600.0..=2400.0).contains(&pulse_us), "wrote {pulse_us}");
        Ok(())
    }

    fn shutdown(&mut self) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SteeringConfig::default();
    let shared = Arc::new(SharedSteering::new(f32::from(config.center_us)));
    let clock = StepClock(Rc::new(Cell::new(0)));
    let link = ControlLink::new(Arc::clone(&shared), clock.clone());
    let Ok(mut svc) = SteeringService::new(&config) else {
        return;
    };
    let mut session = link.connect();

    for frame in data.split(|&b| b == b'\n') {
        link.on_frame(&mut session, frame);
        let now = clock.0.get() + 5_000;
        clock.0.set(now);
        svc.tick(now, 0.005, &shared, &mut BoundsCheck, &mut Discard);
    }
});
