//! End-to-end steering behaviour on simulated time.
//!
//! Drives [`SteeringService`] tick by tick at the default 5 ms period and
//! 1000 µs/s rate, so every tick moves a position by exactly 5 µs.

use rcsteer::app::events::AppEvent;
use rcsteer::app::input::Direction;
use rcsteer::app::service::{SteeringService, TickReport};
use rcsteer::app::shared::SharedSteering;
use rcsteer::config::SteeringConfig;

use crate::mock_hw::{ActuatorCall, MockActuator, RecordingSink};

const TICK_US: u64 = 5_000;
const DT: f32 = 0.005;
/// Client keep-alive period, in ticks (40 ms).
const KEEPALIVE_TICKS: u32 = 8;

struct Rig {
    svc: SteeringService,
    shared: SharedSteering,
    hw: MockActuator,
    sink: RecordingSink,
    now_us: u64,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(&SteeringConfig::default())
    }

    fn with_config(config: &SteeringConfig) -> Self {
        let mut rig = Self {
            svc: SteeringService::new(config).unwrap(),
            shared: SharedSteering::new(f32::from(config.center_us)),
            hw: MockActuator::new(),
            sink: RecordingSink::new(),
            now_us: 0,
        };
        rig.svc.start(&rig.shared, &mut rig.hw, &mut rig.sink);
        rig
    }

    fn tick(&mut self) -> TickReport {
        self.now_us += TICK_US;
        self.svc.tick(self.now_us, DT, &self.shared, &mut self.hw, &mut self.sink)
    }

    fn run(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Hold `directions` for `ticks`, re-sending on the keep-alive period.
    fn hold(&mut self, directions: &[Direction], ticks: u32) {
        for i in 0..ticks {
            if i % KEEPALIVE_TICKS == 0 {
                for &d in directions {
                    self.shared.input.record_hold(d, self.now_us);
                }
            }
            self.tick();
        }
    }

    fn current(&self) -> f32 {
        self.svc.current_us()
    }

    fn target(&self) -> f32 {
        self.svc.target_us()
    }
}

#[test]
fn starts_by_writing_center() {
    let rig = Rig::new();
    assert_eq!(rig.hw.calls(), vec![ActuatorCall::SetPosition(1800.0)]);
    assert_eq!(rig.shared.position().current_us, 1800.0);
}

#[test]
fn idle_inputs_hold_center() {
    let mut rig = Rig::new();
    rig.run(50);
    assert_eq!(rig.current(), 1800.0);
    assert_eq!(rig.target(), 1800.0);
    assert!(rig.hw.positions().iter().all(|&p| p == 1800.0));
}

#[test]
fn holding_left_for_200ms_moves_target_200us() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Left], 40);
    rig.shared.input.record_release(Direction::Left);
    assert!((rig.target() - 1600.0).abs() < 0.05);

    rig.run(20);
    assert!((rig.target() - 1600.0).abs() < 0.05);
    assert!((rig.current() - 1600.0).abs() < 0.05);
}

#[test]
fn holding_right_for_1200ms_saturates_at_right_limit() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Right], 119);
    assert!(rig.target() < 2400.0);

    // 600 ms in: 600 µs of travel puts both positions on the limit.
    rig.hold(&[Direction::Right], 1);
    assert_eq!(rig.target(), 2400.0);
    assert_eq!(rig.current(), 2400.0);

    // Remaining 600 ms of the 1.2 s hold.
    for i in 0..120 {
        if i % KEEPALIVE_TICKS == 0 {
            rig.shared.input.record_hold(Direction::Right, rig.now_us);
        }
        let report = rig.tick();
        assert_eq!(report.target_us, 2400.0);
        assert_eq!(report.current_us, 2400.0);
    }
    assert!(rig.hw.positions().iter().all(|&p| p <= 2400.0));
}

#[test]
fn single_message_holds_for_the_window_only() {
    let mut rig = Rig::new();
    rig.shared.input.record_hold(Direction::Right, rig.now_us);
    rig.run(30);
    // Fresh through 70 ms inclusive: 14 ticks of 5 µs.
    assert_eq!(rig.target(), 1870.0);
}

#[test]
fn both_directions_held_cancel() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Left, Direction::Right], 60);
    assert_eq!(rig.target(), 1800.0);
    assert_eq!(rig.current(), 1800.0);
}

#[test]
fn center_from_right_limit_slews_back() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Right], 130);
    assert_eq!(rig.current(), 2400.0);

    rig.shared.input.center();
    let report = rig.tick();
    assert_eq!(report.target_us, 1800.0);
    assert_eq!(report.current_us, 2395.0);

    rig.run(118);
    assert_eq!(rig.current(), 1805.0);
    rig.tick();
    assert_eq!(rig.current(), 1800.0);
    rig.run(5);
    assert_eq!(rig.current(), 1800.0);
}

#[test]
fn center_cancels_active_holds() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Left], 16);
    rig.shared.input.center();
    rig.run(40);
    assert_eq!(rig.target(), 1800.0);
    assert_eq!(rig.current(), 1800.0);
}

#[test]
fn center_is_idempotent() {
    let mut once = Rig::new();
    let mut twice = Rig::new();
    for rig in [&mut once, &mut twice] {
        rig.hold(&[Direction::Right], 40);
    }

    once.shared.input.center();
    twice.shared.input.center();
    twice.shared.input.center();
    for rig in [&mut once, &mut twice] {
        rig.run(10);
    }
    assert_eq!(once.current(), twice.current());
    assert_eq!(once.target(), twice.target());
}

#[test]
fn stop_freezes_target_and_clears_holds() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Right], 40);
    assert_eq!(rig.target(), 2000.0);

    // Hold is still fresh when stop arrives; stop must cancel it.
    rig.shared.input.record_hold(Direction::Right, rig.now_us);
    rig.shared.input.stop();
    let report = rig.tick();
    assert!(report.override_applied.is_some());
    rig.run(20);
    assert_eq!(rig.target(), 2000.0);
    assert_eq!(rig.current(), 2000.0);
}

#[test]
fn stop_during_center_keeps_converging() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Right], 130);
    rig.shared.input.center();
    rig.run(10);
    let mid = rig.current();
    assert!(mid > 1800.0);

    rig.shared.input.stop();
    rig.run(5);
    assert_eq!(rig.target(), 1800.0);
    assert!(rig.current() < mid);
}

#[test]
fn holds_resume_after_stop() {
    let mut rig = Rig::new();
    rig.shared.input.stop();
    rig.tick();
    rig.hold(&[Direction::Left], 20);
    assert_eq!(rig.target(), 1700.0);
}

#[test]
fn failed_writes_do_not_stop_the_loop() {
    let mut rig = Rig::new();
    rig.hw.set_failing(true);
    rig.hold(&[Direction::Right], 10);
    assert_eq!(rig.target(), 1850.0);
    assert_eq!(rig.shared.write_failures(), 10);

    rig.hw.set_failing(false);
    rig.hold(&[Direction::Right], 1);
    assert_eq!(rig.hw.last_position(), Some(1855.0));

    let events = rig.sink.events();
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::ActuatorFault { .. })),
        1
    );
    assert!(events.contains(&AppEvent::ActuatorRecovered { failed_writes: 10 }));
}

#[test]
fn published_position_tracks_each_tick() {
    let mut rig = Rig::new();
    rig.hold(&[Direction::Left], 3);
    let p = rig.shared.position();
    assert_eq!(p.current_us, 1785.0);
    assert_eq!(p.target_us, 1785.0);
    assert_eq!(rig.shared.ticks(), 3);
}

#[test]
fn faster_rate_reaches_limit_sooner() {
    let config = SteeringConfig {
        ramp_rate_us_per_sec: 4000.0,
        ..Default::default()
    };
    let mut rig = Rig::with_config(&config);
    rig.hold(&[Direction::Left], 60);
    assert_eq!(rig.target(), 600.0);
    assert_eq!(rig.current(), 600.0);
}

#[test]
fn stop_emits_stopped_and_shuts_output() {
    let mut rig = Rig::new();
    rig.run(3);
    rig.svc.stop(&mut rig.hw, &mut rig.sink);
    let calls = rig.hw.calls();
    assert_eq!(
        &calls[calls.len() - 2..],
        &[ActuatorCall::Disabled, ActuatorCall::Released]
    );
    assert_eq!(
        rig.sink.events().last(),
        Some(&AppEvent::Stopped { ticks: 3 })
    );
}
