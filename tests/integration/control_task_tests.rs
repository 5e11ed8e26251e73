//! Control task lifecycle on a real thread and the real host clock.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rcsteer::adapters::time::Esp32TimeAdapter;
use rcsteer::app::control_task::{ControlTask, ControlTaskHandle};
use rcsteer::app::events::AppEvent;
use rcsteer::app::input::Direction;
use rcsteer::app::ports::TimePort;
use rcsteer::app::shared::SharedSteering;
use rcsteer::config::SteeringConfig;

use crate::mock_hw::{ActuatorCall, MockActuator, RecordingSink};

fn spawn(hw: &MockActuator, sink: &RecordingSink) -> ControlTaskHandle {
    let config = SteeringConfig::default();
    let shared = Arc::new(SharedSteering::new(f32::from(config.center_us)));
    ControlTask::new(
        &config,
        shared,
        hw.clone(),
        Esp32TimeAdapter::new(),
        sink.clone(),
    )
    .unwrap()
    .spawn()
    .unwrap()
}

fn wait_for_ticks(handle: &ControlTaskHandle, ticks: u32) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while handle.shared().ticks() < ticks {
        assert!(Instant::now() < deadline, "control task made no progress");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn centers_then_shuts_down_cleanly() {
    let hw = MockActuator::new();
    let sink = RecordingSink::new();
    let handle = spawn(&hw, &sink);
    wait_for_ticks(&handle, 10);
    assert!(!handle.is_finished());
    assert!(handle.shutdown());

    let calls = hw.calls();
    assert_eq!(calls.first(), Some(&ActuatorCall::SetPosition(1800.0)));
    assert_eq!(
        &calls[calls.len() - 2..],
        &[ActuatorCall::Disabled, ActuatorCall::Released]
    );
    assert_eq!(
        calls.iter().filter(|c| **c == ActuatorCall::Released).count(),
        1
    );
    assert!(matches!(
        sink.events().last(),
        Some(AppEvent::Stopped { ticks }) if *ticks >= 10
    ));
}

#[test]
fn held_input_moves_the_output() {
    let hw = MockActuator::new();
    let sink = RecordingSink::new();
    let handle = spawn(&hw, &sink);
    let clock = Esp32TimeAdapter::new();

    let until = Instant::now() + Duration::from_millis(150);
    while Instant::now() < until {
        handle.shared().input.record_hold(Direction::Right, clock.now_us());
        std::thread::sleep(Duration::from_millis(20));
    }
    let pos = handle.shared().position();
    handle.shutdown();

    assert!(pos.target_us > 1850.0, "target only reached {}", pos.target_us);
    assert!(pos.target_us <= 2400.0);
    assert!(hw.positions().iter().all(|&p| (1800.0..=2400.0).contains(&p)));
    let positions = hw.positions();
    assert!(positions.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn center_override_reaches_running_loop() {
    let hw = MockActuator::new();
    let sink = RecordingSink::new();
    let handle = spawn(&hw, &sink);
    wait_for_ticks(&handle, 2);
    handle.shared().input.center();
    let before = handle.shared().ticks();
    wait_for_ticks(&handle, before + 3);
    handle.shutdown();

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::OverrideApplied { .. })),
        1
    );
}

#[test]
fn write_failures_do_not_kill_the_task() {
    let hw = MockActuator::new();
    let sink = RecordingSink::new();
    hw.set_failing(true);
    let handle = spawn(&hw, &sink);
    wait_for_ticks(&handle, 10);
    assert!(!handle.is_finished());
    assert!(handle.shared().write_failures() >= 10);
    assert!(handle.shutdown());
    assert_eq!(hw.calls().last(), Some(&ActuatorCall::Released));
}

#[test]
fn dropping_the_handle_stops_the_task() {
    let hw = MockActuator::new();
    let sink = RecordingSink::new();
    let handle = spawn(&hw, &sink);
    wait_for_ticks(&handle, 1);
    drop(handle);
    assert_eq!(hw.calls().last(), Some(&ActuatorCall::Released));
}
