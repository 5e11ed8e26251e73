//! PCA9685 / servo / hardware adapter against a register-level I²C mock.

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use rcsteer::adapters::hardware::HardwareAdapter;
use rcsteer::app::ports::ActuatorPort;
use rcsteer::config::SteeringConfig;
use rcsteer::drivers::hw_init::{HwInitError, init_servo};
use rcsteer::drivers::pca9685::{
    Pca9685, REG_LED0_ON_L, REG_MODE1, REG_MODE2, REG_PRESCALE,
};
use rcsteer::error::ActuatorError;
use rcsteer::pins::PCA9685_ADDRESS;

use crate::mock_hw::MockI2c;

const ADDR: u8 = PCA9685_ADDRESS;

fn channel_regs(bus: &MockI2c, channel: u8) -> (u16, u16) {
    let base = REG_LED0_ON_L + 4 * channel;
    let on = u16::from_le_bytes([bus.register(ADDR, base), bus.register(ADDR, base + 1)]);
    let off = u16::from_le_bytes([bus.register(ADDR, base + 2), bus.register(ADDR, base + 3)]);
    (on, off)
}

#[test]
fn init_programs_50hz_and_parks_at_center() {
    let bus = MockI2c::new();
    let _servo = init_servo(bus.clone(), &SteeringConfig::default()).unwrap();

    let writes: Vec<Vec<u8>> = bus.writes().into_iter().map(|(_, w)| w).collect();
    assert_eq!(
        writes,
        vec![
            vec![REG_MODE1, 0x00],
            vec![REG_MODE1, 0x10],
            vec![REG_PRESCALE, 121],
            vec![REG_MODE1, 0x00],
            vec![REG_MODE1, 0xA0],
            vec![REG_MODE2, 0x04],
            // 1800 µs of 20 ms → duty 5898 → OFF = 368
            vec![REG_LED0_ON_L, 0x00, 0x00, 0x70, 0x01],
        ]
    );
    assert!(bus.writes().iter().all(|(addr, _)| *addr == ADDR));
}

#[test]
fn adapter_maps_positions_to_registers() {
    let bus = MockI2c::new();
    let mut hw = HardwareAdapter::new(init_servo(bus.clone(), &SteeringConfig::default()).unwrap());

    hw.set_position(600.0).unwrap();
    assert_eq!(hw.last_duty(), Some(1966));
    assert_eq!(channel_regs(&bus, 0), (0, 1966 >> 4));

    hw.set_position(2400.0).unwrap();
    assert_eq!(hw.last_duty(), Some(7864));
    assert_eq!(channel_regs(&bus, 0), (0, 7864 >> 4));
}

#[test]
fn non_zero_channel_uses_its_own_registers() {
    let bus = MockI2c::new();
    let config = SteeringConfig {
        servo_channel: 3,
        ..Default::default()
    };
    let mut hw = HardwareAdapter::new(init_servo(bus.clone(), &config).unwrap());
    hw.set_position(1800.0).unwrap();
    assert_eq!(channel_regs(&bus, 3), (0, 368));
    assert_eq!(channel_regs(&bus, 0), (0, 0));
}

#[test]
fn shutdown_disables_output_once_then_rejects_writes() {
    let bus = MockI2c::new();
    let mut hw = HardwareAdapter::new(init_servo(bus.clone(), &SteeringConfig::default()).unwrap());
    bus.clear_writes();

    hw.shutdown();
    assert_eq!(
        bus.writes(),
        vec![(ADDR, vec![REG_LED0_ON_L, 0x00, 0x00, 0x00, 0x10])]
    );
    assert!(hw.is_released());

    hw.shutdown();
    drop(hw);
    assert_eq!(bus.writes().len(), 1);
}

#[test]
fn writes_after_shutdown_are_released_errors() {
    let bus = MockI2c::new();
    let mut hw = HardwareAdapter::new(init_servo(bus, &SteeringConfig::default()).unwrap());
    hw.shutdown();
    assert_eq!(hw.set_position(1800.0), Err(ActuatorError::Released));
}

#[test]
fn drop_disables_output() {
    let bus = MockI2c::new();
    let hw = HardwareAdapter::new(init_servo(bus.clone(), &SteeringConfig::default()).unwrap());
    bus.clear_writes();
    drop(hw);
    assert_eq!(channel_regs(&bus, 0), (0, 0x1000));
}

#[test]
fn bus_errors_surface_as_actuator_errors() {
    let bus = MockI2c::new();
    let mut hw = HardwareAdapter::new(init_servo(bus.clone(), &SteeringConfig::default()).unwrap());
    bus.set_failing(true);
    assert_eq!(
        hw.set_position(1900.0),
        Err(ActuatorError::I2cWriteFailed(ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address
        )))
    );
    bus.set_failing(false);
    assert!(hw.set_position(1900.0).is_ok());
}

#[test]
fn init_fails_without_a_device() {
    let bus = MockI2c::new();
    bus.set_failing(true);
    assert!(matches!(
        init_servo(bus, &SteeringConfig::default()),
        Err(HwInitError::PwmControllerFailed(ActuatorError::I2cWriteFailed(_)))
    ));
}

#[test]
fn invalid_channel_is_rejected_at_init() {
    let bus = MockI2c::new();
    let config = SteeringConfig {
        servo_channel: 16,
        ..Default::default()
    };
    assert!(matches!(
        init_servo(bus, &config),
        Err(HwInitError::PwmControllerFailed(ActuatorError::InvalidChannel(16)))
    ));
}

#[test]
fn full_scale_duty_sets_full_on_bit() {
    let bus = MockI2c::new();
    let mut pwm = Pca9685::new(bus.clone(), ADDR);
    pwm.set_duty(15, 0xFFFF).unwrap();
    assert_eq!(channel_regs(&bus, 15), (0x1000, 0));
    assert_eq!(pwm.set_duty(16, 0x8000), Err(ActuatorError::InvalidChannel(16)));
    let _bus = pwm.release();
}
