//! One-shot hardware peripheral initialization.
//!
//! Opens the I²C bus, programs the PCA9685 and drives the steering
//! channel to center.  Called once from `main()` before the control task
//! is spawned.

use core::fmt;

use embedded_hal::i2c::I2c;
use log::info;

use crate::config::SteeringConfig;
use crate::error::ActuatorError;
use crate::pins;

use super::pca9685::Pca9685;
use super::servo::ServoChannel;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    I2cDriverFailed(i32),
    PwmControllerFailed(ActuatorError),
    InvalidConfig(&'static str),
}

impl fmt::Display for HwInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2cDriverFailed(rc) => write!(f, "I2C driver init failed (rc={})", rc),
            Self::PwmControllerFailed(e) => write!(f, "PCA9685 init failed: {}", e),
            Self::InvalidConfig(msg) => write!(f, "invalid output config: {}", msg),
        }
    }
}

impl std::error::Error for HwInitError {}

// ── I²C bus ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn open_servo_bus(
    i2c: esp_idf_hal::i2c::I2C0,
) -> Result<esp_idf_hal::i2c::I2cDriver<'static>, HwInitError> {
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::units::Hertz;

    // SAFETY: the SDA/SCL GPIOs are reserved for this bus in `pins` and
    // not handed out anywhere else.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let config = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ));
    let driver = I2cDriver::new(i2c, sda, scl, &config)
        .map_err(|e| HwInitError::I2cDriverFailed(e.code()))?;
    info!(
        "hw_init: I2C0 up (SDA={}, SCL={}, {} kHz)",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_BAUDRATE_HZ / 1000
    );
    Ok(driver)
}

// ── Servo output ──────────────────────────────────────────────

/// Program the expander and park the steering servo at center.
pub fn init_servo<I2C: I2c>(
    i2c: I2C,
    config: &SteeringConfig,
) -> Result<ServoChannel<I2C>, HwInitError> {
    let timing = config
        .pulse_timing()
        .map_err(|_| HwInitError::InvalidConfig("pwm frequency"))?;

    let mut pwm = Pca9685::new(i2c, pins::PCA9685_ADDRESS);
    pwm.init(config.pwm_frequency_hz)
        .map_err(HwInitError::PwmControllerFailed)?;

    let mut servo = ServoChannel::new(pwm, config.servo_channel, timing);
    let duty = servo
        .set_pulse_us(f32::from(config.center_us))
        .map_err(HwInitError::PwmControllerFailed)?;
    info!(
        "hw_init: servo ch{} centered ({}us, duty={})",
        config.servo_channel,
        config.center_us,
        duty
    );
    Ok(servo)
}
