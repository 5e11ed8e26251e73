//! Hardware adapter: bridges the servo output to the domain port trait.
//!
//! Owns the [`ServoChannel`] (and through it the I²C bus), exposing it
//! through [`ActuatorPort`].  This is the only module in the system that
//! writes to the actuator.  Shutdown disables the output and then drops
//! the bus; afterwards every write returns [`ActuatorError::Released`].

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::ActuatorPort;
use crate::drivers::servo::ServoChannel;
use crate::error::ActuatorError;

/// Concrete adapter that puts the steering servo behind [`ActuatorPort`].
pub struct HardwareAdapter<I2C: I2c> {
    servo: Option<ServoChannel<I2C>>,
    last_duty: Option<u16>,
}

impl<I2C: I2c> HardwareAdapter<I2C> {
    pub fn new(servo: ServoChannel<I2C>) -> Self {
        Self {
            servo: Some(servo),
            last_duty: None,
        }
    }

    /// Duty of the most recent successful write.
    pub fn last_duty(&self) -> Option<u16> {
        self.last_duty
    }

    pub fn is_released(&self) -> bool {
        self.servo.is_none()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<I2C: I2c> ActuatorPort for HardwareAdapter<I2C> {
    fn set_position(&mut self, pulse_us: f32) -> Result<(), ActuatorError> {
        let servo = self.servo.as_mut().ok_or(ActuatorError::Released)?;
        let duty = servo.set_pulse_us(pulse_us)?;
        self.last_duty = Some(duty);
        Ok(())
    }

    fn shutdown(&mut self) {
        let Some(mut servo) = self.servo.take() else {
            return;
        };
        let channel = servo.channel();
        if let Err(e) = servo.disable() {
            warn!("Servo ch{}: disable failed during shutdown: {}", channel, e);
        }
        drop(servo.release());
        info!("Servo ch{}: bus released", channel);
    }
}

impl<I2C: I2c> Drop for HardwareAdapter<I2C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
