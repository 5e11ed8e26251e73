//! Hobby-servo output on one PCA9685 channel.
//!
//! Converts pulse widths in microseconds to 16-bit duty using the frame
//! period the expander was initialised with.

use embedded_hal::i2c::I2c;
use log::info;

use crate::control::PulseTiming;
use crate::error::ActuatorError;

use super::pca9685::Pca9685;

pub struct ServoChannel<I2C> {
    pwm: Pca9685<I2C>,
    channel: u8,
    timing: PulseTiming,
}

impl<I2C: I2c> ServoChannel<I2C> {
    /// Wrap an already-initialised expander.
    pub fn new(pwm: Pca9685<I2C>, channel: u8, timing: PulseTiming) -> Self {
        Self {
            pwm,
            channel,
            timing,
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn timing(&self) -> PulseTiming {
        self.timing
    }

    /// Command a pulse width.  Returns the duty actually written.
    pub fn set_pulse_us(&mut self, pulse_us: f32) -> Result<u16, ActuatorError> {
        let duty = self.timing.duty_for(pulse_us);
        self.pwm.set_duty(self.channel, duty)?;
        Ok(duty)
    }

    /// Stop emitting pulses; the servo goes limp.
    pub fn disable(&mut self) -> Result<(), ActuatorError> {
        self.pwm.full_off(self.channel)?;
        info!("Servo ch{}: output disabled", self.channel);
        Ok(())
    }

    /// Give the I²C bus back.
    pub fn release(self) -> I2C {
        self.pwm.release()
    }
}
