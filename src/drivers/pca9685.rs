//! PCA9685 16-channel 12-bit PWM expander over I²C.
//!
//! Generic over any `embedded_hal::i2c::I2c` bus so the same driver runs
//! on the ESP-IDF `I2cDriver` and on a host-side mock.
//!
//! Duty is expressed on a 16-bit scale (`0..=0xFFFF`) and mapped onto the
//! chip's 12-bit counter:
//!
//! ```text
//!   0xFFFF          → ON = 0x1000 (full on),  OFF = 0
//!   0x0000..=0x000F → ON = 0,                 OFF = 0x1000 (full off)
//!   otherwise       → ON = 0,                 OFF = duty >> 4
//! ```

use embedded_hal::i2c::{Error as _, I2c};
use log::info;

use crate::error::ActuatorError;
use crate::pins;

// ── Registers ─────────────────────────────────────────────────

pub const REG_MODE1: u8 = 0x00;
pub const REG_MODE2: u8 = 0x01;
pub const REG_LED0_ON_L: u8 = 0x06;
pub const REG_PRESCALE: u8 = 0xFE;

const MODE1_RESTART: u8 = 0x80;
const MODE1_AI: u8 = 0x20;
const MODE1_SLEEP: u8 = 0x10;
const MODE2_OUTDRV: u8 = 0x04;

/// Bit 12 of an ON/OFF register pair forces the output fully on/off.
const FULL_BIT: u16 = 0x1000;

pub const CHANNELS: u8 = 16;

/// Oscillator settle time after leaving sleep (datasheet: 500 µs).
const WAKE_DELAY_US: u64 = 500;

/// Prescaler value for an output frequency, clamped to the chip range.
pub fn prescale_for(frequency_hz: u16) -> u8 {
    let freq = f32::from(frequency_hz.max(1));
    let raw = (pins::PCA9685_OSC_HZ / 4096.0 / freq).round() - 1.0;
    raw.clamp(3.0, 255.0) as u8
}

/// `(ON, OFF)` register values for a 16-bit duty.
pub fn duty_registers(duty: u16) -> (u16, u16) {
    match duty {
        0xFFFF => (FULL_BIT, 0),
        d if d < 0x0010 => (0, FULL_BIT),
        d => (0, d >> 4),
    }
}

fn bus_error(e: impl embedded_hal::i2c::Error) -> ActuatorError {
    ActuatorError::I2cWriteFailed(e.kind())
}

pub struct Pca9685<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Pca9685<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Reset, program the PWM frequency and enable register auto-increment.
    ///
    /// The prescaler is only writable while the oscillator sleeps, so the
    /// sequence is: sleep → prescale → wake → settle → restart.
    pub fn init(&mut self, frequency_hz: u16) -> Result<(), ActuatorError> {
        self.write_reg(REG_MODE1, 0x00)?;
        let old_mode = self.read_reg(REG_MODE1)?;
        let prescale = prescale_for(frequency_hz);

        self.write_reg(REG_MODE1, (old_mode & !MODE1_RESTART) | MODE1_SLEEP)?;
        self.write_reg(REG_PRESCALE, prescale)?;
        self.write_reg(REG_MODE1, old_mode)?;
        std::thread::sleep(core::time::Duration::from_micros(WAKE_DELAY_US));
        self.write_reg(REG_MODE1, old_mode | MODE1_RESTART | MODE1_AI)?;
        self.write_reg(REG_MODE2, MODE2_OUTDRV)?;

        info!(
            "PCA9685@{:#04x}: {} Hz (prescale={})",
            self.address,
            frequency_hz,
            prescale
        );
        Ok(())
    }

    /// Set one channel's duty on the 16-bit scale.
    pub fn set_duty(&mut self, channel: u8, duty: u16) -> Result<(), ActuatorError> {
        if channel >= CHANNELS {
            return Err(ActuatorError::InvalidChannel(channel));
        }
        let (on, off) = duty_registers(duty);
        self.write_pair(REG_LED0_ON_L + 4 * channel, on, off)
    }

    /// Force one channel fully off (no pulses at all).
    pub fn full_off(&mut self, channel: u8) -> Result<(), ActuatorError> {
        self.set_duty(channel, 0)
    }

    /// Give the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    // ── Internal ──────────────────────────────────────────────

    fn write_pair(&mut self, base: u8, on: u16, off: u16) -> Result<(), ActuatorError> {
        let [on_l, on_h] = on.to_le_bytes();
        let [off_l, off_h] = off.to_le_bytes();
        self.i2c
            .write(self.address, &[base, on_l, on_h, off_l, off_h])
            .map_err(bus_error)
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), ActuatorError> {
        self.i2c.write(self.address, &[reg, value]).map_err(bus_error)
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, ActuatorError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[reg], &mut buf)
            .map_err(bus_error)?;
        Ok(buf[0])
    }
}
