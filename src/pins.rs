//! GPIO / peripheral pin assignments for the steering controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// I²C bus to the PCA9685 PWM expander
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 8;
pub const I2C_SCL_GPIO: i32 = 9;
/// Fast-mode I²C; the PCA9685 supports up to 1 MHz.
pub const I2C_BAUDRATE_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// PCA9685
// ---------------------------------------------------------------------------

/// 7-bit address with A0–A5 strapped low.
pub const PCA9685_ADDRESS: u8 = 0x40;
/// Internal oscillator frequency used for the prescaler calculation.
pub const PCA9685_OSC_HZ: f32 = 25_000_000.0;
