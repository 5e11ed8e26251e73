//! PWM expander, servo output, hardware initialisation and task helpers.

pub mod hw_init;
pub mod pca9685;
pub mod servo;
pub mod task_pin;
pub mod watchdog;
