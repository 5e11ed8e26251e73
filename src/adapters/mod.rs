//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                    |
//! |------------|--------------|--------------------------------|
//! | `hardware` | ActuatorPort | PCA9685 servo channel over I²C |
//! | `http`     | -            | IDF httpd (/health, /ws)       |
//! | `log_sink` | EventSink    | Serial log output              |
//! | `nvs`      | ConfigPort   | NVS / in-memory store          |
//! | `time`     | TimePort     | ESP32 system timer             |
//! | `wifi`     | -            | ESP-IDF WiFi STA               |

pub mod hardware;
#[cfg(target_os = "espidf")]
pub mod http;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;
