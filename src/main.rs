//! RC steering controller: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (ActuatorPort)    (EventSink)    (ConfigPort) (TimePort)      │
//! │  WifiStation       HTTP / WS server ──▶ ControlLink            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   ControlTask (core 1) → SteeringService (pure logic)  │    │
//! │  │   ramp · slew · clamp · actuator supervisor            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use log::{error, info, warn};

use rcsteer::adapters::hardware::HardwareAdapter;
use rcsteer::adapters::http::start_http_server;
use rcsteer::adapters::log_sink::LogEventSink;
use rcsteer::adapters::nvs::NvsAdapter;
use rcsteer::adapters::time::Esp32TimeAdapter;
use rcsteer::adapters::wifi::{WifiCredentials, WifiStation};
use rcsteer::app::control_task::ControlTask;
use rcsteer::app::ports::ConfigPort;
use rcsteer::app::shared::SharedSteering;
use rcsteer::config::SteeringConfig;
use rcsteer::drivers::hw_init;
use rcsteer::rpc::link::ControlLink;

const SUPERVISOR_PERIOD: Duration = Duration::from_secs(2);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  rc-steer v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config unavailable ({}), using defaults", e);
            SteeringConfig::default()
        }
    };
    info!(
        "Config: ch{} {}Hz L/C/R={}/{}/{}us rate={}us/s tick={}ms hold={}ms",
        config.servo_channel,
        config.pwm_frequency_hz,
        config.left_limit_us,
        config.center_us,
        config.right_limit_us,
        config.ramp_rate_us_per_sec,
        config.tick_interval_ms,
        config.hold_window_ms
    );

    // ── 3. Servo output, parked at center ─────────────────────
    let bus = hw_init::open_servo_bus(peripherals.i2c0)?;
    let servo = hw_init::init_servo(bus, &config)?;
    let hw = HardwareAdapter::new(servo);

    // ── 4. Control loop (core 1) ──────────────────────────────
    // Started before the network so the output holds center while
    // WiFi associates.
    let shared = Arc::new(SharedSteering::new(f32::from(config.center_us)));
    let control = ControlTask::new(
        &config,
        Arc::clone(&shared),
        hw,
        Esp32TimeAdapter::new(),
        LogEventSink::new(),
    )?
    .spawn()?;

    // ── 5. Network ────────────────────────────────────────────
    let creds = WifiCredentials::from_build_env()?;
    let mut wifi = WifiStation::connect(peripherals.modem, sysloop, &creds)?;

    let link = Arc::new(ControlLink::new(shared, Esp32TimeAdapter::new()));
    let _server = start_http_server(config.http_port, link)?;

    // ── 6. Supervise ──────────────────────────────────────────
    loop {
        std::thread::sleep(SUPERVISOR_PERIOD);
        if control.is_finished() {
            error!("Control task exited unexpectedly, restarting");
            // SAFETY: esp_restart never returns and is safe from any task.
            unsafe { esp_idf_svc::sys::esp_restart() };
        }
        wifi.poll();
    }
}
