//! WiFi station-mode adapter.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: only credential validation and the backoff
//!   policy are compiled, for host-side tests.
//!
//! ## Reconnection policy
//!
//! The control loop never waits on the network.  After a disconnect the
//! supervisor loop in `main` calls [`WifiStation::poll`], which retries
//! with an exponential backoff (2 s → 4 s → 8 s … capped at 60 s).

use core::fmt;
use core::time::Duration;

#[cfg(target_os = "espidf")]
use log::{info, warn};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed(i32),
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed(rc) => write!(f, "WiFi connection failed (rc={})", rc),
        }
    }
}

impl std::error::Error for ConnectivityError {}

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self, ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds
            .ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        creds
            .password
            .push_str(password)
            .map_err(|_| ConnectivityError::InvalidPassword)?;
        Ok(creds)
    }

    /// Credentials baked in at build time via `RC_STEER_WIFI_SSID` and
    /// `RC_STEER_WIFI_PASS`.
    pub fn from_build_env() -> Result<Self, ConnectivityError> {
        let ssid = option_env!("RC_STEER_WIFI_SSID").ok_or(ConnectivityError::NoCredentials)?;
        Self::new(ssid, option_env!("RC_STEER_WIFI_PASS").unwrap_or(""))
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ───────────────────────────────────────────────────────────────
// Reconnect backoff
// ───────────────────────────────────────────────────────────────

const INITIAL_BACKOFF: Duration = Duration::from_secs(2);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    next: Duration,
    attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Backoff {
    pub const fn new() -> Self {
        Self {
            next: INITIAL_BACKOFF,
            attempts: 0,
        }
    }

    /// Delay before the next attempt; doubles each call up to the cap.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(MAX_BACKOFF);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// ───────────────────────────────────────────────────────────────
// Station (ESP-IDF only)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct WifiStation {
    wifi: esp_idf_svc::wifi::BlockingWifi<esp_idf_svc::wifi::EspWifi<'static>>,
    backoff: Backoff,
    retry_at: Option<std::time::Instant>,
}

#[cfg(target_os = "espidf")]
impl WifiStation {
    /// Bring up STA mode and block until the interface has an address.
    pub fn connect(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        creds: &WifiCredentials,
    ) -> Result<Self, ConnectivityError> {
        use esp_idf_svc::wifi::{
            AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi,
        };

        let failed = |e: esp_idf_svc::sys::EspError| ConnectivityError::ConnectionFailed(e.code());

        let esp_wifi = EspWifi::new(modem, sysloop.clone(), None).map_err(failed)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop).map_err(failed)?;

        let config = Configuration::Client(ClientConfiguration {
            ssid: creds
                .ssid()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidSsid)?,
            password: creds
                .password()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method: if creds.is_open() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });
        wifi.set_configuration(&config).map_err(failed)?;
        wifi.start().map_err(failed)?;
        info!("WiFi: connecting to '{}'", creds.ssid());
        wifi.connect().map_err(failed)?;
        wifi.wait_netif_up().map_err(failed)?;

        if let Ok(ip) = wifi.wifi().sta_netif().get_ip_info() {
            info!("WiFi: connected, ip={}", ip.ip);
        }

        Ok(Self {
            wifi,
            backoff: Backoff::new(),
            retry_at: None,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    /// Reconnect after a drop, honouring the backoff schedule.
    pub fn poll(&mut self) {
        if self.is_connected() {
            if self.backoff.attempts() > 0 {
                info!("WiFi: link restored after {} attempts", self.backoff.attempts());
                self.backoff.reset();
            }
            self.retry_at = None;
            return;
        }

        let now = std::time::Instant::now();
        if self.retry_at.is_some_and(|at| now < at) {
            return;
        }
        let delay = self.backoff.next_delay();
        self.retry_at = Some(now + delay);
        warn!(
            "WiFi: link down, reconnect attempt {} (next in {}s)",
            self.backoff.attempts(),
            delay.as_secs()
        );
        if let Err(e) = self.wifi.connect() {
            warn!("WiFi: reconnect failed: {}", e);
        }
    }
}
