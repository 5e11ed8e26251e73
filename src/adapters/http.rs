//! HTTP / WebSocket front end (ESP-IDF only).
//!
//! ```text
//!   GET /health  → JSON HealthReport
//!   WS  /ws      → open: open()  text: on_frame()  close: disconnect()
//! ```
//!
//! Handlers run on the IDF httpd task and only touch the [`ControlLink`];
//! they never block on the control loop.

use std::sync::{Arc, Mutex, PoisonError};

use esp_idf_svc::http::Method;
use esp_idf_svc::http::server::ws::EspHttpWsConnection;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::io::Write;
use esp_idf_svc::sys::{ESP_ERR_INVALID_SIZE, EspError};
use esp_idf_svc::ws::FrameType;
use log::{info, warn};

use crate::adapters::time::Esp32TimeAdapter;
use crate::rpc::link::ControlLink;
use crate::rpc::session::SessionTable;

/// Receive buffer.  Frames above the codec limit but within this size are
/// read and dropped; anything larger closes the connection.
const WS_RX_BUF: usize = 1024;

type Link = ControlLink<Esp32TimeAdapter>;

pub fn start_http_server(port: u16, link: Arc<Link>) -> Result<EspHttpServer<'static>, EspError> {
    let mut server = EspHttpServer::new(&Configuration {
        http_port: port,
        ..Default::default()
    })?;

    let health_link = Arc::clone(&link);
    server.fn_handler::<anyhow::Error, _>("/health", Method::Get, move |req| {
        let body = serde_json::to_vec(&health_link.health())?;
        let mut resp = req.into_response(200, Some("OK"), &[("Content-Type", "application/json")])?;
        resp.write_all(&body)?;
        Ok(())
    })?;

    let sessions = Arc::new(Mutex::new(SessionTable::new()));
    server.ws_handler("/ws", move |ws: &mut EspHttpWsConnection| {
        handle_ws(ws, &link, &sessions)
    })?;

    info!("HTTP: listening on :{} (/health, /ws)", port);
    Ok(server)
}

fn handle_ws(
    ws: &mut EspHttpWsConnection,
    link: &Link,
    sessions: &Mutex<SessionTable>,
) -> Result<(), EspError> {
    let handle = ws.session();

    if ws.is_new() {
        let mut table = sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if !link.open(&mut table, handle) {
            return Err(EspError::from_infallible::<ESP_ERR_INVALID_SIZE>());
        }
        return Ok(());
    }

    if ws.is_closed() {
        let removed = sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(handle);
        if let Some(session) = removed {
            link.disconnect(session);
        }
        return Ok(());
    }

    let (frame_type, len) = ws.recv(&mut [])?;
    if len > WS_RX_BUF {
        warn!("WS: {} byte frame from {}, closing", len, handle);
        return Err(EspError::from_infallible::<ESP_ERR_INVALID_SIZE>());
    }
    let mut buf = [0u8; WS_RX_BUF];
    ws.recv(&mut buf[..len])?;

    if !matches!(frame_type, FrameType::Text(_)) {
        return Ok(());
    }
    // IDF appends a NUL terminator to text payloads.
    let frame = trim_nul(&buf[..len]);

    let mut table = sessions.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(session) = table.get_mut(handle) {
        link.on_frame(session, frame);
    }
    Ok(())
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}
