//! JSON command decoder for WebSocket text frames.
//!
//! Recognised shapes:
//!
//! ```text
//! {"a": bool, "d": bool}   hold-left / hold-right (either key optional)
//! {"stop": true}           stop
//! {"center": true}         center
//! ```
//!
//! Precedence when several keys are present: `stop`, then `center`, then
//! `a`/`d`.  Unknown keys are ignored.  A known key with the wrong type,
//! non-object JSON, malformed JSON and oversize frames are all rejected;
//! the caller drops the frame without replying.

use core::fmt;

use serde::Deserialize;

use crate::app::commands::SteerCommand;

/// Frames longer than this are rejected before parsing.
pub const MAX_FRAME_LEN: usize = 256;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireCommand {
    a: Option<bool>,
    d: Option<bool>,
    stop: Option<bool>,
    center: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame exceeds [`MAX_FRAME_LEN`].
    TooLong(usize),
    /// Not a JSON object, or a known field has the wrong type.
    Malformed,
    /// Valid object, but no recognised command in it.
    Unrecognised,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(len) => write!(f, "frame too long ({len} bytes)"),
            Self::Malformed => write!(f, "malformed command"),
            Self::Unrecognised => write!(f, "unrecognised command"),
        }
    }
}

/// Decode one frame into a [`SteerCommand`].
pub fn decode_command(frame: &[u8]) -> Result<SteerCommand, DecodeError> {
    if frame.len() > MAX_FRAME_LEN {
        return Err(DecodeError::TooLong(frame.len()));
    }
    let wire: WireCommand = serde_json::from_slice(frame).map_err(|_| DecodeError::Malformed)?;

    if wire.stop == Some(true) {
        return Ok(SteerCommand::Stop);
    }
    if wire.center == Some(true) {
        return Ok(SteerCommand::Center);
    }
    if wire.a.is_some() || wire.d.is_some() {
        return Ok(SteerCommand::Hold {
            left: wire.a,
            right: wire.d,
        });
    }
    Err(DecodeError::Unrecognised)
}
