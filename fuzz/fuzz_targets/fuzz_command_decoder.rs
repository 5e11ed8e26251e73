//! Fuzz target: `decode_command`
//!
//! Drives arbitrary byte sequences into the WebSocket command decoder and
//! asserts that it never panics and never accepts an oversize frame.
//!
//! cargo fuzz run fuzz_command_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use rcsteer::app::commands::SteerCommand;
use rcsteer::rpc::codec::{DecodeError, MAX_FRAME_LEN, decode_command};

fuzz_target!(|data: &[u8]| {
    match decode_command(data) {
        Ok(cmd) => {
            assert!(data.len() <= MAX_FRAME_LEN);
            if let SteerCommand::Hold { left, right } = cmd {
                assert!(left.is_some() || right.is_some(), "empty hold decoded");
            }
        }
        Err(DecodeError::TooLong(len)) => assert_eq!(len, data.len()),
        Err(_) => {}
    }
});
