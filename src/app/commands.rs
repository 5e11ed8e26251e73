//! Inbound commands to the steering core.
//!
//! These represent intent decoded by the transport layer; the
//! [`ControlLink`](crate::rpc::link::ControlLink) turns them into
//! [`InputState`](super::input::InputState) updates.

/// Decoded steering intent from the controlling client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerCommand {
    /// Hold-state update; `None` leaves that direction untouched.
    Hold {
        left: Option<bool>,
        right: Option<bool>,
    },
    /// Cancel holds and stop autonomous motion.
    Stop,
    /// Cancel holds and return to center.
    Center,
}

/// Override handed from the transport to the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideCommand {
    /// Leaves the target where it is.
    Stop,
    /// Moves the target to center.
    Center,
}

impl OverrideCommand {
    /// Fold `next` into an override still waiting for a tick.
    ///
    /// Center retargets immediately and stop freezes whatever the target
    /// is, so center followed by stop still ends at center.
    pub fn merge(pending: Option<Self>, next: Self) -> Self {
        match (pending, next) {
            (Some(Self::Center), _) | (_, Self::Center) => Self::Center,
            _ => Self::Stop,
        }
    }
}
