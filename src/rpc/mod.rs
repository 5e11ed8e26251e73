//! Remote-control protocol layer.
//!
//! Transport-agnostic handling of controller connections.  The HTTP
//! adapter feeds raw WebSocket text frames in; steering intent comes out
//! as [`InputState`](crate::app::input::InputState) updates.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Control link                          │
//! │                                                          │
//! │  ┌───────────┐   ┌──────────┐   ┌─────────┐   ┌───────┐ │
//! │  │  Session  │──▶│  Codec   │──▶│  Link   │──▶│ Input │ │
//! │  │ (limiter) │   │  (JSON)  │   │ (owner) │   │ State │ │
//! │  └───────────┘   └──────────┘   └─────────┘   └───────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod link;
pub mod session;
