//! RC steering controller library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod rpc;
pub mod safety;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod pins;

#[cfg(target_os = "espidf")]
mod esp_link_shims;
