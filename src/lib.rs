//! Host-testable core of the uvmeter firmware.
//!
//! Everything that decides what the meter does lives here: display
//! states and their layouts, the dismiss and sleep deadlines, the
//! deferred present, and the UV sampling loop. Hardware is reached only
//! through the traits in [`platform`].
//!
//! Usage: `cargo test --lib`
//!
//! The firmware binary (`src/main.rs`, feature `embedded`) and the console
//! harness (`src/bin/console.rs`, feature `console`) both build on this
//! library.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod app;
pub mod config;
pub mod error;
pub mod platform;
pub mod power;
pub mod power_logic;
pub mod render;
pub mod sensor;
pub mod timer;
pub mod ui;

#[cfg(test)]
mod testkit;

pub use app::{Application, Board, Parts, UvMeter};
pub use error::{Error, SensorError};

// ═══════════════════════════════════════════════════════════════════════════
// Cross-module checks
// ═══════════════════════════════════════════════════════════════════════════
