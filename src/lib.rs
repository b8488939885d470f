//! dap-probe: CMSIS-DAP (HID) debug probe firmware core.
//!
//! Everything that decides *what* the probe does lives here and builds on
//! the host: link-state tracking, the status LED cadence, the DAP report
//! exchange and the order of work in the run loop. The embedded binary
//! (`src/main.rs`, `embedded` feature) only wires these to Embassy and the
//! nRF52840 USB peripheral.
//!
//! Usage: `cargo test --lib` on the host; `cargo build --release
//! --features embedded --target thumbv7em-none-eabihf` for the firmware.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod config;
pub mod dap;
pub mod error;
pub mod exchange;
pub mod hid;
pub mod run_loop;
pub mod serial;
pub mod status;
pub mod transport;

pub use error::Error;
pub use exchange::{CommandProcessor, ReportExchange};
pub use run_loop::{Probe, RunLoop};
pub use status::{BlinkInterval, LinkState, StatusIndicator};
pub use transport::{LinkEvent, Transport, TransportHandler};
