//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, buffer sizes, and USB identity constants live
//! here so they can be tuned in one place.

// Status LED

/// Blink period while the device is not attached to a host (ms).
pub const BLINK_NOT_ATTACHED_MS: u32 = 250;

/// Blink period while the device is attached and configured (ms).
pub const BLINK_ATTACHED_MS: u32 = 1000;

/// Blink period while the bus is suspended (ms).
pub const BLINK_SUSPENDED_MS: u32 = 2500;

// Run loop

/// Pause between run loop iterations (ms). Keeps the executor free for
/// the USB tasks without letting the LED cadence slip noticeably.
pub const RUN_LOOP_PERIOD_MS: u64 = 1;

// Report exchange

/// Size of one HID report on the probe interface (full-speed endpoint size).
pub const REPORT_SIZE: usize = 64;

/// Request/response buffer capacity: one report plus one byte of slack.
pub const REPORT_BUFFER_SIZE: usize = REPORT_SIZE + 1;

/// Depth of the link-event queue between the USB stack and the run loop.
pub const LINK_EVENT_QUEUE_DEPTH: usize = 8;

/// Depth of the inbound and outbound report queues.
/// One outstanding request at a time, so one slot each.
pub const REPORT_QUEUE_DEPTH: usize = 1;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings. Host debuggers look for "CMSIS-DAP" in the product
/// string to recognise the probe.
pub const USB_MANUFACTURER: &str = "dap-probe";
pub const USB_PRODUCT: &str = "dap-probe CMSIS-DAP";

/// Bus power budget (mA).
pub const USB_MAX_POWER_MA: u16 = 100;

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 1;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Status LED     → P0.13 (LED1, active-low)
