//! USB Device subsystem - presents a CMSIS-DAP (HID) probe to the host.
//!
//! The nRF52840's built-in USB 2.0 Full-Speed controller is driven by
//! `embassy-usb`. The device has one vendor-defined HID interface carrying
//! 64-byte DAP command and response reports.
//!
//! USB callbacks never touch probe state directly. Link events and inbound
//! reports go through bounded channels that the run loop drains when it
//! services the transport; responses go back through a channel to the HID
//! writer task.

pub mod hid_device;
