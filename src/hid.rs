//! HID report types and the CMSIS-DAP report descriptor.
//!
//! The probe exposes a single vendor-defined HID interface. Every command
//! and response travels as one fixed-size report without a report ID:
//!
//! ```text
//! Input   (IN endpoint)   : 64 bytes, DAP response
//! Output  (OUT endpoint)  : 64 bytes, DAP command
//! Feature (control pipe)  :  1 byte, unused
//! ```

use crate::config::REPORT_SIZE;

/// Direction/kind of a HID report, as carried by a SET_REPORT / GET_REPORT
/// request or implied by the endpoint it arrived on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportType {
    /// Unknown or not applicable.
    Invalid,
    /// Device → host.
    Input,
    /// Host → device.
    Output,
    /// Bidirectional configuration report.
    Feature,
}

/// Vendor-defined report descriptor for a CMSIS-DAP v1 (HID) probe.
#[rustfmt::skip]
pub const DAP_REPORT_DESCRIPTOR: &[u8] = &[
    0x06, 0x00, 0xFF,       // Usage Page (Vendor Defined 0xFF00)
    0x09, 0x01,             // Usage (0x01)
    0xA1, 0x01,             // Collection (Application)
    0x15, 0x00,             //   Logical Minimum (0)
    0x26, 0xFF, 0x00,       //   Logical Maximum (255)
    0x75, 0x08,             //   Report Size (8)
    0x95, REPORT_SIZE as u8,//   Report Count (64)
    0x09, 0x01,             //   Usage (0x01)
    0x81, 0x02,             //   Input (Data, Var, Abs)
    0x95, REPORT_SIZE as u8,//   Report Count (64)
    0x09, 0x01,             //   Usage (0x01)
    0x91, 0x02,             //   Output (Data, Var, Abs)
    0x95, 0x01,             //   Report Count (1)
    0x09, 0x01,             //   Usage (0x01)
    0xB1, 0x02,             //   Feature (Data, Var, Abs)
    0xC0,                   // End Collection
];
