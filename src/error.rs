//! Unified error type for dap-probe.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // USB
    /// The outbound report queue had no free slot.
    TransmitQueueFull,

    // Status LED
    /// Writing the indicator pin failed.
    Indicator,

    // Generic
    /// Buffer too small for the requested operation.
    BufferOverflow,
}
