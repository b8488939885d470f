//! USB serial number from the chip's factory device identifier.
//!
//! Host debuggers tell probes apart by serial number, so it has to be
//! unique per chip and stable across reboots.

use crate::error::Error;
use core::fmt::Write;
use heapless::String;

/// Length of the rendered serial number (64-bit identifier in hex).
pub const SERIAL_LEN: usize = 16;

/// Render a 64-bit device identifier as upper-case hex, most significant
/// nibble first.
pub fn format_serial(device_id: u64) -> Result<String<SERIAL_LEN>, Error> {
    let mut out = String::new();
    write!(out, "{:016X}", device_id).map_err(|_| Error::BufferOverflow)?;
    Ok(out)
}

/// Combine the two 32-bit FICR DEVICEID words into one identifier.
pub fn device_id(words: [u32; 2]) -> u64 {
    (u64::from(words[1]) << 32) | u64::from(words[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_is_sixteen_upper_hex_digits() {
        let s = format_serial(0x0123_4567_89AB_CDEF).unwrap();
        assert_eq!(s.as_str(), "0123456789ABCDEF");
    }

    #[test]
    fn serial_keeps_leading_zeros() {
        assert_eq!(format_serial(0).unwrap().as_str(), "0000000000000000");
        assert_eq!(format_serial(0xA5).unwrap().as_str(), "00000000000000A5");
    }

    #[test]
    fn serial_fills_capacity_exactly() {
        let s = format_serial(u64::MAX).unwrap();
        assert_eq!(s.as_str(), "FFFFFFFFFFFFFFFF");
        assert_eq!(s.len(), SERIAL_LEN);
    }

    #[test]
    fn device_id_puts_high_word_first() {
        let id = device_id([0x89AB_CDEF, 0x0123_4567]);
        assert_eq!(id, 0x0123_4567_89AB_CDEF);
        assert_eq!(format_serial(id).unwrap().as_str(), "0123456789ABCDEF");
    }
}
