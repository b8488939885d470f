//! CMSIS-DAP command identifiers the run loop has to recognise, and a
//! fallback processor for builds without a command interpreter.
//!
//! Every DAP command starts with its command ID byte, and every response
//! echoes it back as the first byte.

use crate::exchange::CommandProcessor;

/// `DAP_TransferAbort`: cancels a transfer in progress. Has no response.
pub const ID_DAP_TRANSFER_ABORT: u8 = 0x07;

/// `true` if `report` carries a `DAP_TransferAbort` command. Aborts skip the
/// request queue everywhere, so every inbound path classifies with this.
pub fn is_transfer_abort(report: &[u8]) -> bool {
    report.first() == Some(&ID_DAP_TRANSFER_ABORT)
}

/// Response ID for commands the probe does not implement.
pub const ID_DAP_INVALID: u8 = 0xFF;

/// Answers every command with `ID_DAP_Invalid`.
///
/// Lets the probe enumerate and respond deterministically before a real
/// command interpreter is wired in.
#[derive(Debug, Default)]
pub struct Unsupported {
    aborts: u32,
}

impl Unsupported {
    pub const fn new() -> Self {
        Self { aborts: 0 }
    }

    /// Number of transfer aborts received.
    pub fn aborts(&self) -> u32 {
        self.aborts
    }
}

impl CommandProcessor for Unsupported {
    fn process(&mut self, request: &[u8], response: &mut [u8]) {
        response.fill(0);
        if let Some(first) = response.first_mut() {
            *first = ID_DAP_INVALID;
        }
        debug!("DAP: unsupported command {=u8:#x}", request.first().copied().unwrap_or(0));
    }

    fn abort_transfer(&mut self) {
        self.aborts = self.aborts.wrapping_add(1);
    }
}
