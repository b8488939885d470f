//! DAP report exchange - one command in, one response out.
//!
//! Inbound reports are accepted from the transport callback into the
//! request buffer and marked busy. The run loop later drains the exchange:
//! the command processor runs outside any USB callback, its response goes
//! back out over the same interface, and the exchange returns to idle.
//!
//! Only one request is live at a time. A report arriving while busy is
//! discarded, never written over the pending one. The exchange stays busy
//! until the transport has taken the response. `DAP_TransferAbort`
//! bypasses the queue: it only raises a flag for the processor.

use crate::config::{REPORT_BUFFER_SIZE, REPORT_SIZE};
use crate::dap::is_transfer_abort;
use crate::hid::ReportType;
use crate::transport::Transport;

/// Executes debug-probe commands.
pub trait CommandProcessor {
    /// Run one command. `request` and `response` are each exactly one
    /// report long; the processor must fill `response` before returning.
    fn process(&mut self, request: &[u8], response: &mut [u8]);

    /// The host asked to cancel the transfer in progress.
    fn abort_transfer(&mut self) {}
}

/// GET_REPORT policy: the probe has nothing to return on the control pipe.
/// Returns zero so the stack stalls the request; `buf` is left untouched.
pub fn decline_report_request(report_id: u8, report_type: ReportType, _buf: &mut [u8]) -> usize {
    trace!("GET_REPORT declined: id={} type={}", report_id, report_type);
    0
}

/// Counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExchangeStats {
    /// Reports queued for processing.
    pub accepted: u32,
    /// Reports dropped because a request was already pending.
    pub discarded: u32,
    /// Transfer aborts forwarded to the processor.
    pub aborted: u32,
}

/// Request/response buffer pair plus the busy flag.
pub struct ReportExchange {
    request: [u8; REPORT_BUFFER_SIZE],
    response: [u8; REPORT_BUFFER_SIZE],
    request_len: usize,
    busy: bool,
    /// `response` holds the processor output for the pending request.
    response_ready: bool,
    abort_requested: bool,
    stats: ExchangeStats,
}

impl Default for ReportExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportExchange {
    pub const fn new() -> Self {
        Self {
            request: [0; REPORT_BUFFER_SIZE],
            response: [0; REPORT_BUFFER_SIZE],
            request_len: 0,
            busy: false,
            response_ready: false,
            abort_requested: false,
            stats: ExchangeStats {
                accepted: 0,
                discarded: 0,
                aborted: 0,
            },
        }
    }

    /// A request is waiting for the run loop.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// A transfer abort is waiting to be forwarded.
    pub fn abort_pending(&self) -> bool {
        self.abort_requested
    }

    pub fn stats(&self) -> ExchangeStats {
        self.stats
    }

    /// Accept an output report. Returns `true` if it was queued.
    ///
    /// The probe has a single interface without report IDs, so `instance`
    /// and `report_id` are only logged.
    pub fn on_report_received(
        &mut self,
        instance: u8,
        report_id: u8,
        report_type: ReportType,
        data: &[u8],
    ) -> bool {
        trace!(
            "Report in: itf={} id={} type={} len={}",
            instance,
            report_id,
            report_type,
            data.len()
        );

        if data.is_empty() {
            warn!("Empty report ignored");
            return false;
        }

        if is_transfer_abort(data) {
            debug!("DAP transfer abort requested");
            self.abort_requested = true;
            return false;
        }

        if self.busy {
            self.stats.discarded = self.stats.discarded.wrapping_add(1);
            warn!("Report discarded: request still pending");
            return false;
        }

        let n = data.len().min(REPORT_BUFFER_SIZE);
        self.request[..n].copy_from_slice(&data[..n]);
        self.request[n..].fill(0);
        self.request_len = data.len();
        self.busy = true;
        self.stats.accepted = self.stats.accepted.wrapping_add(1);
        true
    }

    /// GET_REPORT from the host. Always declined.
    pub fn on_report_requested(
        &self,
        _instance: u8,
        report_id: u8,
        report_type: ReportType,
        buf: &mut [u8],
    ) -> usize {
        decline_report_request(report_id, report_type, buf)
    }

    /// Forward a pending abort, then process and answer the pending request.
    ///
    /// Returns `true` once the response went to the transport. The processor
    /// runs once per request. If the transport refuses the response, the
    /// exchange stays busy and the same `min(REPORT_SIZE, length)` bytes are
    /// offered again on the next call.
    pub fn drain<C, T>(&mut self, processor: &mut C, transport: &mut T) -> bool
    where
        C: CommandProcessor,
        T: Transport,
    {
        if self.abort_requested {
            self.abort_requested = false;
            self.stats.aborted = self.stats.aborted.wrapping_add(1);
            processor.abort_transfer();
        }

        if !self.busy {
            return false;
        }

        if !self.response_ready {
            processor.process(&self.request[..REPORT_SIZE], &mut self.response[..REPORT_SIZE]);
            self.response_ready = true;
        }

        let len = self.request_len.min(REPORT_SIZE);
        match transport.transmit(&self.response[..len]) {
            Ok(()) => {
                self.response_ready = false;
                self.busy = false;
                true
            }
            Err(e) => {
                debug!("DAP response of {} bytes deferred: {}", len, e);
                false
            }
        }
    }
}
