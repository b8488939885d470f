//! Transport boundary between the USB stack and the run loop.
//!
//! The USB stack raises events from interrupt context or from its own
//! task. The run loop never sees them there: the transport buffers them and
//! replays them as [`TransportHandler`] calls when the run loop services it.
//! Each call runs to completion before the next one starts.

use crate::error::Error;
use crate::hid::ReportType;

/// Callbacks delivered by [`Transport::service`].
pub trait TransportHandler {
    /// The host configured the device.
    fn on_attach(&mut self);

    /// The device was unplugged, reset, or deconfigured.
    fn on_detach(&mut self);

    /// The host suspended the bus. `remote_wakeup` tells whether the host
    /// allows the device to signal a wakeup.
    fn on_suspend(&mut self, remote_wakeup: bool);

    /// The host resumed the bus.
    fn on_resume(&mut self);

    /// An output report arrived (OUT endpoint or SET_REPORT).
    fn on_report_received(
        &mut self,
        instance: u8,
        report_id: u8,
        report_type: ReportType,
        data: &[u8],
    );

    /// The host asked for a report (GET_REPORT). Returns the number of bytes
    /// written into `buf`; zero makes the stack stall the request.
    fn on_report_requested(
        &mut self,
        instance: u8,
        report_id: u8,
        report_type: ReportType,
        buf: &mut [u8],
    ) -> usize;
}

/// The USB side as seen by the run loop. Both methods must return without
/// waiting for the host.
pub trait Transport {
    /// Replay all pending transport work into `handler`.
    fn service<H: TransportHandler>(&mut self, handler: &mut H);

    /// Queue one input report for the host.
    fn transmit(&mut self, report: &[u8]) -> Result<(), Error>;
}

/// Link-level USB event, queued between the USB stack and the run loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    Attached,
    Detached,
    Suspended { remote_wakeup: bool },
    Resumed,
}

impl LinkEvent {
    /// Deliver this event to the matching handler callback.
    pub fn dispatch<H: TransportHandler>(self, handler: &mut H) {
        match self {
            LinkEvent::Attached => handler.on_attach(),
            LinkEvent::Detached => handler.on_detach(),
            LinkEvent::Suspended { remote_wakeup } => handler.on_suspend(remote_wakeup),
            LinkEvent::Resumed => handler.on_resume(),
        }
    }
}
