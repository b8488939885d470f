//! Cooperative run loop.
//!
//! One iteration:
//!
//! 1. service the transport - link events and inbound reports are
//!    delivered to [`Probe`] here and nowhere else;
//! 2. drain the report exchange - the command processor runs here;
//! 3. tick the status LED.
//!
//! Nothing in an iteration waits on the host. The caller decides how often
//! to iterate and what to do in between (the firmware yields to the
//! executor so the USB tasks can run).

use crate::exchange::{CommandProcessor, ReportExchange};
use crate::hid::ReportType;
use crate::status::{BlinkInterval, LinkState, StatusIndicator};
use crate::transport::{Transport, TransportHandler};
use embedded_hal::digital::OutputPin;

/// Probe state touched by transport callbacks: link state, LED and the
/// report exchange.
pub struct Probe<P> {
    link: LinkState,
    indicator: StatusIndicator<P>,
    exchange: ReportExchange,
}

impl<P: OutputPin> Probe<P> {
    pub fn new(led: P) -> Self {
        Self {
            link: LinkState::NotAttached,
            indicator: StatusIndicator::new(led),
            exchange: ReportExchange::new(),
        }
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn blink_interval(&self) -> BlinkInterval {
        self.indicator.interval()
    }

    pub fn indicator(&self) -> &StatusIndicator<P> {
        &self.indicator
    }

    pub fn exchange(&self) -> &ReportExchange {
        &self.exchange
    }

    /// Stop blinking. The next link state change re-enables the LED.
    pub fn disable_indicator(&mut self) {
        self.indicator.set_interval(BlinkInterval::DISABLED);
    }

    fn set_link_state(&mut self, state: LinkState) {
        if state != self.link {
            info!("Link: {} -> {}", self.link, state);
        }
        self.link = state;
        self.indicator.set_interval(BlinkInterval::for_link_state(state));
    }
}

impl<P: OutputPin> TransportHandler for Probe<P> {
    fn on_attach(&mut self) {
        self.set_link_state(LinkState::Attached);
    }

    fn on_detach(&mut self) {
        self.set_link_state(LinkState::NotAttached);
    }

    fn on_suspend(&mut self, remote_wakeup: bool) {
        debug!("USB suspend: remote_wakeup={}", remote_wakeup);
        self.set_link_state(LinkState::Suspended);
    }

    fn on_resume(&mut self) {
        self.set_link_state(LinkState::Attached);
    }

    fn on_report_received(
        &mut self,
        instance: u8,
        report_id: u8,
        report_type: ReportType,
        data: &[u8],
    ) {
        self.exchange
            .on_report_received(instance, report_id, report_type, data);
    }

    fn on_report_requested(
        &mut self,
        instance: u8,
        report_id: u8,
        report_type: ReportType,
        buf: &mut [u8],
    ) -> usize {
        self.exchange
            .on_report_requested(instance, report_id, report_type, buf)
    }
}

/// Owns the transport, the command processor and the probe state.
pub struct RunLoop<T, C, P> {
    transport: T,
    processor: C,
    probe: Probe<P>,
}

impl<T, C, P> RunLoop<T, C, P>
where
    T: Transport,
    C: CommandProcessor,
    P: OutputPin,
{
    pub fn new(transport: T, processor: C, led: P) -> Self {
        Self {
            transport,
            processor,
            probe: Probe::new(led),
        }
    }

    pub fn probe(&self) -> &Probe<P> {
        &self.probe
    }

    pub fn probe_mut(&mut self) -> &mut Probe<P> {
        &mut self.probe
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn processor(&self) -> &C {
        &self.processor
    }

    /// Run one iteration at time `now_ms` (milliseconds since boot).
    pub fn run_once(&mut self, now_ms: u64) {
        self.transport.service(&mut self.probe);
        self.probe
            .exchange
            .drain(&mut self.processor, &mut self.transport);
        self.probe.indicator.tick(now_ms);
    }
}
