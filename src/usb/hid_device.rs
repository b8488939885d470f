//! USB HID DAP interface.
//!
//! Initialises the Embassy USB stack on the nRF52840 hardware USB
//! peripheral, exposes one HID endpoint pair, and implements the run
//! loop's [`Transport`] on top of `embassy-sync` channels.

use dap_probe::config::{
    self, LINK_EVENT_QUEUE_DEPTH, REPORT_BUFFER_SIZE, REPORT_QUEUE_DEPTH, REPORT_SIZE,
};
use dap_probe::dap::{is_transfer_abort, ID_DAP_TRANSFER_ABORT};
use dap_probe::exchange::decline_report_request;
use dap_probe::hid::{ReportType, DAP_REPORT_DESCRIPTOR};
use dap_probe::{Error, LinkEvent, Transport, TransportHandler};
use defmt::{info, warn};
use embassy_nrf::usb::vbus_detect::HardwareVbusDetect;
use embassy_nrf::usb::Driver;
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;
use embassy_usb::class::hid::{
    Config as HidConfig, HidReader, HidReaderWriter, HidWriter, ReportId, RequestHandler, State,
};
use embassy_usb::control::OutResponse;
use embassy_usb::{Builder, Config, UsbDevice};
use heapless::Vec;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBD => embassy_nrf::usb::InterruptHandler<peripherals::USBD>;
    CLOCK_POWER => embassy_nrf::usb::vbus_detect::InterruptHandler;
});

/// Instance number reported to the run loop; the probe has one HID interface.
const HID_INSTANCE: u8 = 0;

pub type UsbDriver = Driver<'static, peripherals::USBD, HardwareVbusDetect>;
pub type DapReader = HidReader<'static, UsbDriver, REPORT_SIZE>;
pub type DapWriter = HidWriter<'static, UsbDriver, REPORT_SIZE>;

/// Output report on its way from the USB stack to the run loop.
struct InboundReport {
    report_id: u8,
    report_type: ReportType,
    data: Vec<u8, REPORT_BUFFER_SIZE>,
}

/// Input report on its way from the run loop to the IN endpoint.
struct OutboundReport {
    data: Vec<u8, REPORT_SIZE>,
}

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static USB_LINK_HANDLER: StaticCell<LinkEventForwarder> = StaticCell::new();
static HID_CONTROL_HANDLER: StaticCell<ReportForwarder> = StaticCell::new();

static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, LINK_EVENT_QUEUE_DEPTH> =
    Channel::new();
static INBOUND_REPORTS: Channel<CriticalSectionRawMutex, InboundReport, REPORT_QUEUE_DEPTH> =
    Channel::new();
static OUTBOUND_REPORTS: Channel<CriticalSectionRawMutex, OutboundReport, REPORT_QUEUE_DEPTH> =
    Channel::new();

/// Pending `DAP_TransferAbort` (report ID and type). Kept out of
/// `INBOUND_REPORTS` so a queued request can never hold it back.
static TRANSFER_ABORT: Signal<CriticalSectionRawMutex, (u8, ReportType)> = Signal::new();

/// Turns USB device-state callbacks into [`LinkEvent`]s.
struct LinkEventForwarder {
    remote_wakeup: bool,
}

impl LinkEventForwarder {
    const fn new() -> Self {
        Self {
            remote_wakeup: false,
        }
    }

    fn publish(event: LinkEvent) {
        if LINK_EVENTS.try_send(event).is_err() {
            warn!("Link event queue full, dropped {}", event);
        }
    }
}

impl embassy_usb::Handler for LinkEventForwarder {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            Self::publish(LinkEvent::Detached);
        }
    }

    fn reset(&mut self) {
        Self::publish(LinkEvent::Detached);
    }

    fn configured(&mut self, configured: bool) {
        Self::publish(if configured {
            LinkEvent::Attached
        } else {
            LinkEvent::Detached
        });
    }

    fn suspended(&mut self, suspended: bool) {
        Self::publish(if suspended {
            LinkEvent::Suspended {
                remote_wakeup: self.remote_wakeup,
            }
        } else {
            LinkEvent::Resumed
        });
    }

    fn remote_wakeup_enabled(&mut self, enabled: bool) {
        self.remote_wakeup = enabled;
    }
}

/// Queues output reports for the run loop and declines GET_REPORT.
///
/// Serves both the OUT endpoint (via [`HidReader::run`]) and SET_REPORT /
/// GET_REPORT on the control pipe.
struct ReportForwarder;

fn split_report_id(id: ReportId) -> (u8, ReportType) {
    match id {
        ReportId::In(n) => (n, ReportType::Input),
        ReportId::Out(n) => (n, ReportType::Output),
        ReportId::Feature(n) => (n, ReportType::Feature),
    }
}

impl RequestHandler for ReportForwarder {
    fn get_report(&mut self, id: ReportId, buf: &mut [u8]) -> Option<usize> {
        let (report_id, report_type) = split_report_id(id);
        match decline_report_request(report_id, report_type, buf) {
            0 => None,
            n => Some(n),
        }
    }

    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        let (report_id, report_type) = split_report_id(id);
        if is_transfer_abort(data) {
            TRANSFER_ABORT.signal((report_id, report_type));
            return OutResponse::Accepted;
        }

        let data = match Vec::from_slice(&data[..data.len().min(REPORT_BUFFER_SIZE)]) {
            Ok(data) => data,
            Err(()) => return OutResponse::Rejected,
        };

        let report = InboundReport {
            report_id,
            report_type,
            data,
        };
        match INBOUND_REPORTS.try_send(report) {
            Ok(()) => OutResponse::Accepted,
            Err(_) => {
                warn!("DAP request dropped: previous request still queued");
                OutResponse::Rejected
            }
        }
    }
}

/// The run loop's view of the USB device.
pub struct UsbTransport {
    link_events: Receiver<'static, CriticalSectionRawMutex, LinkEvent, LINK_EVENT_QUEUE_DEPTH>,
    transfer_abort: &'static Signal<CriticalSectionRawMutex, (u8, ReportType)>,
    inbound: Receiver<'static, CriticalSectionRawMutex, InboundReport, REPORT_QUEUE_DEPTH>,
    outbound: Sender<'static, CriticalSectionRawMutex, OutboundReport, REPORT_QUEUE_DEPTH>,
}

impl Transport for UsbTransport {
    fn service<H: TransportHandler>(&mut self, handler: &mut H) {
        while let Ok(event) = self.link_events.try_receive() {
            event.dispatch(handler);
        }

        // Replayed ahead of the queue so it reaches the processor even while
        // a request is pending.
        if let Some((report_id, report_type)) = self.transfer_abort.try_take() {
            handler.on_report_received(
                HID_INSTANCE,
                report_id,
                report_type,
                &[ID_DAP_TRANSFER_ABORT],
            );
        }

        while let Ok(report) = self.inbound.try_receive() {
            handler.on_report_received(
                HID_INSTANCE,
                report.report_id,
                report.report_type,
                &report.data,
            );
        }
    }

    fn transmit(&mut self, report: &[u8]) -> Result<(), Error> {
        let data = Vec::from_slice(report).map_err(|_| Error::BufferOverflow)?;
        self.outbound
            .try_send(OutboundReport { data })
            .map_err(|_| Error::TransmitQueueFull)
    }
}

/// Build result containing the USB device runner, the HID endpoint halves
/// and the transport handed to the run loop.
pub struct UsbDapDevice {
    pub device: UsbDevice<'static, UsbDriver>,
    pub reader: DapReader,
    pub writer: DapWriter,
    pub transport: UsbTransport,
}

/// Initialise the USB stack and create the DAP HID device.
///
/// Must be called exactly once.  All static buffers are consumed here.
pub fn init(usbd: peripherals::USBD, serial_number: &'static str) -> UsbDapDevice {
    // Create the low-level USB driver with hardware VBUS detection.
    let driver = Driver::new(usbd, Irqs, HardwareVbusDetect::new(Irqs));

    // USB device-level configuration.
    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(serial_number);
    usb_config.max_power = config::USB_MAX_POWER_MA;
    usb_config.max_packet_size_0 = 64;

    // Allocate static descriptor buffers.
    let config_desc = USB_CONFIG_DESC.init([0u8; 256]);
    let bos_desc = USB_BOS_DESC.init([0u8; 256]);
    let msos_desc = USB_MSOS_DESC.init([0u8; 256]);
    let ctrl_buf = USB_CTRL_BUF.init([0u8; 128]);

    // Build the USB device.
    let mut builder = Builder::new(
        driver,
        usb_config,
        config_desc,
        bos_desc,
        msos_desc,
        ctrl_buf,
    );

    let link_handler = USB_LINK_HANDLER.init(LinkEventForwarder::new());
    builder.handler(link_handler);

    let hid_state = HID_STATE.init(State::new());
    let hid_config = HidConfig {
        report_descriptor: DAP_REPORT_DESCRIPTOR,
        request_handler: Some(HID_CONTROL_HANDLER.init(ReportForwarder)),
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: REPORT_SIZE as u16,
    };
    let hid = HidReaderWriter::<_, REPORT_SIZE, REPORT_SIZE>::new(&mut builder, hid_state, hid_config);
    let (reader, writer) = hid.split();

    let device = builder.build();

    info!("USB DAP device initialised (serial {})", serial_number);

    UsbDapDevice {
        device,
        reader,
        writer,
        transport: UsbTransport {
            link_events: LINK_EVENTS.receiver(),
            transfer_abort: &TRANSFER_ABORT,
            inbound: INBOUND_REPORTS.receiver(),
            outbound: OUTBOUND_REPORTS.sender(),
        },
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
///
/// This handles USB enumeration, suspend/resume, and control requests.
/// It runs forever (or until the USB cable is disconnected).
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// OUT endpoint task - hands every received report to the run loop queue.
pub async fn hid_reader_task(reader: DapReader) -> ! {
    info!("HID reader task started");
    let mut handler = ReportForwarder;
    reader.run(false, &mut handler).await
}

/// IN endpoint task - writes queued DAP responses to the host.
pub async fn hid_writer_task(mut writer: DapWriter) -> ! {
    info!("HID writer task started - waiting for responses");

    loop {
        let report = OUTBOUND_REPORTS.receive().await;
        if let Err(_e) = writer.write(&report.data).await {
            warn!("USB DAP response write failed");
        }
    }
}
