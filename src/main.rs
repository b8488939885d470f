//! dap-probe firmware entry point.
//!
//! Brings up the nRF52840, starts the USB tasks, then runs the probe's
//! cooperative run loop on the main task for the life of the device.

#![no_std]
#![no_main]

mod usb;

use dap_probe::config::{self, REPORT_SIZE};
use dap_probe::dap::Unsupported;
use dap_probe::serial::{self, SERIAL_LEN};
use dap_probe::RunLoop;
use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::config::HfclkSource;
use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::pac;
use embassy_time::{Duration, Instant, Timer};
use embassy_usb::UsbDevice;
use heapless::String;
use static_cell::StaticCell;
use usb::hid_device::{self, DapReader, DapWriter, UsbDriver};
use {defmt_rtt as _, panic_probe as _};

static SERIAL_NUMBER: StaticCell<String<SERIAL_LEN>> = StaticCell::new();

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    hid_device::run_usb_device(device).await
}

/// Both HID endpoint halves in one task; neither side ever returns.
#[embassy_executor::task]
async fn hid_task(reader: DapReader, writer: DapWriter) -> ! {
    match select(
        hid_device::hid_reader_task(reader),
        hid_device::hid_writer_task(writer),
    )
    .await
    {
        Either::First(never) => never,
        Either::Second(never) => never,
    }
}

/// Read the factory-programmed 64-bit device identifier.
fn read_device_id() -> u64 {
    serial::device_id([pac::FICR.deviceid(0).read(), pac::FICR.deviceid(1).read()])
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("dap-probe starting ({}-byte DAP packets)", REPORT_SIZE);

    // USB needs the external crystal as the high-frequency clock source.
    let mut nrf_config = embassy_nrf::config::Config::default();
    nrf_config.hfclk_source = HfclkSource::ExternalXtal;
    let p = embassy_nrf::init(nrf_config);

    // Status LED (nRF52840-DK LED1). Starts at the indicator's initial phase.
    let led = Output::new(p.P0_13, Level::Low, OutputDrive::Standard);

    let serial = match serial::format_serial(read_device_id()) {
        Ok(serial) => serial,
        Err(e) => {
            warn!("Serial number unavailable: {}", e);
            String::new()
        }
    };
    let serial_number: &'static String<SERIAL_LEN> = SERIAL_NUMBER.init(serial);

    let usb = hid_device::init(p.USBD, serial_number.as_str());
    spawner.must_spawn(usb_task(usb.device));
    spawner.must_spawn(hid_task(usb.reader, usb.writer));

    let mut run_loop = RunLoop::new(usb.transport, Unsupported::new(), led);
    info!("Run loop started");

    loop {
        run_loop.run_once(Instant::now().as_millis());
        Timer::after(Duration::from_millis(config::RUN_LOOP_PERIOD_MS)).await;
    }
}
