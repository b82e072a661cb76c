//! uartlink - device firmware
//!
//! Answers the uartlink serial protocol on UART0: handshake probes get
//! `0x55`, data packets get ACK or NACK after length and CRC-8 checks.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use uartlink_core::{parse_config, LinkConfig};
use uartlink_hal_rp2040::{rp_config, uart_pins, RpUartRx, RpUartTx};

mod report;
mod tasks;

/// Embedded link configuration (validated by build.rs)
const EMBEDDED_CONFIG: &str = include_str!("../link.toml");

/// Board wiring: GPIO16 = TX, GPIO17 = RX
const TX_GPIO: u8 = 16;
const RX_GPIO: u8 = 17;
const _: () = core::assert!(
    uart_pins(TX_GPIO, RX_GPIO).is_some(),
    "TX/RX GPIOs must be a TX/RX pair of the same UART"
);

/// UART ring buffer sizes
const TX_BUF_SIZE: usize = 64;
const RX_BUF_SIZE: usize = 1024;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; TX_BUF_SIZE]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; RX_BUF_SIZE]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("uartlink firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // LinkConfig only varies the baud rate, which the RP2040 always accepts
    let uart_config = unwrap!(rp_config(&config.uart()));

    let tx_buf = TX_BUF.init([0u8; TX_BUF_SIZE]);
    let rx_buf = RX_BUF.init([0u8; RX_BUF_SIZE]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_16, p.PIN_17, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!(
        "UART Initialized ({} baud, TX=GPIO{}, RX=GPIO{})",
        config.baudrate, TX_GPIO, RX_GPIO
    );

    spawner
        .spawn(tasks::link_task(RpUartRx::new(rx), RpUartTx::new(tx), config))
        .unwrap();

    info!("All tasks spawned");
}

/// Parse the embedded configuration, falling back to defaults
fn load_config() -> LinkConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Link config: read_timeout={}ms, frame_gap={}ms",
                config.read_timeout_ms, config.frame_gap_ms
            );
            config
        }
        Err(e) => {
            // build.rs rejects bad files, so this only fires if the parsers diverge
            error!("Embedded link.toml rejected: {}", e);
            LinkConfig::default()
        }
    }
}
