//! Link task
//!
//! Runs the uartlink session on the board UART for the lifetime of the
//! firmware.

use defmt::*;

use uartlink_core::{LinkConfig, LinkSession};
use uartlink_hal_rp2040::{RpUartRx, RpUartTx};

use crate::report::DefmtReporter;

/// Link task - answers handshakes and validates packets
#[embassy_executor::task]
pub async fn link_task(rx: RpUartRx, tx: RpUartTx, config: LinkConfig) {
    info!("Link task started");

    let reporter = DefmtReporter::new(config.tag.clone());
    let mut session: LinkSession<_, _, _> = LinkSession::new(rx, tx, reporter, config);

    session.run().await
}
