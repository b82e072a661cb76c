//! defmt sink for link events

use defmt::*;
use heapless::String;

use uartlink_core::config::MAX_TAG_LEN;
use uartlink_core::{Level, LinkEvent, Reporter};
use uartlink_protocol::FrameError;

/// Forwards link events to defmt, prefixed with the configured tag
pub struct DefmtReporter {
    tag: String<MAX_TAG_LEN>,
}

impl DefmtReporter {
    pub fn new(tag: String<MAX_TAG_LEN>) -> Self {
        Self { tag }
    }
}

impl Reporter for DefmtReporter {
    fn report(&mut self, event: &LinkEvent<'_>) {
        let tag = self.tag.as_str();
        match *event {
            LinkEvent::Started => info!("[{}] Link session started", tag),
            LinkEvent::Received { bytes } => {
                debug!("[{}] Received {} bytes", tag, bytes.len());
                trace!("[{}] Bytes = {=[u8]:#x}", tag, bytes);
            }
            LinkEvent::HandshakeComplete => info!("[{}] Handshake successful", tag),
            LinkEvent::PacketAccepted { payload } => {
                info!("[{}] Valid packet: {=[u8]:a}", tag, payload)
            }
            LinkEvent::Rejected(FrameError::LengthMismatch { declared, received }) => warn!(
                "[{}] Length mismatch! Declared={}, Received={}",
                tag, declared, received
            ),
            LinkEvent::Rejected(FrameError::Checksum {
                received,
                calculated,
            }) => warn!(
                "[{}] CRC mismatch! Got={=u8:#x} Expected={=u8:#x}",
                tag, received, calculated
            ),
            LinkEvent::Rejected(e) => match event.level() {
                Level::Warn => warn!("[{}] Rejected datagram: {}", tag, e),
                _ => debug!("[{}] Rejected datagram: {}", tag, e),
            },
            LinkEvent::ReadFailed => warn!("[{}] UART read failed, datagram dropped", tag),
            LinkEvent::WriteFailed => warn!("[{}] Failed to send response", tag),
        }
    }
}
