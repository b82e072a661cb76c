//! Host-side peer
//!
//! The counterpart of [`LinkSession`](crate::session::LinkSession): probes
//! the device with a handshake and delivers packets, one attempt each.
//! Whether to try again after a NACK or a timeout is up to the caller.
//!
//! The first byte read after a request is taken as the answer. A stale byte
//! left in the receive buffer from an earlier exchange therefore fails the
//! request with [`PeerError::Unexpected`] rather than being skipped; drain
//! the receiver first if the line may hold leftovers.

use uartlink_hal::{UartRx, UartTx};
use uartlink_protocol::{EncodeError, Packet, Response, HANDSHAKE_REQUEST};

use crate::config::LinkConfig;

/// Errors from a peer exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerError<Rx, Tx> {
    /// Receive failed
    Read(Rx),
    /// Send failed
    Write(Tx),
    /// Payload cannot be framed
    Encode(EncodeError),
    /// No byte arrived within the response timeout
    NoResponse,
    /// A byte arrived that is not a valid answer to the request
    Unexpected(u8),
}

/// Host end of the link
pub struct LinkPeer<R, T> {
    rx: R,
    tx: T,
    response_timeout_ms: u32,
}

impl<R, T> LinkPeer<R, T>
where
    R: UartRx,
    T: UartTx,
{
    /// Create a peer using the response timeout from `config`
    pub fn new(rx: R, tx: T, config: &LinkConfig) -> Self {
        Self::with_timeout(rx, tx, config.response_timeout_ms)
    }

    /// Create a peer with an explicit response timeout
    pub fn with_timeout(rx: R, tx: T, response_timeout_ms: u32) -> Self {
        Self {
            rx,
            tx,
            response_timeout_ms,
        }
    }

    /// Release the transport halves
    pub fn into_parts(self) -> (R, T) {
        (self.rx, self.tx)
    }

    /// Probe the device
    ///
    /// Succeeds only if the device answers with the handshake response.
    pub async fn handshake(&mut self) -> Result<(), PeerError<R::Error, T::Error>> {
        self.transmit(&[HANDSHAKE_REQUEST]).await?;

        match self.await_response().await? {
            Response::HandshakeResponse => Ok(()),
            other => Err(PeerError::Unexpected(other.to_byte())),
        }
    }

    /// Deliver one packet and return the device's verdict
    ///
    /// `Ok(Response::Nack)` means the device received something but rejected
    /// it; the packet was not delivered.
    pub async fn send(&mut self, payload: &[u8]) -> Result<Response, PeerError<R::Error, T::Error>> {
        let frame = Packet::new(payload)
            .and_then(|packet| packet.encode_to_vec())
            .map_err(PeerError::Encode)?;

        self.transmit(&frame).await?;

        match self.await_response().await? {
            response @ (Response::Ack | Response::Nack) => Ok(response),
            other => Err(PeerError::Unexpected(other.to_byte())),
        }
    }

    async fn transmit(&mut self, data: &[u8]) -> Result<(), PeerError<R::Error, T::Error>> {
        self.tx.write_all(data).await.map_err(PeerError::Write)?;
        self.tx.flush().await.map_err(PeerError::Write)
    }

    async fn await_response(&mut self) -> Result<Response, PeerError<R::Error, T::Error>> {
        let byte = self
            .rx
            .read_byte_timeout(self.response_timeout_ms)
            .await
            .map_err(PeerError::Read)?
            .ok_or(PeerError::NoResponse)?;

        Response::from_byte(byte).ok_or(PeerError::Unexpected(byte))
    }
}
