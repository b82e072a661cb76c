//! Device-side link session
//!
//! Owns the receive/classify/respond loop. Each iteration:
//!
//! 1. waits up to `read_timeout_ms` for a datagram (silence is not an error)
//! 2. answers a lone handshake byte with `0x55`
//! 3. otherwise validates the datagram as a packet and answers ACK or NACK
//!
//! Exactly one response byte is written per non-empty datagram. Nothing
//! carries over from one iteration to the next except diagnostic counters.

use uartlink_hal::{UartRx, UartTx};
use uartlink_protocol::{is_handshake, parse_packet, Response};

use crate::config::LinkConfig;
use crate::report::{LinkEvent, Reporter};

/// Default receive buffer size in bytes
pub const DEFAULT_RX_BUF_SIZE: usize = 1024;

/// Result of one session iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Read timed out with no data; nothing was sent
    Idle,
    /// Handshake request answered
    Handshake,
    /// Datagram validated as a packet and answered
    Packet(Response),
}

/// Transport failure during an iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<Rx, Tx> {
    /// Receive failed; any bytes already collected were dropped
    Read(Rx),
    /// Sending the response failed
    Write(Tx),
}

/// Diagnostic counters
///
/// These never influence how a datagram is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Non-empty datagrams received
    pub datagrams: u32,
    /// Handshake requests answered
    pub handshakes: u32,
    /// Packets acknowledged
    pub acks: u32,
    /// Datagrams rejected
    pub nacks: u32,
    /// Receive failures
    pub rx_errors: u32,
    /// Transmit failures
    pub tx_errors: u32,
}

/// Receive/validate/respond loop over a UART
pub struct LinkSession<R, T, P, const N: usize = DEFAULT_RX_BUF_SIZE> {
    rx: R,
    tx: T,
    reporter: P,
    config: LinkConfig,
    stats: LinkStats,
    buf: [u8; N],
}

impl<R, T, P, const N: usize> LinkSession<R, T, P, N>
where
    R: UartRx,
    T: UartTx,
    P: Reporter,
{
    /// Create a new session
    pub fn new(rx: R, tx: T, reporter: P, config: LinkConfig) -> Self {
        Self {
            rx,
            tx,
            reporter,
            config,
            stats: LinkStats::default(),
            buf: [0u8; N],
        }
    }

    /// Active configuration
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Counters since the session was created
    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    /// Release the transport halves and the reporter
    pub fn into_parts(self) -> (R, T, P) {
        (self.rx, self.tx, self.reporter)
    }

    /// Receive one datagram into the internal buffer
    ///
    /// Waits up to `read_timeout_ms` for the first bytes, then keeps reading
    /// until the line has been quiet for `frame_gap_ms` or the buffer is
    /// full. Returns the datagram length, 0 on timeout.
    async fn receive(&mut self) -> Result<usize, R::Error> {
        let mut len = self
            .rx
            .read_timeout(&mut self.buf, self.config.read_timeout_ms)
            .await?;
        if len == 0 {
            return Ok(0);
        }

        while len < N {
            let n = self
                .rx
                .read_timeout(&mut self.buf[len..], self.config.frame_gap_ms)
                .await?;
            if n == 0 {
                break;
            }
            len += n;
        }

        Ok(len)
    }

    /// Run one iteration: receive, classify, respond
    ///
    /// Transport errors are returned to the caller; malformed datagrams are
    /// not errors, they are answered with NACK.
    pub async fn poll_once(&mut self) -> Result<Outcome, LinkError<R::Error, T::Error>> {
        let len = self.receive().await.map_err(LinkError::Read)?;
        if len == 0 {
            return Ok(Outcome::Idle);
        }

        self.stats.datagrams = self.stats.datagrams.saturating_add(1);
        let span = &self.buf[..len];
        self.reporter.report(&LinkEvent::Received { bytes: span });

        // A lone handshake byte never reaches the packet validator
        if is_handshake(span) {
            send(&mut self.tx, Response::HandshakeResponse)
                .await
                .map_err(LinkError::Write)?;
            self.stats.handshakes = self.stats.handshakes.saturating_add(1);
            self.reporter.report(&LinkEvent::HandshakeComplete);
            return Ok(Outcome::Handshake);
        }

        let verdict = parse_packet(span);
        match &verdict {
            Ok(packet) => self.reporter.report(&LinkEvent::PacketAccepted {
                payload: packet.payload,
            }),
            Err(e) => self.reporter.report(&LinkEvent::Rejected(*e)),
        }

        let response = Response::from(&verdict);
        send(&mut self.tx, response)
            .await
            .map_err(LinkError::Write)?;

        match response {
            Response::Ack => self.stats.acks = self.stats.acks.saturating_add(1),
            _ => self.stats.nacks = self.stats.nacks.saturating_add(1),
        }

        Ok(Outcome::Packet(response))
    }

    /// Run one iteration, absorbing transport errors
    ///
    /// Errors are reported and counted; `None` means the iteration failed
    /// and the next one starts from scratch.
    pub async fn service(&mut self) -> Option<Outcome> {
        match self.poll_once().await {
            Ok(outcome) => Some(outcome),
            Err(LinkError::Read(_)) => {
                self.stats.rx_errors = self.stats.rx_errors.saturating_add(1);
                self.reporter.report(&LinkEvent::ReadFailed);
                None
            }
            Err(LinkError::Write(_)) => {
                self.stats.tx_errors = self.stats.tx_errors.saturating_add(1);
                self.reporter.report(&LinkEvent::WriteFailed);
                None
            }
        }
    }

    /// Serve the link forever
    pub async fn run(&mut self) -> ! {
        self.reporter.report(&LinkEvent::Started);
        loop {
            self.service().await;
        }
    }
}

/// Write a single response byte and wait for it to leave the buffer
async fn send<T: UartTx>(tx: &mut T, response: Response) -> Result<(), T::Error> {
    tx.write_byte(response.to_byte()).await?;
    tx.flush().await
}
