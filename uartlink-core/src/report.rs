//! Diagnostic reporting interface
//!
//! The session never logs directly. It describes what happened as a
//! [`LinkEvent`] and hands it to a [`Reporter`]; the firmware forwards
//! events to defmt, tests record them.

use uartlink_protocol::FrameError;

/// Severity of a link event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Debug,
    Info,
    Warn,
}

/// Something the link session observed
///
/// Borrowed data only lives for the duration of the `report` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent<'a> {
    /// Session loop entered
    Started,
    /// A non-empty datagram arrived
    Received { bytes: &'a [u8] },
    /// Handshake request answered
    HandshakeComplete,
    /// Valid packet acknowledged
    PacketAccepted { payload: &'a [u8] },
    /// Datagram rejected with NACK
    Rejected(FrameError),
    /// Transport failed while receiving; the partial datagram was dropped
    ReadFailed,
    /// Transport failed while sending a response
    WriteFailed,
}

impl LinkEvent<'_> {
    /// Severity of this event
    pub fn level(&self) -> Level {
        match self {
            LinkEvent::Received { .. } => Level::Debug,
            LinkEvent::Started | LinkEvent::HandshakeComplete | LinkEvent::PacketAccepted { .. } => {
                Level::Info
            }
            // Corruption of an otherwise well-formed frame is worth a warning;
            // noise and truncated bursts are routine on a serial line
            LinkEvent::Rejected(FrameError::LengthMismatch { .. })
            | LinkEvent::Rejected(FrameError::Checksum { .. }) => Level::Warn,
            LinkEvent::Rejected(_) => Level::Debug,
            LinkEvent::ReadFailed | LinkEvent::WriteFailed => Level::Warn,
        }
    }
}

/// Sink for link events
///
/// Reporting cannot fail from the session's point of view.
pub trait Reporter {
    /// Handle one event
    fn report(&mut self, event: &LinkEvent<'_>);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: &LinkEvent<'_>) {
        R::report(self, event)
    }
}

/// Reporter that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&mut self, _event: &LinkEvent<'_>) {}
}
