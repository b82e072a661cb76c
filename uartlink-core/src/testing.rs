//! In-memory transports and reporters for unit tests

use std::collections::VecDeque;
use std::vec::Vec;

use uartlink_hal::{UartRx, UartTx};
use uartlink_protocol::FrameError;

use crate::report::{LinkEvent, Reporter};

/// Error returned by the mock transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

/// One scripted result of `read_timeout`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Bytes available (may be split across several reads)
    Data(Vec<u8>),
    /// Timeout with no data
    Silence,
    /// Peripheral fault
    Fail,
}

/// Receiver that replays a script, then stays silent
#[derive(Debug, Default)]
pub struct ScriptedRx {
    script: VecDeque<Step>,
    /// Timeout passed to every `read_timeout` call, in order
    pub timeouts: Vec<u32>,
}

impl ScriptedRx {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            script: steps.into_iter().collect(),
            timeouts: Vec::new(),
        }
    }

    /// Append bytes followed by the silence that ends a datagram
    pub fn push_datagram(&mut self, bytes: &[u8]) {
        self.script.push_back(Step::Data(bytes.to_vec()));
        self.script.push_back(Step::Silence);
    }

    pub fn is_drained(&self) -> bool {
        self.script.is_empty()
    }
}

impl UartRx for ScriptedRx {
    type Error = MockError;

    async fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, MockError> {
        self.timeouts.push(timeout_ms);
        match self.script.pop_front() {
            None | Some(Step::Silence) => Ok(0),
            Some(Step::Fail) => Err(MockError),
            Some(Step::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.script.push_front(Step::Data(bytes.split_off(n)));
                }
                Ok(n)
            }
        }
    }
}

/// Transmitter that records everything written
#[derive(Debug, Default)]
pub struct RecordingTx {
    pub written: Vec<u8>,
    pub flushes: usize,
    /// Fail this many upcoming writes
    pub fail_writes: usize,
}

impl UartTx for RecordingTx {
    type Error = MockError;

    async fn write_all(&mut self, data: &[u8]) -> Result<(), MockError> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(MockError);
        }
        self.written.extend_from_slice(data);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), MockError> {
        self.flushes += 1;
        Ok(())
    }
}

/// Owned copy of a [`LinkEvent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Started,
    Received(Vec<u8>),
    HandshakeComplete,
    PacketAccepted(Vec<u8>),
    Rejected(FrameError),
    ReadFailed,
    WriteFailed,
}

/// Reporter that keeps every event
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<Recorded>,
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: &LinkEvent<'_>) {
        let recorded = match *event {
            LinkEvent::Started => Recorded::Started,
            LinkEvent::Received { bytes } => Recorded::Received(bytes.to_vec()),
            LinkEvent::HandshakeComplete => Recorded::HandshakeComplete,
            LinkEvent::PacketAccepted { payload } => Recorded::PacketAccepted(payload.to_vec()),
            LinkEvent::Rejected(e) => Recorded::Rejected(e),
            LinkEvent::ReadFailed => Recorded::ReadFailed,
            LinkEvent::WriteFailed => Recorded::WriteFailed,
        };
        self.events.push(recorded);
    }
}
