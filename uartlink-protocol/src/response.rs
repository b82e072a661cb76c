//! Single-byte response codes written back by the device

use crate::frame::{FrameError, Packet};

/// Response byte for a valid packet
pub const ACK: u8 = 0x06;

/// Response byte for any rejected datagram
pub const NACK: u8 = 0x15;

/// Response byte for a handshake request
pub const HANDSHAKE_RESPONSE: u8 = 0x55;

/// Response the device sends for one received datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Response {
    /// Packet accepted
    Ack = ACK,
    /// Packet rejected (framing, length or checksum)
    Nack = NACK,
    /// Handshake acknowledged
    HandshakeResponse = HANDSHAKE_RESPONSE,
}

impl Response {
    /// Parse a response from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ACK => Some(Response::Ack),
            NACK => Some(Response::Nack),
            HANDSHAKE_RESPONSE => Some(Response::HandshakeResponse),
            _ => None,
        }
    }

    /// Wire byte for this response
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

impl From<&Result<Packet<'_>, FrameError>> for Response {
    fn from(verdict: &Result<Packet<'_>, FrameError>) -> Self {
        match verdict {
            Ok(_) => Response::Ack,
            Err(e) => e.response(),
        }
    }
}

impl From<Response> for u8 {
    fn from(response: Response) -> Self {
        response.to_byte()
    }
}
