//! Frame validation and encoding for the uartlink protocol.
//!
//! Frame format:
//! - HEADER (1 byte): 0xAA
//! - TOTAL_LEN (1 byte): length of the whole frame (payload + 4)
//! - PAYLOAD (0-251 bytes): opaque application data
//! - CRC (1 byte): CRC-8 of the PAYLOAD bytes only
//! - END (1 byte): 0xBB
//!
//! Validation works on one complete datagram at a time. Nothing is carried
//! between calls, so a frame split across two datagrams is rejected twice.

use heapless::Vec;

use crate::crc::crc8;
use crate::response::Response;

/// First byte of every data frame
pub const HEADER_MARKER: u8 = 0xAA;

/// Last byte of every data frame
pub const END_MARKER: u8 = 0xBB;

/// Single-byte handshake probe sent by the host
pub const HANDSHAKE_REQUEST: u8 = 0xB1;

/// Framing bytes around the payload (HEADER + TOTAL_LEN + CRC + END)
pub const FRAME_OVERHEAD: usize = 4;

/// Smallest well-formed frame (empty payload)
pub const MIN_FRAME_LEN: usize = FRAME_OVERHEAD;

/// Largest frame whose length fits in the TOTAL_LEN byte
pub const MAX_FRAME_LEN: usize = u8::MAX as usize;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - FRAME_OVERHEAD;

/// Reasons a datagram is rejected as a data packet
///
/// Every variant is answered with [`Response::Nack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer bytes than the smallest possible frame
    TooShort { len: usize },
    /// Header or end marker missing
    Framing,
    /// TOTAL_LEN disagrees with the number of bytes received
    LengthMismatch { declared: u8, received: usize },
    /// CRC byte does not match the payload
    Checksum { received: u8, calculated: u8 },
    /// TOTAL_LEN too small to hold the framing bytes
    Underflow { declared: u8 },
}

impl FrameError {
    /// Response code sent back for this rejection
    pub fn response(&self) -> Response {
        Response::Nack
    }
}

/// Errors that can occur while encoding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Payload longer than [`MAX_PAYLOAD_LEN`]
    PayloadTooLarge,
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
}

/// A data packet, borrowed from the datagram it was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<'a> {
    /// Payload bytes
    pub payload: &'a [u8],
    /// CRC-8 of the payload
    pub crc: u8,
}

impl<'a> Packet<'a> {
    /// Build an outgoing packet, computing its CRC
    pub fn new(payload: &'a [u8]) -> Result<Self, EncodeError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(EncodeError::PayloadTooLarge);
        }

        Ok(Self {
            payload,
            crc: crc8(payload),
        })
    }

    /// Total number of bytes this packet occupies on the wire
    pub fn frame_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        if self.payload.len() > MAX_PAYLOAD_LEN {
            return Err(EncodeError::PayloadTooLarge);
        }

        let frame_len = self.frame_len();
        if buffer.len() < frame_len {
            return Err(EncodeError::BufferTooSmall);
        }

        let payload_end = 2 + self.payload.len();
        buffer[0] = HEADER_MARKER;
        buffer[1] = frame_len as u8;
        buffer[2..payload_end].copy_from_slice(self.payload);
        buffer[payload_end] = self.crc;
        buffer[payload_end + 1] = END_MARKER;

        Ok(frame_len)
    }

    /// Encode this packet into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_LEN>, EncodeError> {
        let mut buffer = [0u8; MAX_FRAME_LEN];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Check whether a datagram is a handshake request
///
/// Only a datagram of exactly one byte qualifies.
pub fn is_handshake(span: &[u8]) -> bool {
    span == [HANDSHAKE_REQUEST]
}

/// Parse one datagram as a data packet
///
/// Checks run in a fixed order and the first failure is returned: minimum
/// length, markers, declared length, then CRC.
pub fn parse_packet(span: &[u8]) -> Result<Packet<'_>, FrameError> {
    let len = span.len();
    if len < MIN_FRAME_LEN {
        return Err(FrameError::TooShort { len });
    }

    if span[0] != HEADER_MARKER || span[len - 1] != END_MARKER {
        return Err(FrameError::Framing);
    }

    let declared = span[1];
    if usize::from(declared) != len {
        return Err(FrameError::LengthMismatch {
            declared,
            received: len,
        });
    }

    let payload_len = usize::from(declared)
        .checked_sub(FRAME_OVERHEAD)
        .ok_or(FrameError::Underflow { declared })?;

    let payload = span
        .get(2..2 + payload_len)
        .ok_or(FrameError::Underflow { declared })?;
    let received = *span
        .get(2 + payload_len)
        .ok_or(FrameError::Underflow { declared })?;

    let calculated = crc8(payload);
    if received != calculated {
        return Err(FrameError::Checksum {
            received,
            calculated,
        });
    }

    Ok(Packet {
        payload,
        crc: received,
    })
}

/// Validate one datagram and return the response code for it
pub fn validate(span: &[u8]) -> Response {
    Response::from(&parse_packet(span))
}

/// Encode `payload` as a complete frame into `buffer`
///
/// Returns the number of bytes written
pub fn encode_packet(payload: &[u8], buffer: &mut [u8]) -> Result<usize, EncodeError> {
    Packet::new(payload)?.encode(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(payload: &[u8]) -> Vec<u8, MAX_FRAME_LEN> {
        Packet::new(payload).unwrap().encode_to_vec().unwrap()
    }

    #[test]
    fn test_hi_packet() {
        let encoded = frame(b"Hi");
        assert_eq!(encoded.as_slice(), &[0xAA, 0x06, 0x48, 0x69, 0xEB, 0xBB]);
        assert_eq!(validate(&encoded), Response::Ack);

        let packet = parse_packet(&encoded).unwrap();
        assert_eq!(packet.payload, b"Hi");
        assert_eq!(packet.crc, 0xEB);
    }

    #[test]
    fn test_empty_payload() {
        let encoded = frame(&[]);
        assert_eq!(encoded.as_slice(), &[0xAA, 0x04, 0x00, 0xBB]);
        assert_eq!(parse_packet(&encoded).unwrap().payload, &[] as &[u8]);
    }

    #[test]
    fn test_markers_inside_payload() {
        let encoded = frame(&[0xBB, 0xAA, 0xB1, 0xBB]);
        assert_eq!(validate(&encoded), Response::Ack);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(parse_packet(&[]), Err(FrameError::TooShort { len: 0 }));
        assert_eq!(parse_packet(&[0x01]), Err(FrameError::TooShort { len: 1 }));
        assert_eq!(
            parse_packet(&[0xAA, 0x03, 0xBB]),
            Err(FrameError::TooShort { len: 3 })
        );
    }

    #[test]
    fn test_handshake_byte_on_packet_path_is_nack() {
        assert_eq!(validate(&[HANDSHAKE_REQUEST]), Response::Nack);
    }

    #[test]
    fn test_bad_header() {
        let mut encoded = frame(b"Hello");
        encoded[0] = 0xAB;
        assert_eq!(parse_packet(&encoded), Err(FrameError::Framing));
    }

    #[test]
    fn test_bad_end_marker() {
        let mut encoded = frame(b"Hello");
        let last = encoded.len() - 1;
        encoded[last] = 0x00;
        assert_eq!(parse_packet(&encoded), Err(FrameError::Framing));
    }

    #[test]
    fn test_length_mismatch() {
        let mut encoded = frame(b"Hello");
        encoded[1] = 8;
        assert_eq!(
            parse_packet(&encoded),
            Err(FrameError::LengthMismatch {
                declared: 8,
                received: 9
            })
        );
    }

    #[test]
    fn test_declared_length_below_overhead() {
        // Shortest span that passes the marker checks but declares too little
        assert_eq!(
            parse_packet(&[0xAA, 0x02, 0x00, 0xBB]),
            Err(FrameError::LengthMismatch {
                declared: 2,
                received: 4
            })
        );
        assert_eq!(validate(&[0xAA, 0x00, 0x00, 0xBB]), Response::Nack);
    }

    #[test]
    fn test_oversized_datagram() {
        let mut span = [0u8; 300];
        span[0] = HEADER_MARKER;
        span[1] = 0xFF;
        span[299] = END_MARKER;
        assert_eq!(
            parse_packet(&span),
            Err(FrameError::LengthMismatch {
                declared: 0xFF,
                received: 300
            })
        );
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut encoded = frame(b"Hi");
        encoded[4] = 0x00;
        assert_eq!(
            parse_packet(&encoded),
            Err(FrameError::Checksum {
                received: 0x00,
                calculated: 0xEB
            })
        );
    }

    #[test]
    fn test_two_frames_in_one_datagram() {
        let first = frame(b"A");
        let second = frame(b"B");
        let mut both = Vec::<u8, 16>::new();
        both.extend_from_slice(&first).unwrap();
        both.extend_from_slice(&second).unwrap();
        // Starts with a header and ends with a terminator, but byte 1 only
        // counts the first frame
        assert_eq!(validate(&both), Response::Nack);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let encoded = frame(b"ESP32");
        assert_eq!(validate(&encoded), Response::Ack);
        assert_eq!(validate(&encoded), Response::Ack);
    }

    #[test]
    fn test_is_handshake() {
        assert!(is_handshake(&[0xB1]));
        assert!(!is_handshake(&[0xB1, 0xB1]));
        assert!(!is_handshake(&[0x01]));
        assert!(!is_handshake(&[]));
    }

    #[test]
    fn test_encode_packet_into_buffer() {
        let mut buffer = [0u8; 16];
        let len = encode_packet(b"UART Test", &mut buffer).unwrap();
        assert_eq!(len, 13);
        assert_eq!(buffer[1], 13);
        assert_eq!(buffer[11], 0xBA);
        assert_eq!(buffer[12], END_MARKER);
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let mut buffer = [0u8; 5];
        assert_eq!(
            encode_packet(b"Hi", &mut buffer),
            Err(EncodeError::BufferTooSmall)
        );
    }

    #[test]
    fn test_payload_too_large() {
        let payload = [0u8; MAX_PAYLOAD_LEN + 1];
        assert_eq!(Packet::new(&payload), Err(EncodeError::PayloadTooLarge));

        let largest = [0x5Au8; MAX_PAYLOAD_LEN];
        let encoded = frame(&largest);
        assert_eq!(encoded.len(), MAX_FRAME_LEN);
        assert_eq!(validate(&encoded), Response::Ack);
    }

    proptest! {
        #[test]
        fn any_payload_is_acked(payload in proptest::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_LEN)) {
            let mut span = std::vec![HEADER_MARKER, (payload.len() + 4) as u8];
            span.extend_from_slice(&payload);
            span.push(crc8(&payload));
            span.push(END_MARKER);
            prop_assert_eq!(validate(&span), Response::Ack);
        }

        #[test]
        fn payload_bit_flip_is_nacked(
            payload in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut encoded = frame(&payload);
            let i = 2 + index.index(payload.len());
            encoded[i] ^= 1 << bit;
            prop_assert_eq!(validate(&encoded), Response::Nack);
        }

        #[test]
        fn wrong_header_is_nacked(
            payload in proptest::collection::vec(any::<u8>(), 0..32),
            header in any::<u8>().prop_filter("not the header", |b| *b != HEADER_MARKER),
        ) {
            let mut encoded = frame(&payload);
            encoded[0] = header;
            prop_assert_eq!(parse_packet(&encoded), Err(FrameError::Framing));
        }

        #[test]
        fn wrong_declared_length_is_nacked(
            payload in proptest::collection::vec(any::<u8>(), 0..32),
            declared in any::<u8>(),
        ) {
            let mut encoded = frame(&payload);
            prop_assume!(usize::from(declared) != encoded.len());
            encoded[1] = declared;
            prop_assert_eq!(validate(&encoded), Response::Nack);
        }

        #[test]
        fn arbitrary_bytes_never_panic(span in proptest::collection::vec(any::<u8>(), 0..300)) {
            let _ = validate(&span);
        }
    }
}
