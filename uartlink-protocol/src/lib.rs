//! uartlink Wire Protocol
//!
//! This crate defines the byte-level protocol spoken between a host and a
//! device over a point-to-point UART. It has no I/O of its own; the link
//! session in `uartlink-core` feeds it one received datagram at a time.
//!
//! # Protocol Overview
//!
//! Data packets use a length-delimited frame terminated by an end marker:
//! ```text
//! ┌────────┬───────────┬──────────────┬──────┬─────┐
//! │ HEADER │ TOTAL_LEN │ PAYLOAD      │ CRC8 │ END │
//! │ 0xAA   │ 1B        │ 0–251B       │ 1B   │ 0xBB│
//! └────────┴───────────┴──────────────┴──────┴─────┘
//! ```
//!
//! `TOTAL_LEN` counts every byte of the frame (payload + 4). `CRC8` covers the
//! payload only (polynomial 0x07, see [`crc`]).
//!
//! The device answers every data packet with a single byte: [`Response::Ack`]
//! or [`Response::Nack`]. A datagram consisting of the single byte
//! [`HANDSHAKE_REQUEST`] is a liveness probe answered with
//! [`Response::HandshakeResponse`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod crc;
pub mod frame;
pub mod response;

pub use crc::crc8;
pub use frame::{
    encode_packet, is_handshake, parse_packet, validate, EncodeError, FrameError, Packet,
    END_MARKER, FRAME_OVERHEAD, HANDSHAKE_REQUEST, HEADER_MARKER, MAX_FRAME_LEN,
    MAX_PAYLOAD_LEN, MIN_FRAME_LEN,
};
pub use response::Response;
