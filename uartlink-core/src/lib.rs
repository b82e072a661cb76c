//! Board-agnostic link logic for the uartlink serial protocol
//!
//! This crate contains everything above the wire format that does not
//! depend on a specific chip:
//!
//! - Link session: the device-side receive/validate/respond loop
//! - Reporting interface for diagnostic events
//! - Link configuration and its text format
//! - Host-side peer (handshake and single packet delivery)
//!
//! Transports are reached only through the `uartlink-hal` traits, so the
//! whole crate runs on the host under test.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod peer;
pub mod report;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{parse_config, ConfigError, LinkConfig};
pub use peer::{LinkPeer, PeerError};
pub use report::{Level, LinkEvent, NullReporter, Reporter};
pub use session::{LinkError, LinkSession, LinkStats, Outcome, DEFAULT_RX_BUF_SIZE};
