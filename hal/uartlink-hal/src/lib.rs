//! uartlink Hardware Abstraction Layer
//!
//! This crate defines the serial transport traits consumed by the link
//! protocol. Chip-specific HALs implement them; the protocol logic in
//! `uartlink-core` only ever sees these traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  uartlink-core (session, peer)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  uartlink-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ uartlink-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRx`] - Bounded-wait receive
//! - [`uart::UartTx`] - Blocking send
//!
//! # Chip tables
//!
//! - [`rp2040`] - RP2040 GPIO to UART function map

#![no_std]
#![deny(unsafe_code)]

pub mod rp2040;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use uart::{DataBits, FlowControl, Parity, StopBits, UartConfig, UartRx, UartTx};
