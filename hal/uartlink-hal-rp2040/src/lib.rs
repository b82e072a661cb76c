//! RP2040 implementation of the uartlink transport traits
//!
//! Wraps embassy-rp's interrupt-driven buffered UART. Read timeouts come
//! from embassy-time, so a read that sees no bytes resolves to `Ok(0)`
//! instead of pending forever.

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uartlink_hal::rp2040::{gpio_function, uart_pins, PinRole, UartId};
pub use uart::{rp_config, RpUartRx, RpUartTx, UnsupportedConfig};
