//! RP2040 UART pin mapping
//!
//! RP2040 has two UART peripherals (UART0 and UART1). Each GPIO can carry
//! exactly one UART function, fixed by the chip's function-select table.
//!
//! The table is plain `const fn` data with no register access, so it lives
//! here where it builds and tests on the host; `uartlink-hal-rp2040`
//! re-exports it.

/// UART peripheral identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartId {
    Uart0,
    Uart1,
}

/// UART function of a GPIO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinRole {
    Tx,
    Rx,
    Cts,
    Rts,
}

/// Number of user GPIOs on the RP2040
const GPIO_COUNT: u8 = 30;

/// Determine which UART function a GPIO provides
///
/// GPIOs are grouped in blocks of four (TX, RX, CTS, RTS); the blocks
/// alternate UART0, UART1, UART1, UART0.
pub const fn gpio_function(gpio: u8) -> Option<(UartId, PinRole)> {
    if gpio >= GPIO_COUNT {
        return None;
    }

    let id = match (gpio / 4) % 4 {
        0 | 3 => UartId::Uart0,
        _ => UartId::Uart1,
    };
    let role = match gpio % 4 {
        0 => PinRole::Tx,
        1 => PinRole::Rx,
        2 => PinRole::Cts,
        _ => PinRole::Rts,
    };
    Some((id, role))
}

/// Check that `tx` and `rx` form a TX/RX pair on the same UART
///
/// Returns the UART they belong to. `const` so boards can assert their pin
/// choice at compile time.
pub const fn uart_pins(tx: u8, rx: u8) -> Option<UartId> {
    match (gpio_function(tx), gpio_function(rx)) {
        (Some((UartId::Uart0, PinRole::Tx)), Some((UartId::Uart0, PinRole::Rx))) => {
            Some(UartId::Uart0)
        }
        (Some((UartId::Uart1, PinRole::Tx)), Some((UartId::Uart1, PinRole::Rx))) => {
            Some(UartId::Uart1)
        }
        _ => None,
    }
}
