//! Buffered UART transport
//!
//! The receive side resolves a read as soon as at least one byte is in the
//! ring buffer. Gathering a whole datagram is left to the link session.

use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};

use uartlink_hal::{DataBits, FlowControl, Parity, StopBits, UartConfig, UartRx, UartTx};

/// Line settings the buffered transport cannot provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnsupportedConfig {
    /// The RP2040 UART has at most 8 data bits
    NineDataBits,
    /// RTS/CTS needs dedicated pins this transport does not claim
    HardwareFlowControl,
}

/// Translate a line configuration into embassy-rp's
pub fn rp_config(config: &UartConfig) -> Result<uart::Config, UnsupportedConfig> {
    if config.flow_control != FlowControl::None {
        return Err(UnsupportedConfig::HardwareFlowControl);
    }

    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
        DataBits::Nine => return Err(UnsupportedConfig::NineDataBits),
    };
    rp.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    Ok(rp)
}

/// Receive half
pub struct RpUartRx {
    inner: BufferedUartRx,
}

impl RpUartRx {
    pub fn new(inner: BufferedUartRx) -> Self {
        Self { inner }
    }
}

impl UartRx for RpUartRx {
    type Error = uart::Error;

    async fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32) -> Result<usize, uart::Error> {
        let timeout = Duration::from_millis(u64::from(timeout_ms));
        match with_timeout(timeout, self.inner.read(buf)).await {
            Ok(result) => result,
            // Nothing arrived in time
            Err(_) => Ok(0),
        }
    }
}

/// Transmit half
pub struct RpUartTx {
    inner: BufferedUartTx,
}

impl RpUartTx {
    pub fn new(inner: BufferedUartTx) -> Self {
        Self { inner }
    }
}

impl UartTx for RpUartTx {
    type Error = uart::Error;

    async fn write_all(&mut self, data: &[u8]) -> Result<(), uart::Error> {
        self.inner.write_all(data).await
    }

    async fn flush(&mut self) -> Result<(), uart::Error> {
        self.inner.flush().await
    }
}
