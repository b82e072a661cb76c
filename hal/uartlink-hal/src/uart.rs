//! UART serial communication abstractions
//!
//! Provides traits for serial communication that can be implemented by
//! chip-specific HALs. Reads are bounded by a caller-supplied timeout so the
//! link loop can tell silence apart from a failed peripheral.

/// UART transmitter
///
/// Async trait for sending data over a UART interface.
#[allow(async_fn_in_trait)]
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write all of `data` to the UART
    ///
    /// Completes once every byte has been handed to the peripheral or an
    /// error occurs.
    async fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    async fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write a single byte to the UART
    async fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write_all(&[byte]).await
    }
}

/// UART receiver
///
/// Async trait for receiving data from a UART interface.
#[allow(async_fn_in_trait)]
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read whatever is available into `buf`, waiting at most `timeout_ms`
    ///
    /// Returns the number of bytes read. `Ok(0)` means nothing arrived
    /// within the timeout; that is not an error. `Err` is reserved for
    /// peripheral faults (overrun, framing, break).
    async fn read_timeout(&mut self, buf: &mut [u8], timeout_ms: u32)
        -> Result<usize, Self::Error>;

    /// Read a single byte, or `None` if the timeout elapsed
    async fn read_byte_timeout(&mut self, timeout_ms: u32) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        let n = self.read_timeout(&mut buf, timeout_ms).await?;
        Ok((n > 0).then_some(buf[0]))
    }
}

impl<T: UartTx + ?Sized> UartTx for &mut T {
    type Error = T::Error;

    async fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        T::write_all(self, data).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        T::flush(self).await
    }
}

impl<T: UartRx + ?Sized> UartRx for &mut T {
    type Error = T::Error;

    async fn read_timeout(
        &mut self,
        buf: &mut [u8],
        timeout_ms: u32,
    ) -> Result<usize, Self::Error> {
        T::read_timeout(self, buf, timeout_ms).await
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// Flow control mode
    pub flow_control: FlowControl,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
        }
    }
}

impl UartConfig {
    /// Default 8N1 configuration at the given baud rate
    pub fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            ..Self::default()
        }
    }

    /// Duration of one character on the wire in microseconds
    ///
    /// Counts the start bit, data bits, parity bit and stop bits.
    pub fn char_time_us(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        let bits: u32 = 1 + data + parity + stop;
        (bits * 1_000_000).div_ceil(self.baudrate.max(1))
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

/// Flow control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    None,
    RtsCts,
}
