use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{ErrorType, Read, Write};

/// Timing configuration of the UART.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusMode {
    /// Low baud rate: one character spans the reset pulse and the
    /// presence-detect window.
    Reset,
    /// High baud rate: one character spans one 1-Wire time slot.
    Data,
}

/// Byte-level access to a UART whose TX and RX share the open-drain 1-Wire line.
pub trait Transport {
    /// Error of the underlying peripheral.
    type Error;

    /// Reconfigures the baud rate. Pending transmissions must complete first.
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Self::Error>;

    /// Sends `tx` and captures what the line carried back into `rx`.
    ///
    /// Every byte sent is read back, since the shared line returns the
    /// logical AND of what was driven and what any device pulled low.
    ///
    /// # Returns
    /// The number of bytes captured. Fewer than `tx.len()` means the line
    /// stopped echoing.
    fn transceive(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Serial ports whose baud rate can be changed at runtime.
pub trait SetBaudRate: ErrorType {
    /// Set the baud rate.
    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Self::Error>;
}

/// [`Transport`] over a non-blocking serial port.
///
/// Each byte is written, then its echo is polled up to `retries` times with
/// `poll_us` microseconds between attempts.
pub struct SerialTransport<S, D> {
    pub(crate) serial: S,
    pub(crate) delay: D,
    pub(crate) retries: u8,
    pub(crate) poll_us: u32,
}

impl<S, D> SerialTransport<S, D> {
    /// Creates a new transport with the default retry budget.
    pub fn new(serial: S, delay: D) -> Self {
        Self {
            serial,
            delay,
            retries: 100,
            poll_us: 100,
        }
    }

    /// Set the retry count.
    ///
    /// The retry count is used to determine how long
    /// the host waits for the echo of a byte before
    /// treating the line as silent.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = retries;
        self
    }

    /// Releases the serial port and the delay.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }
}

impl<S: Read<u8> + Write<u8> + SetBaudRate, D: DelayNs> SerialTransport<S, D> {
    fn read_echo(&mut self) -> Result<Option<u8>, S::Error> {
        let mut tries = 0;
        loop {
            match self.serial.read() {
                Ok(byte) => return Ok(Some(byte)),
                Err(nb::Error::WouldBlock) => {
                    if tries >= self.retries {
                        return Ok(None);
                    }
                    tries += 1;
                    self.delay.delay_us(self.poll_us);
                }
                Err(nb::Error::Other(e)) => return Err(e),
            }
        }
    }
}

impl<S: Read<u8> + Write<u8> + SetBaudRate, D: DelayNs> Transport for SerialTransport<S, D> {
    type Error = S::Error;

    fn set_baud_rate(&mut self, baud: u32) -> Result<(), Self::Error> {
        nb::block!(self.serial.flush())?;
        SetBaudRate::set_baud_rate(&mut self.serial, baud)
    }

    fn transceive(&mut self, tx: &[u8], rx: &mut [u8]) -> Result<usize, Self::Error> {
        for (idx, (&byte, echo)) in tx.iter().zip(rx.iter_mut()).enumerate() {
            nb::block!(self.serial.write(byte))?;
            match self.read_echo()? {
                Some(value) => *echo = value,
                None => {
                    log::trace!("no echo after {idx} bytes");
                    return Ok(idx);
                }
            }
        }
        Ok(tx.len().min(rx.len()))
    }
}
