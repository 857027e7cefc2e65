#![no_std]
#![deny(missing_docs)]

/*! # onewire-uart
 *
 * A 1-Wire bus master built from a plain UART.
 *
 * TX and RX are tied to the open-drain 1-Wire line. Each UART character
 * becomes one 1-Wire time slot at the data baud rate, and the reset pulse is
 * a single character sent at the much lower reset baud rate. Reading the
 * echo of every character tells what the devices did with the line.
 *
 * [`UartOneWire`] implements [`OneWire`], so it plugs straight into
 * [`OneWireBus`](embedded_onewire::OneWireBus) and
 * [`OneWireSearch`](embedded_onewire::OneWireSearch).
 */

pub use embedded_onewire::{OneWire, OneWireError, OneWireResult};
mod codec;
mod error;
mod onewire;
mod transport;

pub use codec::ResetStatus;
pub use error::UartError;
pub use transport::{BusMode, SerialTransport, SetBaudRate, Transport};

use embedded_hal::delay::DelayNs;
use embedded_hal_nb::serial::{Read, Write};

/// Results of UART-specific function calls.
pub type UartResult<T, E> = Result<T, UartError<E>>;

/// Baud rates used for the two [`BusMode`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusTiming {
    /// One bit lasts ~104 µs at 9600 baud, so a character spans the reset
    /// pulse and the presence window.
    pub reset_baud: u32,
    /// One bit lasts ~8.7 µs at 115200 baud, so a character spans one time slot.
    pub data_baud: u32,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            reset_baud: 9600,
            data_baud: 115200,
        }
    }
}

impl BusTiming {
    /// Baud rate for `mode`.
    pub fn baud_rate(&self, mode: BusMode) -> u32 {
        match mode {
            BusMode::Reset => self.reset_baud,
            BusMode::Data => self.data_baud,
        }
    }
}

/// A 1-Wire bus master driving the line through a UART.
///
/// Takes ownership of a [`Transport`], usually a [`SerialTransport`] built by
/// [`UartOneWireBuilder::build`].
pub struct UartOneWire<T> {
    pub(crate) transport: T,
    pub(crate) timing: BusTiming,
    pub(crate) mode: BusMode,
}

/// Builder for creating a [`UartOneWire`] instance with custom configuration.
#[derive(Debug, Default)]
pub struct UartOneWireBuilder {
    pub(crate) retries: Option<u8>,
    pub(crate) timing: BusTiming,
}

impl UartOneWireBuilder {
    /// Sets the retry count used while waiting for the echo of each character.
    pub fn with_retries(mut self, retries: u8) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Sets both baud rates.
    pub fn with_timing(mut self, timing: BusTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Sets the baud rate of the reset pulse.
    pub fn with_reset_baud(mut self, baud: u32) -> Self {
        self.timing.reset_baud = baud;
        self
    }

    /// Sets the baud rate of the data slots.
    pub fn with_data_baud(mut self, baud: u32) -> Self {
        self.timing.data_baud = baud;
        self
    }

    /// Builds a new `UartOneWire` over a serial port, leaving it in data mode.
    pub fn build<S, D>(
        self,
        serial: S,
        delay: D,
    ) -> UartResult<UartOneWire<SerialTransport<S, D>>, S::Error>
    where
        S: Read<u8> + Write<u8> + SetBaudRate,
        D: DelayNs,
    {
        let mut transport = SerialTransport::new(serial, delay);
        if let Some(retries) = self.retries {
            transport = transport.with_retries(retries);
        }
        self.build_with(transport)
    }

    /// Builds a new `UartOneWire` over any [`Transport`], leaving it in data mode.
    pub fn build_with<T: Transport>(self, transport: T) -> UartResult<UartOneWire<T>, T::Error> {
        let mut dev = UartOneWire {
            transport,
            timing: self.timing,
            mode: BusMode::Data,
        };
        dev.configure(BusMode::Data)?;
        Ok(dev)
    }
}

impl<T> UartOneWire<T> {
    /// Current timing configuration of the UART.
    pub fn mode(&self) -> BusMode {
        self.mode
    }

    /// Baud rates in use.
    pub fn timing(&self) -> BusTiming {
        self.timing
    }

    /// Releases the transport.
    pub fn release(self) -> T {
        self.transport
    }
}

impl<T: Transport> UartOneWire<T> {
    /// Switches the UART to the baud rate of `mode`.
    pub fn configure(&mut self, mode: BusMode) -> UartResult<(), T::Error> {
        self.transport
            .set_baud_rate(self.timing.baud_rate(mode))
            .map_err(UartError::from)?;
        self.mode = mode;
        Ok(())
    }
}
