use crate::{
    BusMode, Transport, UartError, UartOneWire, UartResult,
    codec::{READ_SLOT, RESET_PULSE, ResetStatus, decode_bit, decode_byte, encode_bit, encode_byte},
};
use embedded_onewire::{OneWire, OneWireResult};

impl<T: Transport> UartOneWire<T> {
    /// Sends `slots` at the data baud rate and returns their echo.
    fn slots<const L: usize>(&mut self, slots: [u8; L]) -> UartResult<[u8; L], T::Error> {
        if self.mode != BusMode::Data {
            self.configure(BusMode::Data)?;
        }
        let mut echo = [0; L];
        let captured = self
            .transport
            .transceive(&slots, &mut echo)
            .map_err(UartError::from)?;
        if captured < L {
            return Err(UartError::NoEcho);
        }
        Ok(echo)
    }
}

impl<T: Transport> OneWire for UartOneWire<T> {
    type Status = ResetStatus;

    type BusError = UartError<T::Error>;

    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        self.configure(BusMode::Reset)?;
        let mut echo = [0; 1];
        let captured = self
            .transport
            .transceive(&[RESET_PULSE], &mut echo)
            .map_err(UartError::from)?;
        self.configure(BusMode::Data)?;
        let status = ResetStatus::from_echo((captured == 1).then_some(echo[0]));
        log::debug!(
            "reset echo {:?}: bus {}, presence {}, short {}",
            (captured == 1).then_some(echo[0]),
            status.bus_detect(),
            status.presence_detect(),
            status.short_detect()
        );
        Ok(status)
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        self.slots(encode_byte(byte))?;
        Ok(())
    }

    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        Ok(decode_byte(&self.slots([READ_SLOT; 8])?))
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        self.slots([encode_bit(bit)])?;
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        let [echo] = self.slots([READ_SLOT])?;
        Ok(decode_bit(echo))
    }

    fn read_bit_pair(&mut self) -> OneWireResult<(bool, bool), Self::BusError> {
        let [id_bit, complement_bit] = self.slots([READ_SLOT; 2])?;
        Ok((decode_bit(id_bit), decode_bit(complement_bit)))
    }
}
