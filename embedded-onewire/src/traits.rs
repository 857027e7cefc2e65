use crate::{
    DeviceId, OneWireError, OneWireResult,
    consts::{
        ONEWIRE_MATCH_ROM_CMD, ONEWIRE_READ_ROM_CMD, ONEWIRE_SEARCH_CMD, ONEWIRE_SKIP_ROM_CMD,
    },
};

/// Status of the bus after a reset pulse.
pub trait OneWireStatus {
    /// `true` if at least one device answered the reset with a presence pulse.
    fn presence(&self) -> bool;

    /// `true` if the line was found held low for the whole presence window.
    fn shortcircuit(&self) -> bool;

    /// `false` if the line does not behave like a 1-Wire bus at all, e.g.
    /// because it is floating or disconnected from the master.
    ///
    /// Bus masters that cannot tell return `true`.
    fn bus_detected(&self) -> bool {
        true
    }

    /// Turns the status into the error a failed reset is reported as.
    fn check<E>(&self) -> OneWireResult<(), E> {
        if !self.bus_detected() {
            Err(OneWireError::NoBus)
        } else if self.shortcircuit() {
            Err(OneWireError::ShortCircuit)
        } else if !self.presence() {
            Err(OneWireError::NoDevicePresent)
        } else {
            Ok(())
        }
    }
}

/// Trait for 1-Wire communication.
/// This trait defines the basic operations required for 1-Wire communication, such as resetting the bus,
/// writing and reading bytes, and writing and reading bits.
///
/// Bytes go out least significant bit first. A transaction (reset, ROM command
/// and payload) must not be interleaved with other traffic on the same bus,
/// which implementors get for free by taking `&mut self`.
pub trait OneWire {
    /// The status type returned by the reset operation.
    /// This type must implement the [OneWireStatus] trait.
    type Status: OneWireStatus;
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and returns the status of the bus.
    ///
    /// A missing presence pulse is not an error at this level; inspect the
    /// returned status (or call [`OneWireStatus::check`]).
    ///
    /// # Errors
    /// This method returns an error if the bus master fails.
    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError>;

    /// Writes a single bit to the 1-Wire bus.
    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit from the 1-Wire bus.
    /// # Returns
    /// `false` if any device pulled the line low during the read slot.
    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, least significant bit first.
    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        for pos in 0..8 {
            self.write_bit((byte >> pos) & 0x1 == 0x1)?;
        }
        Ok(())
    }

    /// Reads a byte from the 1-Wire bus, least significant bit first.
    fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        let mut byte = 0;
        for pos in 0..8 {
            if self.read_bit()? {
                byte |= 1 << pos;
            }
        }
        Ok(byte)
    }

    /// Reads the id bit and its complement during a ROM search.
    ///
    /// Masters able to issue both read slots back to back should override this.
    fn read_bit_pair(&mut self) -> OneWireResult<(bool, bool), Self::BusError> {
        let id_bit = self.read_bit()?;
        let complement_bit = self.read_bit()?;
        Ok((id_bit, complement_bit))
    }

    /// Issues Skip ROM, addressing every device on the bus.
    fn skip_rom(&mut self) -> OneWireResult<(), Self::BusError> {
        self.write_byte(ONEWIRE_SKIP_ROM_CMD)
    }

    /// Issues Read ROM and reads back the ROM code.
    ///
    /// Only meaningful with a single device on the bus. The CRC is not checked
    /// here, see [`DeviceId::is_valid`].
    fn read_rom(&mut self) -> OneWireResult<DeviceId, Self::BusError> {
        self.write_byte(ONEWIRE_READ_ROM_CMD)?;
        let mut rom = [0; 8];
        for b in rom.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(DeviceId::new(rom))
    }

    /// Issues Match ROM followed by the ROM code, family code first.
    fn match_rom(&mut self, rom: &DeviceId) -> OneWireResult<(), Self::BusError> {
        self.write_byte(ONEWIRE_MATCH_ROM_CMD)?;
        for &b in rom.as_bytes().iter() {
            self.write_byte(b)?;
        }
        Ok(())
    }

    /// Issues Search ROM, priming the bus for one pass of the search.
    fn search_rom(&mut self) -> OneWireResult<(), Self::BusError> {
        self.write_byte(ONEWIRE_SEARCH_CMD)
    }

    /// Addresses devices on the 1-Wire bus.
    /// Resets the bus, then issues Match ROM for `Some(rom)` or Skip ROM for [`None`].
    ///
    /// # Errors
    /// Returns the bus condition ([`OneWireError::NoDevicePresent`] and friends)
    /// if the reset found no device.
    fn address(&mut self, rom: Option<&DeviceId>) -> OneWireResult<(), Self::BusError> {
        self.reset()?.check()?;
        match rom {
            Some(rom) => self.match_rom(rom),
            None => self.skip_rom(),
        }
    }
}
