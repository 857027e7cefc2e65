use crate::{
    DeviceId, OneWire, OneWireResult, OneWireStatus,
    consts::{ONEWIRE_CONDITIONAL_SEARCH_CMD, ONEWIRE_SEARCH_CMD},
    error::OneWireError,
};

/// A structure for searching devices on a 1-Wire bus.
/// This structure implements the search algorithm for discovering devices on the 1-Wire bus.
/// It maintains the state of the search.
pub struct OneWireSearch<'a, T> {
    onewire: &'a mut T,
    cmd: u8,
    last_device: bool,
    last_discrepancy: u8,
    last_family_discrepancy: u8,
    family: Option<u8>,
    rom: [u8; 8],
    crc_check: bool,
    passes: usize,
}

impl<T> core::fmt::Debug for OneWireSearch<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OneWireSearch")
            .field("cmd", &self.cmd)
            .field("last_device", &self.last_device)
            .field("last_discrepancy", &self.last_discrepancy)
            .field("last_family_discrepancy", &self.last_family_discrepancy)
            .field("family", &self.family)
            .field("rom", &self.rom)
            .field("passes", &self.passes)
            .finish()
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Type of search performed using [`OneWireSearch`].
pub enum OneWireSearchKind {
    /// Normal search
    Normal = ONEWIRE_SEARCH_CMD,
    /// Search only for devices with alarm
    Alarmed = ONEWIRE_CONDITIONAL_SEARCH_CMD,
}

impl<'a, T> OneWireSearch<'a, T> {
    /// Creates a new [`OneWireSearch`] instance.
    ///
    /// # Arguments
    /// * `onewire` - A mutable reference to a type that implements the `OneWire` trait.
    /// * `cmd` - The kind of search to run.
    pub fn new(onewire: &'a mut T, cmd: OneWireSearchKind) -> Self {
        Self {
            onewire,
            cmd: cmd as _,
            last_device: false,
            last_discrepancy: 0,
            last_family_discrepancy: 0,
            family: None,
            rom: [0; 8],
            crc_check: true,
            passes: 0,
        }
    }

    /// Creates a new [`OneWireSearch`] instance restricted to a family code.
    ///
    /// The first pass starts at the smallest ROM code of that family, and the
    /// search ends at the first device of another family.
    /// # Arguments
    /// * `onewire` - A mutable reference to a type that implements the `OneWire` trait.
    /// * `cmd` - The kind of search to run.
    /// * `family` - The family code of the devices to search for.
    pub fn with_family(onewire: &'a mut T, cmd: OneWireSearchKind, family: u8) -> Self {
        let mut search = Self::new(onewire, cmd);
        search.family = Some(family);
        search.reset();
        search
    }

    /// Enables or disables the CRC check of every ROM found (enabled by default).
    pub fn with_crc_check(mut self, crc_check: bool) -> Self {
        self.crc_check = crc_check;
        self
    }

    /// Number of search passes issued so far.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Skips the remaining devices of the family of the last ROM found.
    pub fn skip_family(&mut self) {
        self.last_discrepancy = self.last_family_discrepancy;
        self.last_family_discrepancy = 0;
        if self.last_discrepancy == 0 {
            self.last_device = true;
        }
    }

    /// Resets the search state.
    fn reset(&mut self) {
        self.last_device = false;
        self.last_family_discrepancy = 0;
        match self.family {
            Some(family) => {
                // Replay the family code, then take the 1 branch only at the last bit
                self.rom = [family, 0, 0, 0, 0, 0, 0, 0];
                self.last_discrepancy = 64;
            }
            None => {
                self.rom = [0; 8];
                self.last_discrepancy = 0;
            }
        }
    }
}

impl<T: OneWire> OneWireSearch<'_, T> {
    /// Searches for devices on the 1-Wire bus.
    /// This method implements the [1-Wire search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html) to discover devices connected to the bus.
    /// The [next](OneWireSearch::next) method can be called repeatedly to find all devices on the bus.
    /// At the end of the search, calling this method will return `None` to indicate that no more devices are present.
    /// The search state is reset if the [verify](OneWireSearch::verify) method is called.
    ///
    /// Every call runs one pass: a reset, the search command, and 64 rounds
    /// of two read slots followed by the chosen branch bit.
    ///
    /// # Errors
    /// * The bus condition reported by the reset ([`OneWireError::NoDevicePresent`],
    ///   [`OneWireError::NoBus`], [`OneWireError::ShortCircuit`]).
    /// * [`OneWireError::SearchAborted`] if no device answered a round. The
    ///   search state is reset, the next call starts over.
    /// * [`OneWireError::InvalidRomCrc`] if CRC checking is enabled and the ROM
    ///   read back is corrupt.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> OneWireResult<Option<DeviceId>, T::BusError> {
        if self.last_device {
            return Ok(None);
        }
        self.onewire.reset()?.check()?;
        self.passes += 1;
        self.onewire.write_byte(self.cmd)?;
        let mut last_zero: u8 = 0;
        for id_bit_num in 1..=64u8 {
            let idx = ((id_bit_num - 1) / 8) as usize;
            let rom_mask = 1u8 << ((id_bit_num - 1) % 8);
            let (id_bit, complement_bit) = self.onewire.read_bit_pair()?;
            let dir = match (id_bit, complement_bit) {
                (true, true) => {
                    log::warn!("search aborted at bit {id_bit_num}: no device responded");
                    self.reset();
                    return Err(OneWireError::SearchAborted);
                }
                // every remaining device has the same bit
                (id_bit, complement_bit) if id_bit != complement_bit => id_bit,
                _ => {
                    let dir = if id_bit_num < self.last_discrepancy {
                        self.rom[idx] & rom_mask > 0
                    } else {
                        id_bit_num == self.last_discrepancy
                    };
                    if !dir {
                        last_zero = id_bit_num;
                        if last_zero < 9 {
                            self.last_family_discrepancy = last_zero;
                        }
                    }
                    dir
                }
            };
            if dir {
                self.rom[idx] |= rom_mask;
            } else {
                self.rom[idx] &= !rom_mask;
            }
            // devices whose bit differs leave the search
            self.onewire.write_bit(dir)?;
        }
        self.last_discrepancy = last_zero;
        self.last_device = self.last_discrepancy == 0;

        let rom = DeviceId::new(self.rom);
        log::trace!("search pass {} found {rom}", self.passes);
        if self.crc_check && !rom.is_valid() {
            return Err(OneWireError::InvalidRomCrc);
        }
        if let Some(family) = self.family {
            if rom.family() != family {
                self.last_device = true;
                return Ok(None);
            }
        }
        Ok(Some(rom))
    }

    /// Verifies if the device with the given ROM code is present on the 1-Wire bus.
    ///
    /// This function should be called with a search state that has been exhausted (i.e., after calling [next](OneWireSearch::next) until it returns `None`).
    /// This functions resets the search state, and calling [next](OneWireSearch::next) after this call will start a new search.
    pub fn verify(&mut self, rom: &DeviceId) -> OneWireResult<bool, T::BusError> {
        let family = self.family.take();
        self.reset();
        self.rom = *rom.as_bytes();
        self.last_discrepancy = 64;
        let res = self.next();
        self.family = family;
        self.reset();
        match res {
            Ok(found) => Ok(found.as_ref() == Some(rom)),
            Err(OneWireError::SearchAborted | OneWireError::InvalidRomCrc) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
