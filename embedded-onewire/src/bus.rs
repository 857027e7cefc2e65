use crate::{
    DeviceId, DeviceRegistry, ErrorCode, ErrorRecord, OneWire, OneWireError, OneWireResult,
    OneWireSearch, OneWireSearchKind, OneWireStatus,
};

/// A 1-Wire bus together with the devices found on it.
///
/// Owns the bus master `O` exclusively: every operation takes `&mut self`, so
/// a transaction (reset, ROM command and payload) can never be interleaved
/// with another caller's traffic. Keeps at most `N` devices.
///
/// Bus conditions (no circuit, no devices, a search round nobody answered)
/// are not errors: they show up as `false` / an empty device list and are
/// recorded in [`OneWireBus::last_error`]. Errors of the bus master itself
/// are returned as [`OneWireError::Other`].
#[derive(Debug)]
pub struct OneWireBus<O, const N: usize = 16> {
    onewire: O,
    registry: DeviceRegistry<N>,
    error: ErrorRecord,
    crc_check: bool,
    passes: usize,
}

impl<O, const N: usize> OneWireBus<O, N> {
    /// Wraps a bus master. No bus traffic happens until [`OneWireBus::initialize`].
    pub fn new(onewire: O) -> Self {
        Self {
            onewire,
            registry: DeviceRegistry::new(),
            error: ErrorRecord::default(),
            crc_check: true,
            passes: 0,
        }
    }

    /// Enables or disables the CRC check of discovered ROM codes (enabled by default).
    pub fn with_crc_check(mut self, crc_check: bool) -> Self {
        self.crc_check = crc_check;
        self
    }

    /// Number of devices found by the last enumeration.
    pub fn device_count(&self) -> usize {
        self.registry.count()
    }

    /// Devices found by the last enumeration, in discovery order.
    pub fn devices(&self) -> &[DeviceId] {
        self.registry.all()
    }

    /// Device at `index` in discovery order.
    pub fn device(&self, index: usize) -> Option<DeviceId> {
        self.registry.at(index)
    }

    /// The device registry.
    pub fn registry(&self) -> &DeviceRegistry<N> {
        &self.registry
    }

    /// Outcome of the last reset or enumeration.
    pub fn last_error(&self) -> ErrorRecord {
        self.error
    }

    /// `true` if the last reset or enumeration reported [`ErrorCode::NoError`].
    pub fn is_ok(&self) -> bool {
        self.error.code() == ErrorCode::NoError
    }

    /// Search passes issued by the last enumeration.
    pub fn search_passes(&self) -> usize {
        self.passes
    }

    /// Mutable access to the bus master.
    pub fn bus_mut(&mut self) -> &mut O {
        &mut self.onewire
    }

    /// Releases the bus master.
    pub fn into_inner(self) -> O {
        self.onewire
    }
}

impl<O: OneWire, const N: usize> OneWireBus<O, N> {
    /// Resets the bus and enumerates every device on it.
    ///
    /// # Returns
    /// `true` if the reset saw a presence pulse and every device on the bus
    /// made it into the registry.
    pub fn initialize(&mut self) -> OneWireResult<bool, O::BusError> {
        if !self.reset()? {
            return Ok(false);
        }
        self.discover_devices()?;
        Ok(self.error.is_ok())
    }

    /// Sends a reset pulse and checks for a presence pulse.
    ///
    /// Clears [`OneWireBus::last_error`] first and records the bus condition
    /// if no device answered.
    pub fn reset(&mut self) -> OneWireResult<bool, O::BusError> {
        self.error = ErrorRecord::default();
        let status = self.onewire.reset()?;
        match status.check() {
            Ok(()) => {
                log::debug!("reset: presence detected");
                Ok(true)
            }
            Err(e) => self.record(e).map(|_| false),
        }
    }

    /// Runs the ROM search until every device on the bus has been found.
    ///
    /// The registry is replaced with the devices found. If a pass fails on a
    /// bus condition, the devices of the passes completed before it are kept
    /// and the condition is recorded in [`OneWireBus::last_error`]. The same
    /// holds when the bus carries more than `N` devices
    /// ([`ErrorCode::RegistryFull`]).
    ///
    /// # Errors
    /// Errors of the bus master and corrupt ROM codes are returned as `Err`.
    /// The registry, the pass count and the error record of the previous
    /// enumeration are then left untouched.
    pub fn discover_devices(&mut self) -> OneWireResult<&[DeviceId], O::BusError> {
        let mut found = DeviceRegistry::<N>::new();
        let mut search = OneWireSearch::new(&mut self.onewire, OneWireSearchKind::Normal)
            .with_crc_check(self.crc_check);
        let res = loop {
            match search.next() {
                Ok(Some(rom)) => {
                    if !found.insert(rom) {
                        log::warn!("device registry full ({}), stopping enumeration", N);
                        break Err(OneWireError::RegistryFull);
                    }
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        let passes = search.passes();
        let error = match res {
            Ok(()) => ErrorRecord::default(),
            Err(e) => match e.code() {
                Some(code) => {
                    log::warn!(
                        "enumeration stopped after {} passes ({code}), keeping {} devices",
                        passes,
                        found.count()
                    );
                    ErrorRecord::new(code)
                }
                None => {
                    log::error!("enumeration failed after {passes} passes");
                    return Err(e);
                }
            },
        };
        self.passes = passes;
        self.registry = found;
        self.error = error;
        log::debug!("found {} devices in {} passes", self.registry.count(), self.passes);
        Ok(self.registry.all())
    }

    /// Starts a search of the given kind without touching the registry.
    pub fn search(&mut self, kind: OneWireSearchKind) -> OneWireSearch<'_, O> {
        OneWireSearch::new(&mut self.onewire, kind).with_crc_check(self.crc_check)
    }

    /// Checks whether `rom` is still present on the bus.
    pub fn verify(&mut self, rom: &DeviceId) -> OneWireResult<bool, O::BusError> {
        self.search(OneWireSearchKind::Normal).verify(rom)
    }

    /// Writes a byte to the bus, least significant bit first.
    pub fn write_byte(&mut self, byte: u8) -> OneWireResult<(), O::BusError> {
        self.onewire.write_byte(byte)
    }

    /// Reads a byte from the bus, least significant bit first.
    pub fn read_byte(&mut self) -> OneWireResult<u8, O::BusError> {
        self.onewire.read_byte()
    }

    /// Issues Skip ROM.
    pub fn skip_rom(&mut self) -> OneWireResult<(), O::BusError> {
        self.onewire.skip_rom()
    }

    /// Issues Read ROM and returns the ROM code of the single device on the bus.
    pub fn read_rom(&mut self) -> OneWireResult<DeviceId, O::BusError> {
        let rom = self.onewire.read_rom()?;
        if self.crc_check && !rom.is_valid() {
            return Err(OneWireError::InvalidRomCrc);
        }
        Ok(rom)
    }

    /// Issues Match ROM for `rom`.
    pub fn match_rom(&mut self, rom: &DeviceId) -> OneWireResult<(), O::BusError> {
        self.onewire.match_rom(rom)
    }

    /// Issues Search ROM.
    pub fn search_rom(&mut self) -> OneWireResult<(), O::BusError> {
        self.onewire.search_rom()
    }

    fn record(&mut self, err: OneWireError<O::BusError>) -> OneWireResult<(), O::BusError> {
        match err.code() {
            Some(code) => {
                log::warn!("1-Wire bus: {code}");
                self.error = ErrorRecord::new(code);
                Ok(())
            }
            None => Err(err),
        }
    }
}
