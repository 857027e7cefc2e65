#[allow(unused_imports)]
use crate::OneWireSearch;

/// One wire communication error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneWireError<E> {
    /// Encapsulates the error type from the underlying hardware.
    Other(E),
    /// The line does not behave like a 1-Wire bus (floating, disconnected or
    /// not echoing what the master drives).
    NoBus,
    /// Indicates that no device answered the reset pulse with a presence pulse.
    NoDevicePresent,
    /// Indicates that a short circuit was detected on the bus.
    ShortCircuit,
    /// Both the id bit and its complement read back as 1 during a
    /// [`OneWireSearch`] pass: every participating device left the search.
    SearchAborted,
    /// More devices answered the search than the device registry holds.
    RegistryFull,
    /// Computed CRC of the ROM is invalid.
    InvalidRomCrc,
}

impl<E> From<E> for OneWireError<E> {
    fn from(other: E) -> Self {
        Self::Other(other)
    }
}

impl<E> OneWireError<E> {
    /// Bus condition this error is recorded as, if any.
    ///
    /// Returns [`None`] for errors of the underlying hardware and for other
    /// errors that are not a property of the bus itself.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::NoBus | Self::ShortCircuit => Some(ErrorCode::NoBus),
            Self::NoDevicePresent | Self::SearchAborted => Some(ErrorCode::NoDevices),
            Self::RegistryFull => Some(ErrorCode::RegistryFull),
            Self::Other(_) | Self::InvalidRomCrc => None,
        }
    }
}

/// Outcome code of the most recent reset or enumeration.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The last reset saw at least one presence pulse.
    #[default]
    NoError = 0,
    /// The bus answered, but no device signalled presence.
    NoDevices = 1,
    /// No 1-Wire circuit was detected on the line.
    NoBus = 2,
    /// The enumeration stopped with devices left on the bus.
    RegistryFull = 3,
}

impl ErrorCode {
    /// Fixed human readable message for this code.
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoError => "no error",
            Self::NoDevices => "no devices found on the 1-Wire bus",
            Self::NoBus => "no 1-Wire circuit detected",
            Self::RegistryFull => "more devices on the 1-Wire bus than the registry holds",
        }
    }
}

impl core::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Error record of the most recent [`OneWireBus::reset`](crate::OneWireBus::reset)
/// or [`OneWireBus::discover_devices`](crate::OneWireBus::discover_devices).
///
/// A reset clears it first. An enumeration replaces it together with the
/// device registry, unless it fails with an error of the bus master.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRecord {
    code: ErrorCode,
}

impl ErrorRecord {
    pub(crate) const fn new(code: ErrorCode) -> Self {
        Self { code }
    }

    /// Outcome code.
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message matching [`ErrorRecord::code`].
    pub const fn message(&self) -> &'static str {
        self.code.message()
    }

    /// `true` when the record holds [`ErrorCode::NoError`].
    pub fn is_ok(&self) -> bool {
        self.code == ErrorCode::NoError
    }
}
