use crate::OneWireCrc;

/// 64-bit ROM code uniquely identifying a 1-Wire device.
///
/// | Byte | Description |
/// |------|-------------|
/// | 0 | Family code (e.g., 0x28 for DS18B20) |
/// | 1-6 | Serial number, least significant byte first |
/// | 7 | CRC-8 (`0b1_0001_1001` poly) of bytes 0-6 |
///
/// The bytes are sent on the wire in index order, each one least significant
/// bit first, so the family code goes out first. Converting to and from `u64`
/// uses little-endian byte order, putting the family code in the low byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId([u8; 8]);

impl DeviceId {
    /// Creates a ROM code from its raw bytes, family code first.
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Builds a ROM code from the family code and serial number, appending
    /// the matching CRC.
    pub fn from_parts(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [family, 0, 0, 0, 0, 0, 0, 0];
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = OneWireCrc::compute(&bytes[..7]);
        Self(bytes)
    }

    /// Family code, used to pick a device-specific protocol.
    pub const fn family(&self) -> u8 {
        self.0[0]
    }

    /// 48-bit serial number.
    pub fn serial(&self) -> [u8; 6] {
        let mut serial = [0; 6];
        serial.copy_from_slice(&self.0[1..7]);
        serial
    }

    /// Check byte transmitted with the ROM code.
    pub const fn crc(&self) -> u8 {
        self.0[7]
    }

    /// `true` if the check byte matches the CRC-8 of the first seven bytes.
    pub fn is_valid(&self) -> bool {
        OneWireCrc::validate(&self.0)
    }

    /// Raw bytes in transmission order.
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Value of ROM bit `bit` (0-63) in transmission order.
    pub const fn bit(&self, bit: u8) -> bool {
        self.0[(bit / 8) as usize] & (1 << (bit % 8)) != 0
    }
}

impl From<[u8; 8]> for DeviceId {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl From<DeviceId> for [u8; 8] {
    fn from(rom: DeviceId) -> Self {
        rom.0
    }
}

impl From<u64> for DeviceId {
    fn from(rom: u64) -> Self {
        Self(rom.to_le_bytes())
    }
}

impl From<DeviceId> for u64 {
    fn from(rom: DeviceId) -> Self {
        u64::from_le_bytes(rom.0)
    }
}

impl core::fmt::Display for DeviceId {
    /// Formats as `FF-SSSSSSSSSSSS-CC`: family, serial (most significant byte
    /// first) and CRC.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}-", self.family())?;
        for b in self.0[1..7].iter().rev() {
            write!(f, "{b:02x}")?;
        }
        write!(f, "-{:02x}", self.crc())
    }
}

impl core::fmt::LowerHex for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::LowerHex::fmt(&u64::from(*self), f)
    }
}
