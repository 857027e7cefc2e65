#[derive(Debug, Default)]
/// Calculate CRC-8 used in 1-Wire communications.
pub struct OneWireCrc(u8);

#[cfg(feature = "crc-table")]
const CRC_TABLE: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut idx = 0;
    while idx < 256 {
        table[idx] = OneWireCrc::shift(idx as u8);
        idx += 1;
    }
    table
};

impl OneWireCrc {
    /// Get the current CRC value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Update the CRC with the incoming byte.
    #[cfg(not(feature = "crc-table"))]
    pub fn update(&mut self, byte: u8) {
        self.0 = Self::shift(self.0 ^ byte);
    }

    /// Update the CRC with the incoming byte.
    #[cfg(feature = "crc-table")]
    pub fn update(&mut self, byte: u8) {
        self.0 = CRC_TABLE[(self.0 ^ byte) as usize];
    }

    /// Compute the CRC of a sequence of bytes.
    pub fn compute(sequence: &[u8]) -> u8 {
        let mut crc = OneWireCrc(0);
        for &byte in sequence.iter() {
            crc.update(byte);
        }
        crc.0
    }

    /// Validate a sequence of bytes where the last byte is the 1-Wire CRC of
    /// the previous bytes.
    pub fn validate(sequence: &[u8]) -> bool {
        // CRC over data followed by its own CRC is zero
        Self::compute(sequence) == 0x0
    }

    const fn shift(mut crc: u8) -> u8 {
        let mut bit = 0;
        while bit < 8 {
            if crc & 0x1 == 0x1 {
                crc = (crc >> 1) ^ 0x8c; // x^8 + x^5 + x^4 + 1, reflected
            } else {
                crc >>= 1;
            }
            bit += 1;
        }
        crc
    }
}
