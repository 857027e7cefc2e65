//! UART character patterns for 1-Wire time slots.
//!
//! A UART frame starts with a low start bit followed by the data bits, least
//! significant first, and ends high. On an open-drain line with TX and RX tied
//! together, the character sent decides how long the master holds the line
//! low, and the character received back shows whether a device held it low
//! for longer.
use bitfield_struct::bitfield;
use embedded_onewire::OneWireStatus;

/// Sent at the reset baud rate: start bit plus four low data bits make the
/// reset pulse, the four high data bits leave room for the presence pulse.
pub(crate) const RESET_PULSE: u8 = 0xf0;

/// Only the start bit is low: a write-1 slot, and the read slot a device may stretch.
pub(crate) const WRITE_1_SLOT: u8 = 0xff;

/// Start bit and all data bits low: a write-0 slot.
pub(crate) const WRITE_0_SLOT: u8 = 0x00;

/// A read slot is a write-1 slot the devices may pull low.
pub(crate) const READ_SLOT: u8 = WRITE_1_SLOT;

/// Character to send for a bit.
pub(crate) const fn encode_bit(bit: bool) -> u8 {
    if bit { WRITE_1_SLOT } else { WRITE_0_SLOT }
}

/// Bit value of a captured slot.
///
/// The first data bit is sampled roughly 15 µs into the slot: low means a
/// device (or the master) held the line.
pub(crate) const fn decode_bit(echo: u8) -> bool {
    echo & 0x01 == 0x01
}

/// The eight slots carrying `byte`, least significant bit first.
pub(crate) fn encode_byte(byte: u8) -> [u8; 8] {
    let mut slots = [WRITE_0_SLOT; 8];
    for (pos, slot) in slots.iter_mut().enumerate() {
        *slot = encode_bit((byte >> pos) & 0x1 == 0x1);
    }
    slots
}

/// Assembles eight captured slots, least significant bit first.
pub(crate) fn decode_byte(echo: &[u8; 8]) -> u8 {
    echo.iter()
        .enumerate()
        .filter(|(_, slot)| decode_bit(**slot))
        .fold(0, |byte, (pos, _)| byte | (1 << pos))
}

/// Outcome of a reset pulse, decoded from the character captured while
/// sending [`RESET_PULSE`] at the reset baud rate.
///
/// | Echo | Meaning |
/// |------|---------|
/// | none | the line does not echo: no bus |
/// | low nibble not `0` | the line did not follow the reset pulse: no bus |
/// | `0x00` | the line stayed low through the presence window: short circuit |
/// | `0xf0` | the line came back high untouched: no device |
/// | other | a device pulled the line low: presence |
#[bitfield(u16)]
pub struct ResetStatus {
    /// Character captured during the reset, `0` if none.
    pub echo: u8,
    /// Set if the line echoed the reset pulse the way a 1-Wire bus does.
    pub(crate) bus_detect: bool,
    /// Set if a device pulled the line low after the reset pulse.
    pub(crate) presence_detect: bool,
    /// Set if the line never came back high.
    pub(crate) short_detect: bool,
    #[bits(5)]
    __: u8,
}

impl ResetStatus {
    pub(crate) fn from_echo(echo: Option<u8>) -> Self {
        let Some(echo) = echo else {
            return Self::new();
        };
        let status = Self::new().with_echo(echo);
        if echo & 0x0f != 0 {
            status
        } else if echo == 0x00 {
            status.with_bus_detect(true).with_short_detect(true)
        } else if echo == RESET_PULSE {
            status.with_bus_detect(true)
        } else {
            status.with_bus_detect(true).with_presence_detect(true)
        }
    }
}

impl OneWireStatus for ResetStatus {
    fn presence(&self) -> bool {
        self.presence_detect()
    }

    fn shortcircuit(&self) -> bool {
        self.short_detect()
    }

    fn bus_detected(&self) -> bool {
        self.bus_detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_onewire::{OneWireError, OneWireStatus};

    #[test]
    fn byte_slots_are_lsb_first() {
        assert_eq!(
            encode_byte(0x44),
            [0x00, 0x00, 0xff, 0x00, 0x00, 0x00, 0xff, 0x00]
        );
        assert_eq!(decode_byte(&encode_byte(0x44)), 0x44);
    }

    #[test]
    fn stretched_slot_reads_zero() {
        assert!(decode_bit(0xff));
        assert!(!decode_bit(0xf8));
        assert!(!decode_bit(0x00));
        // a device holding the line for a short while only clears the low bits
        assert_eq!(decode_byte(&[0xff, 0xfc, 0xff, 0xff, 0xe0, 0xff, 0xff, 0xfe]), 0x6d);
    }

    #[test]
    fn reset_echo_classification() {
        let presence = ResetStatus::from_echo(Some(0xe0));
        assert!(presence.presence());
        assert_eq!(presence.check::<()>(), Ok(()));

        let empty = ResetStatus::from_echo(Some(RESET_PULSE));
        assert!(empty.bus_detected() && !empty.presence());
        assert_eq!(empty.check::<()>(), Err(OneWireError::NoDevicePresent));

        let short = ResetStatus::from_echo(Some(0x00));
        assert_eq!(short.check::<()>(), Err(OneWireError::ShortCircuit));

        let silent = ResetStatus::from_echo(None);
        assert_eq!(silent.check::<()>(), Err(OneWireError::NoBus));

        let garbage = ResetStatus::from_echo(Some(0xf3));
        assert_eq!(garbage.check::<()>(), Err(OneWireError::NoBus));
        assert_eq!(garbage.echo(), 0xf3);
    }
}
