//! ROM command constants for 1-Wire communication.

/// Read ROM: the single device on the bus answers with its 64-bit ROM code.
///
/// Only valid with exactly one device on the bus, otherwise the open-drain
/// line returns the bitwise AND of every ROM code.
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Match ROM: followed by the 64-bit ROM code of the device to address.
pub const ONEWIRE_MATCH_ROM_CMD: u8 = 0x55;

/// Skip ROM: addresses every device on the bus at once.
pub const ONEWIRE_SKIP_ROM_CMD: u8 = 0xcc;

/// Search ROM: starts one pass of the [search algorithm](https://www.analog.com/en/resources/app-notes/1wire-search-algorithm.html).
pub const ONEWIRE_SEARCH_CMD: u8 = 0xf0;

/// Conditional search: like [`ONEWIRE_SEARCH_CMD`], but only devices with
/// their alarm flag set take part.
pub const ONEWIRE_CONDITIONAL_SEARCH_CMD: u8 = 0xec;
