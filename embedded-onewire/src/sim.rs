//! Bit-level simulation of an open-drain 1-Wire bus, used by the unit tests.
extern crate std;

use crate::{DeviceId, OneWire, OneWireResult, OneWireStatus, consts::*};
use core::convert::Infallible;
use std::vec::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SimStatus {
    presence: bool,
    bus: bool,
}

impl OneWireStatus for SimStatus {
    fn presence(&self) -> bool {
        self.presence
    }

    fn shortcircuit(&self) -> bool {
        false
    }

    fn bus_detected(&self) -> bool {
        self.bus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Command { byte: u8, bits: u8 },
    Search { bit: u8, phase: u8 },
    ReadRom { bit: u8 },
    Match { bit: u8 },
    Selected,
}

pub(crate) struct SimBus {
    devices: Vec<DeviceId>,
    alarmed: Vec<DeviceId>,
    active: Vec<bool>,
    state: State,
    floating: bool,
    dropout: Option<(usize, u8)>,
    pub(crate) resets: usize,
    pub(crate) written: Vec<u8>,
}

impl SimBus {
    pub(crate) fn new(devices: Vec<DeviceId>) -> Self {
        let active = std::vec![false; devices.len()];
        Self {
            devices,
            alarmed: Vec::new(),
            active,
            state: State::Selected,
            floating: false,
            dropout: None,
            resets: 0,
            written: Vec::new(),
        }
    }

    pub(crate) fn floating() -> Self {
        let mut bus = Self::new(Vec::new());
        bus.floating = true;
        bus
    }

    pub(crate) fn with_alarmed(mut self, alarmed: Vec<DeviceId>) -> Self {
        self.alarmed = alarmed;
        self
    }

    /// Every device goes silent at `bit` (0-based) of the pass following reset number `reset`.
    pub(crate) fn with_dropout(mut self, reset: usize, bit: u8) -> Self {
        self.dropout = Some((reset, bit));
        self
    }

    pub(crate) fn set_devices(&mut self, devices: Vec<DeviceId>) {
        self.active = std::vec![false; devices.len()];
        self.devices = devices;
    }

    fn line(&self, level: impl Fn(&DeviceId) -> bool) -> bool {
        // open drain: any active device driving 0 wins
        self.devices
            .iter()
            .zip(self.active.iter())
            .filter(|(_, active)| **active)
            .all(|(rom, _)| level(rom))
    }

    fn dispatch(&mut self, cmd: u8) {
        self.state = match cmd {
            ONEWIRE_SEARCH_CMD => State::Search { bit: 0, phase: 0 },
            ONEWIRE_CONDITIONAL_SEARCH_CMD => {
                for (rom, active) in self.devices.iter().zip(self.active.iter_mut()) {
                    *active = self.alarmed.contains(rom);
                }
                State::Search { bit: 0, phase: 0 }
            }
            ONEWIRE_READ_ROM_CMD => State::ReadRom { bit: 0 },
            ONEWIRE_MATCH_ROM_CMD => State::Match { bit: 0 },
            _ => State::Selected,
        };
    }
}

impl OneWire for SimBus {
    type Status = SimStatus;
    type BusError = Infallible;

    fn reset(&mut self) -> OneWireResult<Self::Status, Self::BusError> {
        self.resets += 1;
        self.active.iter_mut().for_each(|a| *a = true);
        self.state = State::Command { byte: 0, bits: 0 };
        Ok(SimStatus {
            presence: !self.floating && !self.devices.is_empty(),
            bus: !self.floating,
        })
    }

    fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        self.written.push(byte);
        for pos in 0..8 {
            self.write_bit((byte >> pos) & 0x1 == 0x1)?;
        }
        Ok(())
    }

    fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError> {
        match self.state {
            State::Command { byte, bits } => {
                let byte = byte | ((bit as u8) << bits);
                if bits == 7 {
                    self.dispatch(byte);
                } else {
                    self.state = State::Command { byte, bits: bits + 1 };
                }
            }
            State::Search { bit: pos, phase: 2 } | State::Match { bit: pos } => {
                for (rom, active) in self.devices.iter().zip(self.active.iter_mut()) {
                    if rom.bit(pos) != bit {
                        *active = false;
                    }
                }
                self.state = match (self.state, pos) {
                    (_, 63) => State::Selected,
                    (State::Search { .. }, _) => State::Search { bit: pos + 1, phase: 0 },
                    _ => State::Match { bit: pos + 1 },
                };
            }
            _ => {}
        }
        Ok(())
    }

    fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError> {
        let level = match self.state {
            State::Search { bit, phase } if phase < 2 => {
                if phase == 0 && self.dropout == Some((self.resets, bit)) {
                    self.active.iter_mut().for_each(|a| *a = false);
                }
                self.state = State::Search { bit, phase: phase + 1 };
                if phase == 0 {
                    self.line(|rom| rom.bit(bit))
                } else {
                    self.line(|rom| !rom.bit(bit))
                }
            }
            State::ReadRom { bit } => {
                self.state = if bit == 63 {
                    State::Selected
                } else {
                    State::ReadRom { bit: bit + 1 }
                };
                self.line(|rom| rom.bit(bit))
            }
            _ => true,
        };
        Ok(level)
    }
}
