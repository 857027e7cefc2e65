#![no_std]
#![deny(missing_docs)]
//! # embedded-onewire
//! A no-std implementation of the 1-Wire protocol.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing you to implement the protocol on various platforms.
//! [OneWire] trait defines the basic operations required for 1-Wire communication, such as resetting the bus, writing and reading bytes, and writing and reading bits,
//! along with the generic ROM commands (Read ROM, Skip ROM, Match ROM, Search ROM) built on top of them.
//!
//! The crate also provides the search algorithm for discovering devices on the 1-Wire bus, implemented in [OneWireSearch],
//! and [OneWireBus], which owns a bus master, enumerates the devices on it into a [DeviceRegistry]
//! and keeps an [ErrorRecord] of the last reset.

mod bus;
pub mod consts;
mod error;
mod registry;
mod rom;
mod search;
#[cfg(test)]
mod sim;
mod traits;
mod utils;
pub use bus::OneWireBus;
pub use error::{ErrorCode, ErrorRecord, OneWireError};
pub use registry::DeviceRegistry;
pub use rom::DeviceId;
pub use search::{OneWireSearch, OneWireSearchKind};
pub use traits::{OneWire, OneWireStatus};
pub use utils::OneWireCrc;

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
