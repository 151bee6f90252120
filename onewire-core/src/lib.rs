#![no_std]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod commands;
mod crc;
mod error;
mod master;
mod search;

pub use crc::{crc8, Crc8};
pub use error::Error;
pub use master::OneWireMaster;
pub use search::{RomSearch, SearchKind};

/// Result of 1-Wire operations, generic over the bus master's error type.
pub type OwResult<T, E> = Result<T, Error<E>>;
