#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

/*! # 1-Wire over UART
 *
 * A 1-Wire bus master that uses a full-duplex UART as its time base
 * instead of bit-banging a GPIO. With TX and RX tied together at the
 * open-drain transistor on the 1-Wire pin, every byte the UART frames is
 * one precisely timed low/high pattern on the wire:
 *
 * - one byte at 115200 baud is one 1-Wire time slot (`0xFF` writes a 1
 *   and doubles as a read slot, `0x00` writes a 0),
 * - one `0xF0` byte at 9600 baud is the reset pulse, with the presence
 *   pulse visible in the echoed byte.
 *
 * Because the line is open drain, the byte sampled back on RX is the
 * wired-AND of what the master sent and what the slaves drove; a slot
 * that does not echo as `0xFF` read back a 0.
 *
 * The serial port is abstracted by the [`UartTransport`] trait, so the
 * same master runs on anything that can switch between the two baud
 * rates and exchange bytes full-duplex.
 */

mod bus;
mod codec;
mod error;
#[cfg(feature = "std")]
mod mock;
mod onewire;
#[cfg(feature = "std")]
mod shared;
mod transport;

pub use onewire_core::{
    commands, crc8, Crc8, Error, OneWireMaster, OwResult, RomSearch, SearchKind,
};

pub use bus::UartOneWire;
pub use error::UartError;
#[cfg(feature = "std")]
pub use mock::{MockError, MockUart, Reply};
#[cfg(feature = "std")]
pub use shared::SharedUartOneWire;
pub use transport::{Baudrate, UartTransport};

/// Result of UART-master operations.
pub type UartResult<T, E> = Result<T, Error<UartError<E>>>;
