/// 1-Wire protocol error, generic over the bus master's error type.
#[derive(Debug)]
pub enum Error<E> {
    /// The underlying bus hardware failed.
    Bus(E),
    /// Reset completed but no slave answered with a presence pulse, or the
    /// line is stuck low.
    NoPresence,
    /// The ROM search is exhausted, or no device took part in it.
    NoDevice,
    /// A ROM address read off the bus failed its CRC check.
    InvalidCrc,
}

impl<E> From<E> for Error<E> {
    fn from(bus: E) -> Self {
        Self::Bus(bus)
    }
}
