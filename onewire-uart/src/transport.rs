/// The two line rates the tunnel uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Baudrate {
    /// 9600 baud, used for the reset/presence exchange only. The start bit
    /// plus four zero data bits of the reset byte stretch into the ~480 µs
    /// low pulse the protocol requires.
    Reset = 9_600,
    /// 115200 baud, used for every data slot.
    Data = 115_200,
}

impl Baudrate {
    /// Rate in bits per second.
    pub const fn hz(self) -> u32 {
        self as u32
    }
}

/// Low-level serial port the master drives.
///
/// The port must run 8-N-1 with its TX and RX tied together through the
/// open-drain stage on the 1-Wire pin, so that every transmitted byte is
/// simultaneously sampled back, modified by whatever the slaves drove onto
/// the line.
///
/// Calls may block. The master issues no traffic of its own between calls
/// and relies on each call having fully flushed the wire before it
/// returns; slot timing depends on that synchrony.
pub trait UartTransport {
    /// Error produced by the port.
    type Error;

    /// Bring the port up. Called once from
    /// [`UartOneWire::new`](crate::UartOneWire::new).
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Shut the port down. Called from
    /// [`UartOneWire::release`](crate::UartOneWire::release).
    fn deinit(&mut self) -> Result<(), Self::Error>;

    /// Switch the line rate without disturbing the line level.
    fn set_baudrate(&mut self, baudrate: Baudrate) -> Result<(), Self::Error>;

    /// Transmit `buf` while sampling the same number of bytes back into it.
    ///
    /// Transmit and receive run concurrently on the wire; the buffer holds
    /// the outgoing bytes on entry and the sampled bytes on return, in
    /// order.
    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<T: UartTransport + ?Sized> UartTransport for &mut T {
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        T::init(self)
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        T::deinit(self)
    }

    fn set_baudrate(&mut self, baudrate: Baudrate) -> Result<(), Self::Error> {
        T::set_baudrate(self, baudrate)
    }

    fn exchange(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        T::exchange(self, buf)
    }
}
