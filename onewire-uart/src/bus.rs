use crate::{codec, error::UartError, transport::UartTransport, UartResult};

/// A 1-Wire bus master tunneling the line protocol through a full-duplex
/// UART.
///
/// One handle is the single point of access to one physical bus. It owns
/// the serial port for its whole lifetime; [`release`](Self::release) gives
/// the port back.
pub struct UartOneWire<T> {
    pub(crate) transport: T,
}

impl<T: UartTransport> UartOneWire<T> {
    /// Initialize the port and hand back a ready bus master.
    pub fn new(mut transport: T) -> UartResult<Self, T::Error> {
        transport.init().map_err(UartError::Init)?;
        Ok(Self { transport })
    }

    /// Shut the port down and return it.
    pub fn release(mut self) -> UartResult<T, T::Error> {
        self.transport.deinit().map_err(UartError::Init)?;
        Ok(self.transport)
    }

    /// Drive one time slot with `bit` and sample the slot back.
    ///
    /// Sending a 1 releases the line for the whole slot, which makes the
    /// same pattern a read slot. One slot is exactly one UART byte, one
    /// transport call.
    pub fn touch_bit(&mut self, bit: bool) -> UartResult<bool, T::Error> {
        let mut slot = [codec::encode_bit(bit)];
        self.transport
            .exchange(&mut slot)
            .map_err(UartError::Exchange)?;
        Ok(codec::decode_bit(slot[0]))
    }

    /// Write `byte` while sampling the slaves' response to each of its
    /// eight slots, in one transport call.
    ///
    /// Writing `0xFF` makes all eight slots read slots, so this one
    /// primitive carries both the write and the read path.
    pub fn touch_byte(&mut self, byte: u8) -> UartResult<u8, T::Error> {
        let mut slots = codec::encode_byte(byte);
        self.transport
            .exchange(&mut slots)
            .map_err(UartError::Exchange)?;
        Ok(codec::decode_byte(&slots))
    }
}
