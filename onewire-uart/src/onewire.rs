use onewire_core::{Error, OneWireMaster, OwResult};

use crate::{
    error::UartError,
    transport::{Baudrate, UartTransport},
    UartOneWire,
};

/// Reset byte: at 9600 baud its start bit and four low data bits form the
/// ~520 µs reset pulse, and the high upper half leaves room for slaves to
/// answer with a presence pulse.
const RESET_PATTERN: u8 = 0xF0;

impl<T: UartTransport> OneWireMaster for UartOneWire<T> {
    type Error = UartError<T::Error>;

    fn reset(&mut self) -> OwResult<(), Self::Error> {
        self.transport
            .set_baudrate(Baudrate::Reset)
            .map_err(UartError::Baudrate)?;

        let mut pulse = [RESET_PATTERN];
        let exchanged = self
            .transport
            .exchange(&mut pulse)
            .map_err(UartError::Exchange);

        // Restore the data rate even when the exchange failed, so the next
        // operation does not silently run at the reset rate.
        let restored = self
            .transport
            .set_baudrate(Baudrate::Data)
            .map_err(UartError::Baudrate);
        exchanged?;
        restored?;

        match pulse[0] {
            // The pattern bounced back untouched: nothing pulled the line.
            RESET_PATTERN => Err(Error::NoPresence),
            // The line never rose: shorted bus or driver fault.
            0x00 => Err(Error::NoPresence),
            // A slave stretched the low phase: presence pulse.
            _ => Ok(()),
        }
    }

    fn write_byte(&mut self, byte: u8) -> OwResult<(), Self::Error> {
        self.touch_byte(byte)?;
        Ok(())
    }

    fn read_byte(&mut self) -> OwResult<u8, Self::Error> {
        // A read is a write of all ones: slaves flip the slots of the zero
        // bits.
        self.touch_byte(0xFF)
    }

    fn write_bit(&mut self, bit: bool) -> OwResult<(), Self::Error> {
        self.touch_bit(bit)?;
        Ok(())
    }

    fn read_bit(&mut self) -> OwResult<bool, Self::Error> {
        self.touch_bit(true)
    }
}
