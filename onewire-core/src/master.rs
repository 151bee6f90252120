use crate::{commands, OwResult};

/// Master side of a single 1-Wire line.
///
/// Implementors provide the reset pulse and the time-slot primitives;
/// everything else in this crate (ROM addressing, search, enumeration) is
/// built on top of them. All operations block the caller until the wire
/// transaction has completed.
pub trait OneWireMaster {
    /// Error reported by the underlying bus hardware.
    type Error;

    /// Reset the bus and check for a presence pulse.
    ///
    /// After a successful reset every slave is idle and expects exactly one
    /// ROM command byte.
    ///
    /// # Errors
    /// [`Error::NoPresence`](crate::Error::NoPresence) when no slave
    /// answers, or when the line never rises (shorted bus).
    fn reset(&mut self) -> OwResult<(), Self::Error>;

    /// Write one byte, bit 0 first.
    fn write_byte(&mut self, byte: u8) -> OwResult<(), Self::Error>;

    /// Read one byte, bit 0 first.
    fn read_byte(&mut self) -> OwResult<u8, Self::Error>;

    /// Drive a single write slot.
    fn write_bit(&mut self, bit: bool) -> OwResult<(), Self::Error>;

    /// Drive a single read slot and sample the line.
    fn read_bit(&mut self) -> OwResult<bool, Self::Error>;

    /// Write a slice of bytes in order.
    fn write_bytes(&mut self, bytes: &[u8]) -> OwResult<(), Self::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Fill `buf` with bytes read off the bus.
    fn read_bytes(&mut self, buf: &mut [u8]) -> OwResult<(), Self::Error> {
        for byte in buf {
            *byte = self.read_byte()?;
        }
        Ok(())
    }

    /// Select the device with the given ROM. Must directly follow a reset;
    /// every other device stays silent until the next one.
    fn match_rom(&mut self, rom: u64) -> OwResult<(), Self::Error> {
        self.write_byte(commands::MATCH_ROM)?;
        self.write_bytes(&rom.to_le_bytes())
    }

    /// Address every device on the bus at once. Only meaningful when a
    /// single slave is present, or for broadcast writes.
    fn skip_rom(&mut self) -> OwResult<(), Self::Error> {
        self.write_byte(commands::SKIP_ROM)
    }

    /// Reset the bus and address one device (`Some(rom)`) or all of them
    /// (`None`), leaving the bus ready for a function command.
    fn address(&mut self, rom: Option<u64>) -> OwResult<(), Self::Error> {
        self.reset()?;
        match rom {
            Some(rom) => self.match_rom(rom),
            None => self.skip_rom(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Captures the byte stream a provided method puts on the bus.
    #[derive(Default)]
    struct RecordingBus {
        bytes: [u8; 16],
        len: usize,
        resets: usize,
    }

    impl RecordingBus {
        fn written(&self) -> &[u8] {
            &self.bytes[..self.len]
        }
    }

    impl OneWireMaster for RecordingBus {
        type Error = Infallible;

        fn reset(&mut self) -> OwResult<(), Infallible> {
            self.resets += 1;
            Ok(())
        }

        fn write_byte(&mut self, byte: u8) -> OwResult<(), Infallible> {
            self.bytes[self.len] = byte;
            self.len += 1;
            Ok(())
        }

        fn read_byte(&mut self) -> OwResult<u8, Infallible> {
            Ok(0xFF)
        }

        fn write_bit(&mut self, _bit: bool) -> OwResult<(), Infallible> {
            Ok(())
        }

        fn read_bit(&mut self) -> OwResult<bool, Infallible> {
            Ok(true)
        }
    }

    #[test]
    fn match_rom_sends_command_then_rom_lsb_first() {
        let mut bus = RecordingBus::default();
        bus.match_rom(0x1122334455667788).unwrap();
        assert_eq!(
            bus.written(),
            [commands::MATCH_ROM, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
        );
    }

    #[test]
    fn skip_rom_sends_single_command() {
        let mut bus = RecordingBus::default();
        bus.skip_rom().unwrap();
        assert_eq!(bus.written(), [commands::SKIP_ROM]);
    }

    #[test]
    fn address_resets_before_selecting() {
        let mut bus = RecordingBus::default();
        bus.address(None).unwrap();
        assert_eq!(bus.resets, 1);
        assert_eq!(bus.written(), [commands::SKIP_ROM]);

        let mut bus = RecordingBus::default();
        bus.address(Some(0x01)).unwrap();
        assert_eq!(bus.resets, 1);
        assert_eq!(bus.written()[0], commands::MATCH_ROM);
    }
}
