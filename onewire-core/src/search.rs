use crate::{commands, crc::Crc8, error::Error, master::OneWireMaster, OwResult};

/// `last_discrepancy` sentinel: no pass has run yet, walk the tree fresh.
const FIRST_DEVICE: u8 = 0xFF;
/// `last_discrepancy` sentinel: the previous pass left no branch behind.
const LAST_DEVICE: u8 = 0x00;

/// Which devices a [`RomSearch`] enumerates.
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum SearchKind {
    /// Every device on the bus.
    Normal = commands::SEARCH_ROM,
    /// Only devices with a pending alarm condition.
    Alarm = commands::ALARM_SEARCH,
}

/// Iterative ROM enumeration over a borrowed bus master.
///
/// Each call to [`next`](RomSearch::next) runs one full search pass (reset,
/// command byte, 64 slot pairs) and yields one ROM. The state carried
/// between passes is the scratch ROM of the previous pass plus a single
/// byte: the index of the bit at which the previous pass took the 1-branch
/// of a collision and left the 0-branch for later. Bit indices count from
/// 64 (first bit on the wire, bit 0 of the family byte) down to 1, with
/// `0xFF` meaning "fresh search" and `0x00` meaning "nothing left".
pub struct RomSearch<'a, T> {
    master: &'a mut T,
    command: u8,
    last_discrepancy: u8,
    rom: [u8; 8],
}

impl<'a, T> RomSearch<'a, T> {
    /// Begin a fresh enumeration with one of the standard search commands.
    pub fn new(master: &'a mut T, kind: SearchKind) -> Self {
        Self::with_command(master, kind as u8)
    }

    /// Begin a fresh enumeration with an arbitrary search command byte.
    pub fn with_command(master: &'a mut T, command: u8) -> Self {
        Self {
            master,
            command,
            last_discrepancy: FIRST_DEVICE,
            rom: [0; 8],
        }
    }

    /// Forget all search state; the next [`next`](RomSearch::next) call
    /// starts over from the first device.
    pub fn reset(&mut self) {
        self.last_discrepancy = FIRST_DEVICE;
    }
}

impl<T: OneWireMaster> RomSearch<'_, T> {
    /// Discover the next ROM on the bus.
    ///
    /// Runs a bus reset, writes the search command, then walks all 64 ROM
    /// bits. Each bit costs three time slots: two reads (the bit as seen by
    /// all still-active slaves, wired-AND, and its complement), then one
    /// write telling slaves that do not match the chosen value to drop out
    /// until the next reset.
    ///
    /// # Returns
    /// The discovered ROM, family byte in bits 0–7, CRC in bits 56–63.
    ///
    /// # Errors
    /// [`Error::NoDevice`] once the enumeration is exhausted (the state
    /// rearms itself, so calling again starts a fresh enumeration) or when
    /// no slave takes part in the search at all. [`Error::InvalidCrc`] when
    /// the discovered ROM fails its checksum. Bus errors propagate without
    /// touching the pass-to-pass state.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> OwResult<u64, T::Error> {
        if self.last_discrepancy == LAST_DEVICE {
            // Exhausted on the previous pass. Rearm so the caller can simply
            // search again to start over.
            self.reset();
            return Err(Error::NoDevice);
        }

        self.master.reset()?;
        self.master.write_byte(self.command)?;

        let mut next_discrepancy = LAST_DEVICE;
        // Bit index in wire order, counting 64 down to 1.
        let mut id_bit_number: u8 = 64;

        for idx in 0..8 {
            let mut mask: u8 = 0x01;
            for _ in 0..8 {
                let bit = self.master.read_bit()?;
                let bit_cpl = self.master.read_bit()?;

                let chosen = if bit && bit_cpl {
                    // Nobody answered either slot: every candidate dropped
                    // out, or none took part in the first place.
                    self.last_discrepancy = next_discrepancy;
                    return Err(Error::NoDevice);
                } else if bit != bit_cpl {
                    // All active slaves agree here; follow them.
                    bit
                } else {
                    // Collision. Take the 1-branch unless this is exactly
                    // the position the previous pass flagged for flipping,
                    // or the previous pass already walked the 0-branch here.
                    // Every position left with an unexplored 0-branch is
                    // remembered for the next pass.
                    let previous = self.rom[idx] & mask != 0;
                    let take_one = id_bit_number < self.last_discrepancy
                        || (previous && id_bit_number != self.last_discrepancy);
                    if take_one {
                        next_discrepancy = id_bit_number;
                    }
                    take_one
                };

                self.master.write_bit(chosen)?;
                if chosen {
                    self.rom[idx] |= mask;
                } else {
                    self.rom[idx] &= !mask;
                }

                mask <<= 1;
                id_bit_number -= 1;
            }
        }

        self.last_discrepancy = next_discrepancy;
        if !Crc8::validate(&self.rom) {
            return Err(Error::InvalidCrc);
        }
        Ok(u64::from_le_bytes(self.rom))
    }

    /// Enumerate from scratch and store every discovered ROM into `roms`.
    ///
    /// Stops when the slice is full or the bus runs out of devices.
    /// Exhaustion after at least one find is the normal end of a scan, not
    /// an error.
    ///
    /// # Returns
    /// The number of ROMs stored.
    pub fn fill(&mut self, roms: &mut [u64]) -> OwResult<usize, T::Error> {
        self.reset();
        let mut found = 0;
        while found < roms.len() {
            match self.next() {
                Ok(rom) => {
                    roms[found] = rom;
                    found += 1;
                }
                Err(Error::NoDevice) if found > 0 => break,
                Err(err) => return Err(err),
            }
        }
        Ok(found)
    }

    /// Enumerate from scratch, invoking `visit` with every discovered ROM
    /// and its index, then one final time with `None` once the scan is
    /// over. An error returned by the visitor aborts the scan (the
    /// end-of-scan call still happens) and is reported to the caller. A bus
    /// with nothing to enumerate reports zero finds, not an error.
    ///
    /// The visitor cannot touch the bus: the search holds it for the whole
    /// scan.
    ///
    /// # Returns
    /// The number of ROMs visited.
    pub fn for_each<F>(&mut self, mut visit: F) -> OwResult<usize, T::Error>
    where
        F: FnMut(Option<u64>, usize) -> OwResult<(), T::Error>,
    {
        self.reset();
        let mut found = 0;
        let result = loop {
            match self.next() {
                Ok(rom) => {
                    if let Err(err) = visit(Some(rom), found) {
                        break Err(err);
                    }
                    found += 1;
                }
                Err(Error::NoDevice) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        let _ = visit(None, found);
        result.map(|()| found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::crc8;

    /// Wired-AND model of a bus with `N` slaves, driven at the trait level.
    ///
    /// Tracks which slaves are still participating in the current search
    /// pass and answers the read/read/write slot cycle the way open-drain
    /// hardware would: reads are the AND over all active slaves, a write
    /// drops every slave whose ROM disagrees with the written bit.
    struct SimBus<const N: usize> {
        roms: [[u8; 8]; N],
        active: [bool; N],
        cursor: usize,
        phase: u8,
        ops: usize,
        fail_after: Option<usize>,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct SimFault;

    impl<const N: usize> SimBus<N> {
        fn new(roms: [[u8; 8]; N]) -> Self {
            Self {
                roms,
                active: [false; N],
                cursor: 0,
                phase: 0,
                ops: 0,
                fail_after: None,
            }
        }

        fn rom_bit(&self, slave: usize, index: usize) -> bool {
            self.roms[slave][index / 8] & (1 << (index % 8)) != 0
        }

        fn tick(&mut self) -> OwResult<(), SimFault> {
            self.ops += 1;
            match self.fail_after {
                Some(limit) if self.ops > limit => Err(Error::Bus(SimFault)),
                _ => Ok(()),
            }
        }

        /// AND of `f` over all active slaves; a released line reads high.
        fn wire(&self, f: impl Fn(&Self, usize) -> bool) -> bool {
            (0..N).filter(|&s| self.active[s]).all(|s| f(self, s))
        }
    }

    impl<const N: usize> OneWireMaster for SimBus<N> {
        type Error = SimFault;

        fn reset(&mut self) -> OwResult<(), SimFault> {
            self.tick()?;
            if N == 0 {
                return Err(Error::NoPresence);
            }
            self.active = [true; N];
            self.cursor = 0;
            self.phase = 0;
            Ok(())
        }

        fn write_byte(&mut self, _byte: u8) -> OwResult<(), SimFault> {
            // Command byte; the simulated slaves answer any search command.
            self.tick()
        }

        fn read_byte(&mut self) -> OwResult<u8, SimFault> {
            self.tick()?;
            Ok(0xFF)
        }

        fn write_bit(&mut self, bit: bool) -> OwResult<(), SimFault> {
            self.tick()?;
            for slave in 0..N {
                if self.active[slave] && self.rom_bit(slave, self.cursor) != bit {
                    self.active[slave] = false;
                }
            }
            self.cursor += 1;
            self.phase = 0;
            Ok(())
        }

        fn read_bit(&mut self) -> OwResult<bool, SimFault> {
            self.tick()?;
            let cursor = self.cursor;
            let value = if self.phase == 0 {
                self.wire(|sim, s| sim.rom_bit(s, cursor))
            } else {
                self.wire(|sim, s| !sim.rom_bit(s, cursor))
            };
            self.phase += 1;
            Ok(value)
        }
    }

    fn rom(family: u8, serial: [u8; 6]) -> [u8; 8] {
        let mut rom = [0; 8];
        rom[0] = family;
        rom[1..7].copy_from_slice(&serial);
        rom[7] = crc8(&rom[..7]);
        rom
    }

    #[test]
    fn single_device_found_then_exhausted() {
        let id = rom(0x28, [0xFF, 0x64, 0x1E, 0xB8, 0x16, 0x03]);
        let mut bus = SimBus::new([id]);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        assert_eq!(search.next().unwrap(), u64::from_le_bytes(id));
        assert_eq!(search.last_discrepancy, LAST_DEVICE);

        assert!(matches!(search.next(), Err(Error::NoDevice)));
        assert_eq!(search.last_discrepancy, FIRST_DEVICE);

        // The rearmed state enumerates from scratch.
        assert_eq!(search.next().unwrap(), u64::from_le_bytes(id));
    }

    #[test]
    fn two_devices_discriminated_across_passes() {
        let a = rom(0x01, [0; 6]);
        let b = rom(0x02, [0; 6]);
        let mut bus = SimBus::new([a, b]);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        // First pass takes the 1-branch at the family-bit collision, which
        // is device A (bit 0 of 0x01 is set), and flags bit index 64.
        assert_eq!(search.next().unwrap(), u64::from_le_bytes(a));
        assert_eq!(search.last_discrepancy, 64);

        // Second pass flips that bit and finds B, leaving nothing behind.
        assert_eq!(search.next().unwrap(), u64::from_le_bytes(b));
        assert_eq!(search.last_discrepancy, LAST_DEVICE);

        assert!(matches!(search.next(), Err(Error::NoDevice)));
    }

    #[test]
    fn reset_restarts_a_half_done_enumeration() {
        let a = rom(0x01, [0; 6]);
        let b = rom(0x02, [0; 6]);
        let mut bus = SimBus::new([a, b]);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        search.next().unwrap();
        assert_ne!(search.last_discrepancy, FIRST_DEVICE);

        search.reset();
        assert_eq!(search.last_discrepancy, FIRST_DEVICE);
        assert_eq!(search.next().unwrap(), u64::from_le_bytes(a));
    }

    #[test]
    fn fill_reports_every_device_with_valid_crc() {
        let roms = [
            rom(0x10, [1, 2, 3, 4, 5, 6]),
            rom(0x20, [9, 8, 7, 6, 5, 4]),
            rom(0x28, [0xAA, 0x55, 0, 0, 0, 1]),
            rom(0x3B, [0, 0, 0, 0, 0, 2]),
        ];
        let mut bus = SimBus::new(roms);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        let mut found = [0u64; 8];
        let count = search.fill(&mut found).unwrap();
        assert_eq!(count, 4);

        let mut expected: [u64; 4] = roms.map(u64::from_le_bytes);
        expected.sort_unstable();
        let mut reported = [found[0], found[1], found[2], found[3]];
        reported.sort_unstable();
        assert_eq!(reported, expected);
        for id in reported {
            assert!(Crc8::validate(&id.to_le_bytes()));
        }
    }

    #[test]
    fn fill_stops_at_slice_capacity() {
        let roms = [rom(0x01, [0; 6]), rom(0x02, [0; 6]), rom(0x04, [0; 6])];
        let mut bus = SimBus::new(roms);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        let mut found = [0u64; 2];
        assert_eq!(search.fill(&mut found).unwrap(), 2);
    }

    #[test]
    fn fill_propagates_missing_presence() {
        let mut bus = SimBus::new([]);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);
        let mut found = [0u64; 2];
        assert!(matches!(search.fill(&mut found), Err(Error::NoPresence)));
    }

    #[test]
    fn for_each_visits_roms_then_end_marker() {
        let a = rom(0x01, [0; 6]);
        let b = rom(0x02, [0; 6]);
        let mut bus = SimBus::new([a, b]);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        let mut seen = [None; 3];
        let count = search
            .for_each(|rom, index| {
                seen[index] = Some(rom);
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(seen[0], Some(Some(u64::from_le_bytes(a))));
        assert_eq!(seen[1], Some(Some(u64::from_le_bytes(b))));
        assert_eq!(seen[2], Some(None));
    }

    #[test]
    fn for_each_aborts_on_visitor_error() {
        let a = rom(0x01, [0; 6]);
        let b = rom(0x02, [0; 6]);
        let mut bus = SimBus::new([a, b]);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        let mut calls = 0;
        let result = search.for_each(|_, _| {
            calls += 1;
            Err(Error::Bus(SimFault))
        });
        assert!(matches!(result, Err(Error::Bus(SimFault))));
        // One visit aborted the scan; the end marker was still delivered.
        assert_eq!(calls, 2);
    }

    #[test]
    fn bus_fault_leaves_state_at_in_progress_value() {
        let a = rom(0x01, [0; 6]);
        let b = rom(0x02, [0; 6]);
        let mut bus = SimBus::new([a, b]);
        bus.fail_after = Some(250);
        let mut search = RomSearch::new(&mut bus, SearchKind::Normal);

        search.next().unwrap();
        assert_eq!(search.last_discrepancy, 64);

        // The second pass dies partway through its slot traffic.
        assert!(matches!(search.next(), Err(Error::Bus(SimFault))));
        assert_eq!(search.last_discrepancy, 64);

        // Once the fault clears, the same pass can be retried.
        search.master.fail_after = None;
        assert_eq!(search.next().unwrap(), u64::from_le_bytes(b));
    }
}
