//! ROM command bytes, written as the first byte after a bus reset.

/// Begin the binary-tree enumeration of all slave ROMs.
pub const SEARCH_ROM: u8 = 0xF0;

/// Read the ROM of the only device on the bus.
pub const READ_ROM: u8 = 0x33;

/// Address one device by its ROM; all others stay silent until the next
/// reset.
pub const MATCH_ROM: u8 = 0x55;

/// Address every device on the bus at once.
pub const SKIP_ROM: u8 = 0xCC;

/// Enumerate only devices with a pending alarm condition.
pub const ALARM_SEARCH: u8 = 0xEC;
