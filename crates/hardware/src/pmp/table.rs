//! Protection entry table.
//!
//! Holds the fixed-length, priority-ordered list of entries and enforces the
//! lock rules on every configuration write:
//! - A locked entry ignores all writes until reset.
//! - A locked TOR entry also freezes the entry before it, since that entry's
//!   mode and address together supply the TOR lower bound.
//!
//! Two write paths exist. `configure` and `configure_region` replace an entry
//! as a unit. `write_cfg` and `write_addr` model the packed register interface.
//! Both paths obey the same lock rules.

use tracing::{info, warn};

use super::entry::{AddrMatch, Permissions, PmpEntry, RegionSpec};
use super::matcher::{Region, regions};
use crate::common::constants::{DEFAULT_ADDR_BITS, DEFAULT_ENTRY_COUNT, MAX_ADDR_BITS, MAX_ENTRY_COUNT};
use crate::common::error::{ConfigError, MalformedRange, SetupError};

/// Ordered, fixed-capacity collection of protection entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryTable {
    entries: Vec<PmpEntry>,
    addr_bits: u32,
}

impl Default for EntryTable {
    fn default() -> Self {
        Self {
            entries: vec![PmpEntry::default(); DEFAULT_ENTRY_COUNT],
            addr_bits: DEFAULT_ADDR_BITS,
        }
    }
}

impl EntryTable {
    /// Creates a table of `entry_count` reset entries with an `addr_bits`-wide address field.
    ///
    /// # Errors
    ///
    /// Fails if `entry_count` is outside `1..=64` or `addr_bits` outside `1..=60`.
    pub fn new(entry_count: usize, addr_bits: u32) -> Result<Self, SetupError> {
        if entry_count == 0 || entry_count > MAX_ENTRY_COUNT {
            return Err(SetupError::InvalidEntryCount {
                count: entry_count,
                max: MAX_ENTRY_COUNT,
            });
        }
        if addr_bits == 0 || addr_bits > MAX_ADDR_BITS {
            return Err(SetupError::InvalidAddrBits {
                bits: addr_bits,
                max: MAX_ADDR_BITS,
            });
        }
        Ok(Self {
            entries: vec![PmpEntry::default(); entry_count],
            addr_bits,
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a table has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of the address field in bits.
    pub const fn addr_bits(&self) -> u32 {
        self.addr_bits
    }

    /// All entries in priority order.
    pub fn entries(&self) -> &[PmpEntry] {
        &self.entries
    }

    /// Returns entry `index` verbatim; indices past the table read as a reset entry.
    pub fn read(&self, index: usize) -> PmpEntry {
        self.entries.get(index).copied().unwrap_or_default()
    }

    /// Returns the decoded region of entry `index`, or `None` if it is off or absent.
    pub fn region(&self, index: usize) -> Option<Region> {
        regions(&self.entries, self.addr_bits)
            .nth(index)
            .and_then(|(_, _, region)| region)
    }

    /// Restores every entry to `{Off, 0, none, unlocked}`.
    pub fn reset(&mut self) {
        self.entries.fill(PmpEntry::default());
        info!(entries = self.entries.len(), "protection table reset");
    }

    /// Returns the index of the entry whose lock blocks a full write to `index`.
    ///
    /// This is `index` itself if it is locked, or `index + 1` if that entry is
    /// a locked TOR entry.
    pub fn lock_holder(&self, index: usize) -> Option<usize> {
        if self.entries.get(index).is_some_and(|e| e.locked) {
            return Some(index);
        }
        let next = index + 1;
        self.entries
            .get(next)
            .filter(|e| e.locked && e.mode == AddrMatch::Tor)
            .map(|_| next)
    }

    /// Replaces entry `index` as a unit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LockedEntryViolation`] if the entry, or the TOR
    /// entry above it, is locked; [`ConfigError::IndexOutOfRange`] for an index
    /// past the table; [`ConfigError::MalformedRange`] if `base_bits` does not
    /// fit the address field. The table is unchanged on error.
    pub fn configure(&mut self, index: usize, entry: PmpEntry) -> Result<(), ConfigError> {
        self.check_index(index)?;
        if let Some(locked_by) = self.lock_holder(index) {
            return Err(Self::ignored(index, locked_by));
        }
        if entry.base_bits >> self.addr_bits != 0 {
            return Err(MalformedRange::FieldOverflow {
                value: entry.base_bits,
                bits: self.addr_bits,
            }
            .into());
        }
        self.entries[index] = entry;
        Ok(())
    }

    /// Encodes a byte-level region description and writes it to entry `index`.
    ///
    /// # Errors
    ///
    /// As [`EntryTable::configure`], plus [`ConfigError::MalformedRange`] if the
    /// description cannot be encoded exactly.
    pub fn configure_region(
        &mut self,
        index: usize,
        spec: RegionSpec,
        permissions: Permissions,
        locked: bool,
    ) -> Result<(), ConfigError> {
        let (mode, base_bits) = spec.encode(self.addr_bits)?;
        self.configure(index, PmpEntry::new(mode, base_bits, permissions, locked))
    }

    /// Reads the packed config byte of entry `index` (0 past the table).
    pub fn read_cfg(&self, index: usize) -> u8 {
        self.read(index).cfg_byte()
    }

    /// Reads the address register of entry `index` (0 past the table).
    pub fn read_addr(&self, index: usize) -> u64 {
        self.read(index).base_bits
    }

    /// Writes the packed config byte of entry `index`.
    ///
    /// Reserved bits are discarded.
    ///
    /// # Errors
    ///
    /// [`ConfigError::LockedEntryViolation`] if the entry is locked or the next
    /// entry is a locked TOR entry, or [`ConfigError::IndexOutOfRange`];
    /// the register keeps its value.
    pub fn write_cfg(&mut self, index: usize, cfg: u8) -> Result<(), ConfigError> {
        self.check_index(index)?;
        if let Some(locked_by) = self.lock_holder(index) {
            return Err(Self::ignored(index, locked_by));
        }
        let base_bits = self.entries[index].base_bits;
        self.entries[index] = PmpEntry::from_registers(cfg, base_bits);
        Ok(())
    }

    /// Writes the address register of entry `index`.
    ///
    /// Bits above the field width are dropped, as a WARL register would.
    ///
    /// # Errors
    ///
    /// [`ConfigError::LockedEntryViolation`] if the entry is locked or the next
    /// entry is a locked TOR entry, or [`ConfigError::IndexOutOfRange`].
    pub fn write_addr(&mut self, index: usize, addr: u64) -> Result<(), ConfigError> {
        self.check_index(index)?;
        if let Some(locked_by) = self.lock_holder(index) {
            return Err(Self::ignored(index, locked_by));
        }
        self.entries[index].base_bits = addr & self.field_mask();
        Ok(())
    }

    fn field_mask(&self) -> u64 {
        (1u64 << self.addr_bits) - 1
    }

    fn check_index(&self, index: usize) -> Result<(), ConfigError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            let len = self.entries.len();
            warn!(index, len, "configuration write past end of table ignored");
            Err(ConfigError::IndexOutOfRange { index, len })
        }
    }

    fn ignored(index: usize, locked_by: usize) -> ConfigError {
        warn!(index, locked_by, "configuration write to locked entry ignored");
        ConfigError::LockedEntryViolation { index, locked_by }
    }
}
