//! Shared protection unit handle.
//!
//! `IoPmp` wraps the entry table in a reader/writer lock so that any number of
//! gates can decide transactions concurrently while configuration writes are
//! exclusive. Each decision holds the read lock from the first match attempt
//! to the final permission check, so it sees one consistent snapshot.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::entry::{Permissions, PmpEntry, RegionSpec};
use super::permission::{DefaultPolicy, Verdict, evaluate};
use super::table::EntryTable;
use crate::common::AccessKind;
use crate::common::error::ConfigError;

/// Cloneable handle to one protection table plus its default policy.
#[derive(Clone, Debug)]
pub struct IoPmp {
    table: Arc<RwLock<EntryTable>>,
    default_policy: DefaultPolicy,
}

impl Default for IoPmp {
    fn default() -> Self {
        Self::new(EntryTable::default(), DefaultPolicy::Deny)
    }
}

impl IoPmp {
    /// Wraps `table` with the given policy for unmatched accesses.
    pub fn new(table: EntryTable, default_policy: DefaultPolicy) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
            default_policy,
        }
    }

    /// Policy applied when no entry matches.
    pub const fn default_policy(&self) -> DefaultPolicy {
        self.default_policy
    }

    // Writes replace whole fields; a poisoned table is still consistent.
    fn read_table(&self) -> RwLockReadGuard<'_, EntryTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_table(&self) -> RwLockWriteGuard<'_, EntryTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decides one access against the current table.
    pub fn decide(&self, address: u64, length: u64, access: AccessKind) -> Verdict {
        let table = self.read_table();
        evaluate(&table, address, length, access, self.default_policy)
    }

    /// Copies the current table.
    pub fn snapshot(&self) -> EntryTable {
        self.read_table().clone()
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    /// Always false; a table has at least one entry.
    pub fn is_empty(&self) -> bool {
        self.read_table().is_empty()
    }

    /// Returns entry `index` verbatim.
    pub fn read(&self, index: usize) -> PmpEntry {
        self.read_table().read(index)
    }

    /// Replaces entry `index`. See [`EntryTable::configure`].
    ///
    /// # Errors
    ///
    /// The table refused the write; nothing changed.
    pub fn configure(&self, index: usize, entry: PmpEntry) -> Result<(), ConfigError> {
        self.write_table().configure(index, entry)
    }

    /// Encodes and writes a region. See [`EntryTable::configure_region`].
    ///
    /// # Errors
    ///
    /// The region is malformed or the table refused the write; nothing changed.
    pub fn configure_region(
        &self,
        index: usize,
        spec: RegionSpec,
        permissions: Permissions,
        locked: bool,
    ) -> Result<(), ConfigError> {
        self.write_table().configure_region(index, spec, permissions, locked)
    }

    /// Writes the packed config byte of entry `index`.
    ///
    /// # Errors
    ///
    /// The register is locked or absent; nothing changed.
    pub fn write_cfg(&self, index: usize, cfg: u8) -> Result<(), ConfigError> {
        self.write_table().write_cfg(index, cfg)
    }

    /// Writes the address register of entry `index`.
    ///
    /// # Errors
    ///
    /// The register is locked or absent; nothing changed.
    pub fn write_addr(&self, index: usize, addr: u64) -> Result<(), ConfigError> {
        self.write_table().write_addr(index, addr)
    }

    /// Reads the packed config byte of entry `index`.
    pub fn read_cfg(&self, index: usize) -> u8 {
        self.read_table().read_cfg(index)
    }

    /// Reads the address register of entry `index`.
    pub fn read_addr(&self, index: usize) -> u64 {
        self.read_table().read_addr(index)
    }

    /// Resets every entry, clearing locks.
    pub fn reset(&self) {
        self.write_table().reset();
    }
}
