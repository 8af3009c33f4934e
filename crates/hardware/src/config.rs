//! Configuration system for the IO-PMP model.
//!
//! This module defines the configuration structures used to build a protection
//! unit and the memory behind it. It provides:
//! 1. **Defaults:** Baseline hardware constants (table size, field width, RAM window).
//! 2. **Structures:** `pmp` (table geometry, default policy, initial entries) and `bus`.
//! 3. **Builders:** Turning a validated configuration into an `IoPmp` and a `Bus`.
//!
//! Configuration is supplied as JSON, or use `Config::default()`.

use serde::Deserialize;

use crate::common::constants::{DEFAULT_ADDR_BITS, DEFAULT_ENTRY_COUNT};
use crate::common::error::SetupError;
use crate::pmp::{AddrMatch, DefaultPolicy, EntryTable, IoPmp, Permissions, RegionSpec};
use crate::soc::{Bus, Ram};

/// Default configuration constants.
mod defaults {
    /// Base address of the RAM behind the gate.
    pub const RAM_BASE: u64 = 0x0000_0000;

    /// Size of the RAM behind the gate (64 KiB, as in the AXI testbench).
    pub const RAM_SIZE: usize = 64 * 1024;
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use iopmp_core::config::Config;
/// use iopmp_core::common::AccessKind;
///
/// let json = r#"{
///     "pmp": {
///         "entry_count": 4,
///         "entries": [
///             { "index": 0, "mode": "NAPOT", "base": 0, "size": 32,
///               "read": true, "write": true, "execute": true }
///         ]
///     }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// let pmp = config.build_pmp().unwrap();
/// assert!(pmp.decide(0x0, 1, AccessKind::Read).decision.is_allowed());
/// assert!(!pmp.decide(0x40, 1, AccessKind::Read).decision.is_allowed());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Protection table configuration
    #[serde(default)]
    pub pmp: PmpConfig,
    /// Downstream memory configuration
    #[serde(default)]
    pub bus: BusConfig,
}

impl Config {
    /// Parses a configuration from JSON.
    ///
    /// # Arguments
    ///
    /// * `text` - JSON document; omitted sections fall back to their defaults.
    ///
    /// # Errors
    ///
    /// [`SetupError::Json`] if the text is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds the protection unit: geometry, default policy, then initial entries in order.
    ///
    /// Entries are programmed one by one, so a locked entry early in the list
    /// refuses later entries that target it.
    ///
    /// # Returns
    ///
    /// A fresh [`IoPmp`] handle; clone it to share the table between gates.
    ///
    /// # Errors
    ///
    /// Invalid geometry, or an initial entry the table refuses.
    pub fn build_pmp(&self) -> Result<IoPmp, SetupError> {
        let mut table = EntryTable::new(self.pmp.entry_count, self.pmp.addr_bits)?;
        for entry in &self.pmp.entries {
            let spec = entry.region_spec()?;
            table
                .configure_region(entry.index, spec, entry.permissions(), entry.locked)
                .map_err(|source| SetupError::Entry {
                    index: entry.index,
                    source,
                })?;
        }
        Ok(IoPmp::new(table, self.pmp.default_policy))
    }

    /// Builds the downstream bus with its RAM device.
    ///
    /// # Returns
    ///
    /// A bus holding one zero-filled RAM at `bus.ram_base`.
    ///
    /// # Errors
    ///
    /// [`SetupError::RamOverflow`] if the RAM window wraps the address space.
    pub fn build_bus(&self) -> Result<Bus, SetupError> {
        let size = self.bus.ram_size as u64;
        if self.bus.ram_base.checked_add(size).is_none() {
            return Err(SetupError::RamOverflow {
                base: self.bus.ram_base,
                size,
            });
        }
        let mut bus = Bus::new();
        bus.add_device(Box::new(Ram::new(self.bus.ram_base, self.bus.ram_size)));
        Ok(bus)
    }
}

/// Protection table configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PmpConfig {
    /// Number of entries
    #[serde(default = "PmpConfig::default_entry_count")]
    pub entry_count: usize,

    /// Width of the pmpaddr field in bits
    #[serde(default = "PmpConfig::default_addr_bits")]
    pub addr_bits: u32,

    /// Outcome for accesses no entry covers
    #[serde(default)]
    pub default_policy: DefaultPolicy,

    /// Entries programmed at build time, in order
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

impl PmpConfig {
    /// Returns the default number of table entries.
    const fn default_entry_count() -> usize {
        DEFAULT_ENTRY_COUNT
    }

    /// Returns the default pmpaddr width.
    const fn default_addr_bits() -> u32 {
        DEFAULT_ADDR_BITS
    }
}

impl Default for PmpConfig {
    fn default() -> Self {
        Self {
            entry_count: DEFAULT_ENTRY_COUNT,
            addr_bits: DEFAULT_ADDR_BITS,
            default_policy: DefaultPolicy::Deny,
            entries: Vec::new(),
        }
    }
}

/// One initially programmed entry, described at byte level.
///
/// `base` and `size` describe NAPOT and NA4 regions; `bound` is the TOR top.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryConfig {
    /// Table index
    pub index: usize,
    /// Address-matching mode
    pub mode: AddrMatch,
    /// Region base (NAPOT, NA4)
    #[serde(default)]
    pub base: Option<u64>,
    /// Region size (NAPOT)
    #[serde(default)]
    pub size: Option<u64>,
    /// Exclusive upper bound (TOR)
    #[serde(default)]
    pub bound: Option<u64>,
    /// R permission
    #[serde(default)]
    pub read: bool,
    /// W permission
    #[serde(default)]
    pub write: bool,
    /// X permission
    #[serde(default)]
    pub execute: bool,
    /// Lock bit
    #[serde(default)]
    pub locked: bool,
}

impl EntryConfig {
    /// Returns the permission set this entry grants.
    pub const fn permissions(&self) -> Permissions {
        Permissions::new(self.read, self.write, self.execute)
    }

    /// Turns the byte-level fields into a region description.
    ///
    /// # Errors
    ///
    /// [`SetupError::EntryShape`] if a field the mode needs is missing.
    pub fn region_spec(&self) -> Result<RegionSpec, SetupError> {
        let missing = |reason| SetupError::EntryShape {
            index: self.index,
            reason,
        };
        match self.mode {
            AddrMatch::Off => Ok(RegionSpec::Off),
            AddrMatch::Tor => {
                let top = self.bound.ok_or_else(|| missing("TOR entries need `bound`"))?;
                Ok(RegionSpec::Tor { top })
            }
            AddrMatch::Na4 => {
                let base = self.base.ok_or_else(|| missing("NA4 entries need `base`"))?;
                Ok(RegionSpec::Na4 { base })
            }
            AddrMatch::Napot => {
                let base = self.base.ok_or_else(|| missing("NAPOT entries need `base`"))?;
                let size = self.size.ok_or_else(|| missing("NAPOT entries need `size`"))?;
                Ok(RegionSpec::Napot { base, size })
            }
        }
    }
}

/// Downstream memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// RAM base address
    #[serde(default = "BusConfig::default_ram_base")]
    pub ram_base: u64,

    /// RAM size in bytes
    #[serde(default = "BusConfig::default_ram_size")]
    pub ram_size: usize,
}

impl BusConfig {
    /// Returns the default RAM base address.
    const fn default_ram_base() -> u64 {
        defaults::RAM_BASE
    }

    /// Returns the default RAM size in bytes.
    const fn default_ram_size() -> usize {
        defaults::RAM_SIZE
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            ram_base: defaults::RAM_BASE,
            ram_size: defaults::RAM_SIZE,
        }
    }
}
