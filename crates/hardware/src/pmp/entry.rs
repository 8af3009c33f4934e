//! Protection entry descriptor.
//!
//! An entry is a tagged structure: an enumerated address-matching mode, the
//! raw `pmpaddr` field, named permission flags, and the lock bit. The packed
//! `pmpcfg` byte only exists at the register interface and is converted to
//! and from this form at once.
//!
//! Packed layout (as programmed by the IO-PMP testbench):
//! `L(7) | reserved(6:5) | A(4:3) | X(2) | W(1) | R(0)`.

use serde::Deserialize;
use std::fmt;

use crate::common::AccessKind;
use crate::common::constants::{CFG_A_MASK, CFG_A_SHIFT, CFG_L, CFG_R, CFG_W, CFG_X, NA4_SIZE};
use crate::common::error::MalformedRange;

/// Address-matching mode (the A field of pmpcfg).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AddrMatch {
    /// Disabled; the entry never matches.
    #[default]
    #[serde(alias = "Off", alias = "off")]
    Off = 0,
    /// Top of Range: `[prior_boundary, pmpaddr << 2)`.
    #[serde(alias = "Tor", alias = "tor")]
    Tor = 1,
    /// Naturally aligned 4-byte region.
    #[serde(alias = "Na4", alias = "na4")]
    Na4 = 2,
    /// Naturally aligned power-of-two region of at least 8 bytes.
    #[serde(alias = "Napot", alias = "napot")]
    Napot = 3,
}

impl AddrMatch {
    /// Decodes the 2-bit A field.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & CFG_A_MASK {
            0 => Self::Off,
            1 => Self::Tor,
            2 => Self::Na4,
            _ => Self::Napot,
        }
    }

    /// Returns the 2-bit A field value.
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AddrMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "OFF",
            Self::Tor => "TOR",
            Self::Na4 => "NA4",
            Self::Napot => "NAPOT",
        };
        f.pad(name)
    }
}

/// Set of access kinds an entry grants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct Permissions {
    /// R bit.
    #[serde(default)]
    pub read: bool,
    /// W bit.
    #[serde(default)]
    pub write: bool,
    /// X bit.
    #[serde(default)]
    pub execute: bool,
}

impl Permissions {
    /// Grants nothing.
    pub const NONE: Self = Self::new(false, false, false);
    /// Read only.
    pub const R: Self = Self::new(true, false, false);
    /// Read and write.
    pub const RW: Self = Self::new(true, true, false);
    /// Read and execute.
    pub const RX: Self = Self::new(true, false, true);
    /// Everything.
    pub const RWX: Self = Self::new(true, true, true);

    /// Builds a permission set from individual flags.
    pub const fn new(read: bool, write: bool, execute: bool) -> Self {
        Self {
            read,
            write,
            execute,
        }
    }

    /// Returns true if `access` is in the set.
    #[inline]
    pub const fn allows(self, access: AccessKind) -> bool {
        match access {
            AccessKind::Read => self.read,
            AccessKind::Write => self.write,
            AccessKind::Execute => self.execute,
        }
    }

    /// Returns true if no access is granted.
    pub const fn is_empty(self) -> bool {
        !(self.read || self.write || self.execute)
    }

    /// Decodes the XWR bits of a packed config byte.
    pub const fn from_bits(cfg: u8) -> Self {
        Self::new(cfg & CFG_R != 0, cfg & CFG_W != 0, cfg & CFG_X != 0)
    }

    /// Packs the set into the XWR bits of a config byte.
    pub const fn bits(self) -> u8 {
        (self.read as u8) * CFG_R | (self.write as u8) * CFG_W | (self.execute as u8) * CFG_X
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.read { 'r' } else { '-' };
        let w = if self.write { 'w' } else { '-' };
        let x = if self.execute { 'x' } else { '-' };
        write!(f, "{r}{w}{x}")
    }
}

/// One protection-region descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PmpEntry {
    /// Address-matching mode.
    pub mode: AddrMatch,
    /// Raw `pmpaddr` field (byte address >> 2, NAPOT size folded into the low bits).
    pub base_bits: u64,
    /// Granted access kinds.
    pub permissions: Permissions,
    /// Lock bit. Cleared only by reset.
    pub locked: bool,
}

impl PmpEntry {
    /// Builds an entry from its fields.
    pub const fn new(mode: AddrMatch, base_bits: u64, permissions: Permissions, locked: bool) -> Self {
        Self {
            mode,
            base_bits,
            permissions,
            locked,
        }
    }

    /// Builds an entry from a packed config byte and an address register value.
    ///
    /// Reserved bits are dropped.
    pub const fn from_registers(cfg: u8, addr: u64) -> Self {
        Self {
            mode: AddrMatch::from_bits(cfg >> CFG_A_SHIFT),
            base_bits: addr,
            permissions: Permissions::from_bits(cfg),
            locked: cfg & CFG_L != 0,
        }
    }

    /// Returns the packed config byte for this entry.
    pub const fn cfg_byte(&self) -> u8 {
        (self.locked as u8) * CFG_L | self.mode.bits() << CFG_A_SHIFT | self.permissions.bits()
    }

    /// Returns true unless the entry is `Off`.
    pub fn is_active(&self) -> bool {
        self.mode != AddrMatch::Off
    }
}

/// Byte-level description of a region, as handed over by the configuration side.
///
/// Encoding into `(mode, base_bits)` happens in [`RegionSpec::encode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionSpec {
    /// Disabled entry with a zero address field.
    Off,
    /// Top of range; the lower bound comes from the entry before it.
    Tor {
        /// Exclusive upper bound in bytes. Must be 4-byte aligned.
        top: u64,
    },
    /// Four bytes at `base`.
    Na4 {
        /// Start address. Must be 4-byte aligned.
        base: u64,
    },
    /// `size` bytes at `base`.
    Napot {
        /// Start address. Must be aligned to `size`.
        base: u64,
        /// Region size; a power of two of at least 8.
        size: u64,
    },
}

impl RegionSpec {
    /// Encodes the region for a `pmpaddr` field of `addr_bits` bits.
    ///
    /// # Errors
    ///
    /// Returns a [`MalformedRange`] if the region cannot be represented exactly.
    pub fn encode(self, addr_bits: u32) -> Result<(AddrMatch, u64), MalformedRange> {
        match self {
            Self::Off => Ok((AddrMatch::Off, 0)),
            Self::Tor { top } => {
                let bits = word_address(top, addr_bits)?;
                Ok((AddrMatch::Tor, bits))
            }
            Self::Na4 { base } => {
                let bits = word_address(base, addr_bits)?;
                Ok((AddrMatch::Na4, bits))
            }
            Self::Napot { base, size } => {
                let bits = super::matcher::napot_encode(base, size, addr_bits)?;
                Ok((AddrMatch::Napot, bits))
            }
        }
    }
}

/// Converts a 4-byte aligned byte address into a `pmpaddr` value.
fn word_address(address: u64, addr_bits: u32) -> Result<u64, MalformedRange> {
    if address % NA4_SIZE != 0 {
        return Err(MalformedRange::Misaligned {
            base: address,
            align: NA4_SIZE,
        });
    }
    let value = address >> 2;
    if value >> addr_bits != 0 {
        return Err(MalformedRange::FieldOverflow {
            value,
            bits: addr_bits,
        });
    }
    Ok(value)
}
