//! Address matcher.
//!
//! Decodes each entry's covered byte interval and finds the highest-priority
//! entry that fully contains a transaction. Decoding modes:
//! - **NA4**: `[pmpaddr << 2, (pmpaddr << 2) + 4)`.
//! - **NAPOT**: trailing ones of `pmpaddr` give `k`; the region is `2^(k+3)`
//!   bytes at `(pmpaddr << 2)` with the low `k+3` bits cleared.
//! - **TOR**: `[prior_boundary, pmpaddr << 2)`, where the prior boundary is the
//!   upper bound of the entry before it (0 for entry 0).
//!
//! An access that only partly overlaps an entry does not match that entry.
//! Everything here is a pure function of the table snapshot.

use tracing::trace;

use super::entry::{AddrMatch, PmpEntry};
use super::table::EntryTable;
use crate::common::constants::{ADDR_SHIFT, NA4_SIZE, NAPOT_MIN_SIZE};
use crate::common::error::MalformedRange;

/// Half-open byte interval `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    /// First byte covered.
    pub start: u64,
    /// One past the last byte covered.
    pub end: u64,
}

impl Region {
    /// Creates a region from its bounds.
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Returns true if the region covers no bytes (a TOR pair with `lo >= hi`).
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of bytes covered.
    pub const fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if `[start, end)` lies entirely inside the region.
    #[inline(always)]
    pub const fn contains(&self, start: u64, end: u64) -> bool {
        !self.is_empty() && start >= self.start && end <= self.end
    }
}

/// Encodes a naturally aligned power-of-two region as a `pmpaddr` value.
///
/// Mirrors what the configuration side writes: `(base + size/2 - 1) >> 2`.
///
/// # Errors
///
/// Fails if `size` is not a power of two, is below 8 bytes, if `base` is not
/// aligned to `size`, or if the encoding does not fit `addr_bits`.
pub fn napot_encode(base: u64, size: u64, addr_bits: u32) -> Result<u64, MalformedRange> {
    if !size.is_power_of_two() {
        return Err(MalformedRange::NotPowerOfTwo(size));
    }
    if size < NAPOT_MIN_SIZE {
        return Err(MalformedRange::TooSmall {
            size,
            min: NAPOT_MIN_SIZE,
        });
    }
    if base & (size - 1) != 0 {
        return Err(MalformedRange::Misaligned { base, align: size });
    }
    // base is size-aligned, so the OR cannot carry and matches the additive form.
    let value = (base >> ADDR_SHIFT) | ((size >> 3) - 1);
    if value >> addr_bits != 0 {
        return Err(MalformedRange::FieldOverflow {
            value,
            bits: addr_bits,
        });
    }
    Ok(value)
}

/// Decodes a NAPOT `pmpaddr` value into its region.
///
/// An all-ones field covers the whole `2^(addr_bits + 3)` byte space.
#[inline]
pub const fn napot_decode(base_bits: u64, addr_bits: u32) -> Region {
    let mut k = (!base_bits).trailing_zeros();
    if k > addr_bits {
        k = addr_bits;
    }
    let size = 1u64 << (k + 3);
    let start = (base_bits << ADDR_SHIFT) & !(size - 1);
    Region::new(start, start + size)
}

/// Decodes an NA4 `pmpaddr` value into its 4-byte region.
#[inline]
pub const fn na4_decode(base_bits: u64) -> Region {
    let start = base_bits << ADDR_SHIFT;
    Region::new(start, start + NA4_SIZE)
}

/// Iterator over `(index, entry, region)` for a whole table, in priority order.
///
/// `region` is `None` for `Off` entries. The TOR lower bound is threaded
/// through from each entry to the next, so the table is decoded as a unit.
#[derive(Debug, Clone)]
pub struct Regions<'a> {
    entries: &'a [PmpEntry],
    addr_bits: u32,
    index: usize,
    prior: u64,
}

impl<'a> Iterator for Regions<'a> {
    type Item = (usize, &'a PmpEntry, Option<Region>);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.get(self.index)?;
        let index = self.index;
        self.index += 1;

        let region = match entry.mode {
            AddrMatch::Off => {
                self.prior = entry.base_bits << ADDR_SHIFT;
                None
            }
            AddrMatch::Tor => {
                let region = Region::new(self.prior, entry.base_bits << ADDR_SHIFT);
                self.prior = region.end;
                Some(region)
            }
            AddrMatch::Na4 => {
                let region = na4_decode(entry.base_bits);
                self.prior = region.end;
                Some(region)
            }
            AddrMatch::Napot => {
                let region = napot_decode(entry.base_bits, self.addr_bits);
                self.prior = region.end;
                Some(region)
            }
        };
        Some((index, entry, region))
    }
}

/// Decodes every entry of `entries` in priority order.
pub const fn regions(entries: &[PmpEntry], addr_bits: u32) -> Regions<'_> {
    Regions {
        entries,
        addr_bits,
        index: 0,
        prior: 0,
    }
}

/// Converts `(address, length)` into the exclusive end of the access.
///
/// # Errors
///
/// Zero-length accesses and accesses that wrap the address space are malformed.
pub const fn access_end(address: u64, length: u64) -> Result<u64, MalformedRange> {
    if length == 0 {
        return Err(MalformedRange::ZeroLength { address });
    }
    match address.checked_add(length) {
        Some(end) => Ok(end),
        None => Err(MalformedRange::Overflow { address, length }),
    }
}

/// Outcome of matching one access against the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchResult {
    /// Lowest-index entry whose region fully contains the access.
    Matched(usize),
    /// No entry contains the access.
    NoMatch,
    /// The access range itself is invalid.
    Malformed(MalformedRange),
}

impl MatchResult {
    /// Returns the matched index, if any.
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Matched(index) => Some(index),
            _ => None,
        }
    }
}

/// Finds the first entry whose region fully contains `[address, address + length)`.
pub fn match_range(table: &EntryTable, address: u64, length: u64) -> MatchResult {
    let end = match access_end(address, length) {
        Ok(end) => end,
        Err(malformed) => return MatchResult::Malformed(malformed),
    };

    for (index, entry, region) in regions(table.entries(), table.addr_bits()) {
        let Some(region) = region else {
            continue;
        };
        if region.contains(address, end) {
            trace!(index, mode = %entry.mode, start = region.start, end = region.end, "entry contains access");
            return MatchResult::Matched(index);
        }
        trace!(index, mode = %entry.mode, start = region.start, end = region.end, "entry skipped");
    }
    MatchResult::NoMatch
}
