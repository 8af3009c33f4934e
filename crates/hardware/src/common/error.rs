//! Error and Response Code definitions.
//!
//! This module defines every failure the protection core can report. It provides:
//! 1. **Configuration Errors:** Writes the entry table refuses (locked, out of range, malformed).
//! 2. **Malformed Ranges:** Region descriptions or transactions that cannot be decoded exactly.
//! 3. **Bus Responses:** Error codes returned upstream in place of data.
//! 4. **Gate Errors:** Misuse of the gate state machine by the transport side.
//! 5. **Setup Errors:** Invalid table geometry or initial programming in the configuration.
//!
//! None of these are fatal. A configuration error means the write was ignored;
//! a malformed transaction is denied.

use thiserror::Error;

/// Reason a region description or transaction range cannot be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MalformedRange {
    /// Transaction touches no bytes.
    #[error("zero-length access at {address:#x}")]
    ZeroLength {
        /// Start address of the access.
        address: u64,
    },

    /// `address + length` does not fit in the 64-bit address space.
    #[error("access at {address:#x} of {length:#x} bytes wraps the address space")]
    Overflow {
        /// Start address of the access.
        address: u64,
        /// Length of the access in bytes.
        length: u64,
    },

    /// NAPOT region size is not a power of two.
    #[error("NAPOT size {0:#x} is not a power of two")]
    NotPowerOfTwo(u64),

    /// NAPOT region size is below the smallest encodable region.
    #[error("NAPOT size {size:#x} is below the minimum of {min:#x}")]
    TooSmall {
        /// Requested size.
        size: u64,
        /// Smallest size the encoding can express.
        min: u64,
    },

    /// Region base is not aligned to its size or granule.
    #[error("base {base:#x} is not aligned to {align:#x}")]
    Misaligned {
        /// Requested base address.
        base: u64,
        /// Required alignment.
        align: u64,
    },

    /// Encoded value does not fit the `pmpaddr` field.
    #[error("value {value:#x} does not fit a {bits}-bit pmpaddr field")]
    FieldOverflow {
        /// Field value that was being written.
        value: u64,
        /// Width of the field in bits.
        bits: u32,
    },

    /// Write whose declared length disagrees with its payload.
    #[error("write of {length:#x} bytes carries a {payload:#x}-byte payload")]
    PayloadMismatch {
        /// Declared length.
        length: u64,
        /// Bytes actually carried.
        payload: u64,
    },
}

/// Configuration write refused by the entry table.
///
/// The table is left exactly as it was before the write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Target entry is locked, directly or through the TOR entry above it.
    #[error("entry {index} is locked (lock held by entry {locked_by})")]
    LockedEntryViolation {
        /// Entry the write was aimed at.
        index: usize,
        /// Entry whose lock bit blocks the write.
        locked_by: usize,
    },

    /// Index past the end of the table.
    #[error("entry index {index} out of range for a table of {len} entries")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of entries in the table.
        len: usize,
    },

    /// Region description could not be encoded.
    #[error("malformed region: {0}")]
    MalformedRange(#[from] MalformedRange),
}

/// Error response returned upstream in place of data or a write acknowledgement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ResponseError {
    /// Rejected by the protection unit. The only code the gate fabricates.
    #[error("access denied")]
    AccessDenied,

    /// No downstream target claims the address.
    #[error("decode error")]
    DecodeError,

    /// Downstream target claimed the address but could not complete the access.
    #[error("slave error")]
    SlaveError,
}

/// Gate state machine used out of order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GateError {
    /// A transaction is already in flight.
    #[error("gate busy: a transaction is already in flight")]
    Busy,

    /// `check` called without an accepted transaction.
    #[error("no transaction awaiting a decision")]
    NotChecking,

    /// `complete` called before a decision was made.
    #[error("no decided transaction to complete")]
    NothingToComplete,
}

/// Failure to build the protection unit or its surroundings from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Table size outside the supported range.
    #[error("entry count {count} must be between 1 and {max}")]
    InvalidEntryCount {
        /// Requested number of entries.
        count: usize,
        /// Largest supported table.
        max: usize,
    },

    /// Address field width outside the supported range.
    #[error("pmpaddr width {bits} must be between 1 and {max} bits")]
    InvalidAddrBits {
        /// Requested width.
        bits: u32,
        /// Widest supported field.
        max: u32,
    },

    /// An initial entry in the configuration was refused.
    #[error("initial entry {index}: {source}")]
    Entry {
        /// Index of the refused entry.
        index: usize,
        /// Why the table refused it.
        #[source]
        source: ConfigError,
    },

    /// An initial entry names a region with missing or conflicting fields.
    #[error("initial entry {index}: {reason}")]
    EntryShape {
        /// Index of the entry.
        index: usize,
        /// What is missing.
        reason: &'static str,
    },

    /// RAM window does not fit the 64-bit address space.
    #[error("RAM at {base:#x} of {size:#x} bytes wraps the address space")]
    RamOverflow {
        /// Base address.
        base: u64,
        /// Size in bytes.
        size: u64,
    },

    /// Malformed JSON.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}
