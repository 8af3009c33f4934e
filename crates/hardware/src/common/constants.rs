//! Register Layout and Sizing Constants.
//!
//! This module defines the fixed numbers of the protection unit. It includes:
//! 1. **Table Limits:** Default and maximum number of protection entries.
//! 2. **Address Field:** Width of the `pmpaddr` field and the shift between it and byte addresses.
//! 3. **Granules:** Sizes of the NA4 granule and the smallest NAPOT region.
//! 4. **Config Byte:** Bit positions of the packed `pmpcfg` byte.

/// Default number of entries in the protection table.
pub const DEFAULT_ENTRY_COUNT: usize = 16;

/// Largest table the model accepts (the RISC-V maximum).
pub const MAX_ENTRY_COUNT: usize = 64;

/// Default width of the `pmpaddr` field in bits (`PMP_LEN` of the AXI IO-PMP).
pub const DEFAULT_ADDR_BITS: u32 = 54;

/// Widest `pmpaddr` field accepted.
///
/// An all-ones NAPOT field of this width covers `2^(60 + 3)` bytes, the
/// largest power of two representable as a `u64` byte count.
pub const MAX_ADDR_BITS: u32 = 60;

/// Shift between a `pmpaddr` value and a byte address.
pub const ADDR_SHIFT: u32 = 2;

/// Size of an NA4 region in bytes.
pub const NA4_SIZE: u64 = 4;

/// Smallest NAPOT region in bytes.
pub const NAPOT_MIN_SIZE: u64 = 8;

/// Read permission bit of the packed config byte.
pub const CFG_R: u8 = 1 << 0;

/// Write permission bit of the packed config byte.
pub const CFG_W: u8 = 1 << 1;

/// Execute permission bit of the packed config byte.
pub const CFG_X: u8 = 1 << 2;

/// Shift of the two-bit address-matching field.
pub const CFG_A_SHIFT: u8 = 3;

/// Mask of the address-matching field after shifting.
pub const CFG_A_MASK: u8 = 0x3;

/// Lock bit of the packed config byte.
pub const CFG_L: u8 = 1 << 7;

/// Bits 6:5 are reserved and read back as zero.
pub const CFG_RESERVED_MASK: u8 = 0x60;
