//! Downstream interface traits.
//!
//! This module defines the two seams on the target side of the gate. It provides:
//! 1. **Downstream:** What the gate forwards admitted transactions to.
//! 2. **Device:** A memory-mapped target attached to the bus behind the gate.
//!
//! Devices work with device-relative offsets; the bus translates absolute
//! addresses and rejects accesses no device claims.

use crate::common::error::ResponseError;
use crate::gate::{Response, Transaction};

/// Target side of the gate.
///
/// Receives only transactions the protection unit admitted, unchanged.
pub trait Downstream {
    /// Performs `txn` and returns the target's response.
    fn issue(&mut self, txn: &Transaction) -> Response;
}

/// Memory-mapped target attached to the system bus.
pub trait Device: Send + Sync {
    /// Returns a short name for this device (e.g., `"RAM"`).
    fn name(&self) -> &str;
    /// Returns (base_address, size_in_bytes) for this device's region.
    fn address_range(&self) -> (u64, u64);
    /// Reads `length` bytes at the device-relative `offset`.
    ///
    /// # Errors
    ///
    /// [`ResponseError::SlaveError`] if the device cannot serve the access.
    fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>, ResponseError>;
    /// Writes `data` at the device-relative `offset`.
    ///
    /// # Errors
    ///
    /// [`ResponseError::SlaveError`] if the device cannot serve the access.
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), ResponseError>;
}
