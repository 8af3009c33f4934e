//! RAM target.
//!
//! Byte-addressable memory mapped at a fixed base, standing in for the
//! protected downstream memory. Accesses that run off the end of the
//! array are answered with a slave error.

use super::traits::Device;
use crate::common::error::ResponseError;

/// Flat RAM device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ram {
    bytes: Vec<u8>,
    base_addr: u64,
}

impl Ram {
    /// Creates `size` zeroed bytes mapped at `base_addr`.
    pub fn new(base_addr: u64, size: usize) -> Self {
        Self {
            bytes: vec![0; size],
            base_addr,
        }
    }

    /// Loads a byte slice at a device-relative offset, bypassing the bus.
    ///
    /// Used to seed memory contents before a run. Out-of-range loads are dropped.
    pub fn load(&mut self, data: &[u8], offset: usize) {
        if let Some(dest) = offset
            .checked_add(data.len())
            .and_then(|end| self.bytes.get_mut(offset..end))
        {
            dest.copy_from_slice(data);
        }
    }

    /// Returns the raw contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    fn span(&self, offset: u64, length: u64) -> Result<std::ops::Range<usize>, ResponseError> {
        let start = usize::try_from(offset).map_err(|_| ResponseError::SlaveError)?;
        let len = usize::try_from(length).map_err(|_| ResponseError::SlaveError)?;
        let end = start.checked_add(len).ok_or(ResponseError::SlaveError)?;
        if end > self.bytes.len() {
            return Err(ResponseError::SlaveError);
        }
        Ok(start..end)
    }
}

impl Device for Ram {
    fn name(&self) -> &str {
        "RAM"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, self.bytes.len() as u64)
    }

    fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>, ResponseError> {
        let span = self.span(offset, length)?;
        Ok(self.bytes[span].to_vec())
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<(), ResponseError> {
        let span = self.span(offset, data.len() as u64)?;
        self.bytes[span].copy_from_slice(data);
        Ok(())
    }
}
