//! Downstream interconnect (bus) behind the gate.
//!
//! This module implements the bus that routes admitted transactions to devices. It provides:
//! 1. **Device registration:** Devices are added by address range and sorted for lookup.
//! 2. **Access routing:** Transactions are routed by address with a last-device hint.
//! 3. **Decode errors:** Accesses no single device fully claims get `DecodeError`.
//! 4. **Loading:** Seeding memory contents directly, bypassing the protection unit.

use std::fmt;

use tracing::debug;

use super::traits::{Device, Downstream};
use crate::common::AccessKind;
use crate::common::error::ResponseError;
use crate::gate::{Response, Transaction};

/// Bus connecting the gate's master port to its targets.
pub struct Bus {
    /// Registered devices, sorted by base address.
    devices: Vec<Box<dyn Device>>,
    last_device_idx: usize,
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.devices.iter().map(|d| d.name()).collect();
        f.debug_struct("Bus").field("devices", &names).finish()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Creates an empty bus.
    ///
    /// # Returns
    ///
    /// A bus with no devices; add devices with `add_device`.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            last_device_idx: 0,
        }
    }

    /// Registers a device; devices are kept sorted by base address.
    ///
    /// # Arguments
    ///
    /// * `dev` - The device to add; its `address_range` decides what it serves.
    pub fn add_device(&mut self, dev: Box<dyn Device>) {
        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.last_device_idx = 0;
    }

    /// Writes a blob at the given address without going through any gate.
    ///
    /// # Arguments
    ///
    /// * `data` - Bytes to store.
    /// * `addr` - Address of the first byte.
    ///
    /// # Errors
    ///
    /// [`ResponseError::DecodeError`] if no single device holds the whole blob.
    pub fn load_binary_at(&mut self, data: &[u8], addr: u64) -> Result<(), ResponseError> {
        let (dev, offset) = self.find_device(addr, data.len() as u64)?;
        dev.write(offset, data)
    }

    /// Checks whether a range is fully backed by one device.
    ///
    /// # Arguments
    ///
    /// * `addr` - First byte of the range.
    /// * `len` - Range length in bytes.
    ///
    /// # Returns
    ///
    /// `true` if a single device claims all of `[addr, addr + len)`.
    pub fn is_valid_range(&self, addr: u64, len: u64) -> bool {
        self.devices.iter().any(|dev| claims(dev.as_ref(), addr, len))
    }

    fn find_device(&mut self, addr: u64, len: u64) -> Result<(&mut Box<dyn Device>, u64), ResponseError> {
        let hinted = self
            .devices
            .get(self.last_device_idx)
            .is_some_and(|dev| claims(dev.as_ref(), addr, len));

        if !hinted {
            let idx = self
                .devices
                .iter()
                .position(|dev| claims(dev.as_ref(), addr, len))
                .ok_or(ResponseError::DecodeError)?;
            self.last_device_idx = idx;
        }

        let dev = &mut self.devices[self.last_device_idx];
        let offset = addr - dev.address_range().0;
        Ok((dev, offset))
    }
}

fn claims(dev: &dyn Device, addr: u64, len: u64) -> bool {
    let (start, size) = dev.address_range();
    let Some(end) = addr.checked_add(len) else {
        return false;
    };
    addr >= start && end <= start.saturating_add(size)
}

impl Downstream for Bus {
    fn issue(&mut self, txn: &Transaction) -> Response {
        let routed = match txn.access {
            AccessKind::Read | AccessKind::Execute => self
                .find_device(txn.address, txn.length)
                .and_then(|(dev, offset)| dev.read(offset, txn.length))
                .map(Response::ReadData),
            AccessKind::Write if txn.payload_mismatch().is_some() => Err(ResponseError::SlaveError),
            AccessKind::Write => self
                .find_device(txn.address, txn.length)
                .and_then(|(dev, offset)| dev.write(offset, &txn.data))
                .map(|()| Response::WriteAck),
        };
        routed.unwrap_or_else(|code| {
            debug!(address = txn.address, length = txn.length, %code, "downstream error");
            Response::Error(code)
        })
    }
}
