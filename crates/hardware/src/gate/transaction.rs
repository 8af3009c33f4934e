//! Transaction descriptors and responses exchanged with the transport layer.

use crate::common::AccessKind;
use crate::common::error::{MalformedRange, ResponseError};

/// One request from the upstream initiator.
///
/// Covers the contiguous byte range `[address, address + length)`. Write
/// transactions carry their payload, which must be exactly `length` bytes;
/// the gate denies a write whose payload disagrees with its length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// First byte touched.
    pub address: u64,
    /// Number of bytes touched.
    pub length: u64,
    /// Requested access kind.
    pub access: AccessKind,
    /// Write payload (empty for reads and fetches).
    pub data: Vec<u8>,
}

impl Transaction {
    /// Read of `length` bytes at `address`.
    pub const fn read(address: u64, length: u64) -> Self {
        Self {
            address,
            length,
            access: AccessKind::Read,
            data: Vec::new(),
        }
    }

    /// Instruction fetch of `length` bytes at `address`.
    pub const fn execute(address: u64, length: u64) -> Self {
        Self {
            address,
            length,
            access: AccessKind::Execute,
            data: Vec::new(),
        }
    }

    /// Write of `data` at `address`; the length is the payload length.
    pub fn write(address: u64, data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        Self {
            address,
            length: data.len() as u64,
            access: AccessKind::Write,
            data,
        }
    }

    /// Returns the mismatch if this is a write whose payload is not `length` bytes.
    pub fn payload_mismatch(&self) -> Option<MalformedRange> {
        let payload = self.data.len() as u64;
        (self.access == AccessKind::Write && payload != self.length).then_some(
            MalformedRange::PayloadMismatch {
                length: self.length,
                payload,
            },
        )
    }
}

/// Response returned upstream for one transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Data returned by a read or fetch.
    ReadData(Vec<u8>),
    /// Write completed.
    WriteAck,
    /// Terminal error; no data.
    Error(ResponseError),
}

impl Response {
    /// Returns the error code, if this is an error response.
    pub const fn error(&self) -> Option<ResponseError> {
        match self {
            Self::Error(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns true unless this is an error response.
    pub const fn is_ok(&self) -> bool {
        !matches!(self, Self::Error(_))
    }
}
