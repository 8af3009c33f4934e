//! Common types used throughout the I/O PMP model.
//!
//! This module provides the building blocks shared by the protection table,
//! the matcher, the gate, and the downstream bus. It includes:
//! 1. **Constants:** Register field widths, granule sizes, and table limits.
//! 2. **Access Kinds:** Classification of a transaction as read, write, or execute.
//! 3. **Error Handling:** Configuration errors, malformed ranges, and bus response codes.

/// Register layout and sizing constants.
pub mod constants;

/// Access kind definitions.
pub mod data;

/// Error types and bus response codes.
pub mod error;

pub use constants::{DEFAULT_ADDR_BITS, DEFAULT_ENTRY_COUNT, MAX_ENTRY_COUNT};
pub use data::AccessKind;
pub use error::{ConfigError, GateError, MalformedRange, ResponseError, SetupError};
