//! I/O Physical Memory Protection model.
//!
//! This crate implements a behavioural model of an IO-PMP sitting on a bus
//! between an untrusted initiator and the memory behind it:
//! 1. **PMP:** Entry table, address matcher (TOR, NA4, NAPOT), permission check, and lock semantics.
//! 2. **Gate:** Per-transaction state machine that forwards or rejects each access.
//! 3. **SoC:** A minimal downstream bus with RAM, used as the gate's target.
//! 4. **Configuration:** JSON-driven table geometry, default policy, and initial entries.
//! 5. **Statistics:** Per-gate counters for forwarded, rejected, and abandoned traffic.

/// Common types and constants (access kinds, register layout, errors).
pub mod common;
/// Configuration (defaults, table geometry, initial entries, bus).
pub mod config;
/// Protection gate (transactions, responses, state machine).
pub mod gate;
/// Protection unit (entries, matcher, permission check, table, shared handle).
pub mod pmp;
/// Downstream side (bus, RAM, device traits).
pub mod soc;
/// Gate statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or parse from JSON.
pub use crate::config::Config;
/// Gate and the transaction types it exchanges.
pub use crate::gate::{Gate, Response, Transaction};
/// Protection unit handle and its entry table.
pub use crate::pmp::{EntryTable, IoPmp};
