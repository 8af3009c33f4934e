//! Downstream side of the protection unit.
//!
//! This module organizes the targets the gate forwards admitted transactions
//! to: the bus interconnect, the RAM device, and the traits that connect them.

/// Bus interconnect and routing.
pub mod interconnect;

/// RAM device.
pub mod ram;

/// Downstream and device trait definitions.
pub mod traits;

pub use interconnect::Bus;
pub use ram::Ram;
pub use traits::{Device, Downstream};
