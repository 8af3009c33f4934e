//! I/O Physical Memory Protection.
//!
//! This module implements the access-control core of the IO-PMP, following
//! the RISC-V PMP entry format (privileged architecture, section 3.7):
//! 1. **Entry:** Tagged descriptor with mode, address field, permissions, and lock.
//! 2. **Table:** Ordered, fixed-length entry list with lock enforcement.
//! 3. **Matcher:** TOR / NA4 / NAPOT decoding and first-match-wins lookup.
//! 4. **Permission:** Allow/deny from the matched entry or the default policy.
//! 5. **Unit:** Shared, lock-protected handle used by gates and the configuration side.

/// Entry descriptor and region encoding.
pub mod entry;

/// Address decoding and first-match lookup.
pub mod matcher;

/// Permission check and default policy.
pub mod permission;

/// Entry table with lock rules.
pub mod table;

/// Shared protection unit handle.
pub mod unit;

pub use entry::{AddrMatch, Permissions, PmpEntry, RegionSpec};
pub use matcher::{MatchResult, Region, match_range, napot_decode, napot_encode};
pub use permission::{Decision, DefaultPolicy, DenyReason, Verdict, check, evaluate};
pub use table::EntryTable;
pub use unit::IoPmp;
