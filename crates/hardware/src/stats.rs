//! Gate statistics collection and reporting.
//!
//! This module tracks what the gate did with the traffic it saw. It provides:
//! 1. **Throughput:** Transactions accepted, forwarded, and rejected.
//! 2. **Rejections:** Breakdown by cause (no match, missing permission, malformed).
//! 3. **Cancellation:** Transactions abandoned before a decision.
//! 4. **Downstream:** Error responses relayed from the target side.

use std::fmt;

use crate::pmp::{Decision, DenyReason};

/// Counters for one gate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Transactions accepted into the checking state.
    pub transactions: u64,
    /// Transactions forwarded downstream.
    pub forwarded: u64,
    /// Transactions rejected with `AccessDenied`.
    pub rejected: u64,
    /// Rejections where no entry matched under a default-deny policy.
    pub rejected_no_match: u64,
    /// Rejections where the matched entry lacked the permission.
    pub rejected_permission: u64,
    /// Rejections of zero-length or wrapping ranges.
    pub rejected_malformed: u64,
    /// Transactions the transport side abandoned before a decision.
    pub abandoned: u64,
    /// Forwarded transactions the downstream answered with an error.
    pub downstream_errors: u64,
}

impl GateStats {
    /// Counts one decision.
    pub const fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Allow => self.forwarded += 1,
            Decision::Deny(reason) => {
                self.rejected += 1;
                match reason {
                    DenyReason::NoMatch => self.rejected_no_match += 1,
                    DenyReason::MissingPermission => self.rejected_permission += 1,
                    DenyReason::Malformed(_) => self.rejected_malformed += 1,
                }
            }
        }
    }

    /// Fraction of decided transactions that were rejected, in percent.
    pub fn rejection_rate(&self) -> f64 {
        let decided = self.forwarded + self.rejected;
        if decided == 0 {
            return 0.0;
        }
        (self.rejected as f64 / decided as f64) * 100.0
    }

    /// Prints the statistics to stdout.
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for GateStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "IO-PMP GATE STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "gate.transactions        {}", self.transactions)?;
        writeln!(f, "gate.forwarded           {}", self.forwarded)?;
        writeln!(f, "gate.rejected            {} ({:.2}%)", self.rejected, self.rejection_rate())?;
        writeln!(f, "  rejected.no_match      {}", self.rejected_no_match)?;
        writeln!(f, "  rejected.permission    {}", self.rejected_permission)?;
        writeln!(f, "  rejected.malformed     {}", self.rejected_malformed)?;
        writeln!(f, "gate.abandoned           {}", self.abandoned)?;
        writeln!(f, "downstream.errors        {}", self.downstream_errors)?;
        write!(f, "==========================================================")
    }
}
