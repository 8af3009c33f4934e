//! Permission check.
//!
//! Turns a match result and the requested access kind into an allow/deny
//! decision. The lock bit plays no part here; it only governs mutability.

use serde::Deserialize;

use super::entry::PmpEntry;
use super::matcher::{MatchResult, match_range};
use super::table::EntryTable;
use crate::common::AccessKind;
use crate::common::error::MalformedRange;

/// Outcome for accesses that no entry covers.
///
/// Deny unless the integrator asks for an open default explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum DefaultPolicy {
    /// Unmatched accesses are rejected.
    #[default]
    #[serde(alias = "deny", alias = "DENY")]
    Deny,
    /// Unmatched accesses are forwarded.
    #[serde(alias = "allow", alias = "ALLOW")]
    Allow,
}

/// Why an access was denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// No entry covers the access and the default policy is deny.
    NoMatch,
    /// The matching entry does not grant the requested access kind.
    MissingPermission,
    /// The access range is invalid.
    Malformed(MalformedRange),
}

/// Allow/deny decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Forward the access.
    Allow,
    /// Reject the access.
    Deny(DenyReason),
}

impl Decision {
    /// Returns true for [`Decision::Allow`].
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides a single access given the matched entry, if any.
pub const fn check(matched: Option<&PmpEntry>, access: AccessKind, default_policy: DefaultPolicy) -> Decision {
    match matched {
        Some(entry) if entry.permissions.allows(access) => Decision::Allow,
        Some(_) => Decision::Deny(DenyReason::MissingPermission),
        None => match default_policy {
            DefaultPolicy::Allow => Decision::Allow,
            DefaultPolicy::Deny => Decision::Deny(DenyReason::NoMatch),
        },
    }
}

/// Full decision for one access against a table snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    /// Index of the entry that decided the access, if any.
    pub matched: Option<usize>,
    /// The decision.
    pub decision: Decision,
}

/// Runs the matcher and the permission check for `[address, address + length)`.
///
/// Malformed ranges are denied whatever the default policy says.
pub fn evaluate(
    table: &EntryTable,
    address: u64,
    length: u64,
    access: AccessKind,
    default_policy: DefaultPolicy,
) -> Verdict {
    match match_range(table, address, length) {
        MatchResult::Malformed(malformed) => Verdict {
            matched: None,
            decision: Decision::Deny(DenyReason::Malformed(malformed)),
        },
        MatchResult::NoMatch => Verdict {
            matched: None,
            decision: check(None, access, default_policy),
        },
        MatchResult::Matched(index) => {
            let entry = table.read(index);
            Verdict {
                matched: Some(index),
                decision: check(Some(&entry), access, default_policy),
            }
        }
    }
}
