//! Permission Check Tests.
//!
//! Verifies the allow/deny decision for matched entries, the default policy
//! for unmatched accesses, and the fail-closed handling of malformed ranges.

use iopmp_core::common::{AccessKind, MalformedRange};
use iopmp_core::pmp::{
    AddrMatch, Decision, DefaultPolicy, DenyReason, EntryTable, Permissions, PmpEntry, RegionSpec, Verdict, check,
    evaluate,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case(Permissions::R, AccessKind::Read, true)]
#[case(Permissions::R, AccessKind::Write, false)]
#[case(Permissions::R, AccessKind::Execute, false)]
#[case(Permissions::RW, AccessKind::Write, true)]
#[case(Permissions::RX, AccessKind::Execute, true)]
#[case(Permissions::NONE, AccessKind::Read, false)]
fn matched_entry_decides(#[case] permissions: Permissions, #[case] access: AccessKind, #[case] allowed: bool) {
    let entry = PmpEntry::new(AddrMatch::Napot, 0x3, permissions, false);
    let expected = if allowed {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::MissingPermission)
    };
    // Policy is irrelevant once an entry matched.
    assert_eq!(check(Some(&entry), access, DefaultPolicy::Deny), expected);
    assert_eq!(check(Some(&entry), access, DefaultPolicy::Allow), expected);
}

#[rstest]
#[case(DefaultPolicy::Deny, Decision::Deny(DenyReason::NoMatch))]
#[case(DefaultPolicy::Allow, Decision::Allow)]
fn unmatched_access_follows_policy(#[case] policy: DefaultPolicy, #[case] expected: Decision) {
    for access in [AccessKind::Read, AccessKind::Write, AccessKind::Execute] {
        assert_eq!(check(None, access, policy), expected);
    }
}

#[test]
fn default_policy_is_deny() {
    assert_eq!(DefaultPolicy::default(), DefaultPolicy::Deny);
}

#[test]
fn lock_bit_does_not_grant_or_revoke() {
    let unlocked = PmpEntry::new(AddrMatch::Na4, 0x4, Permissions::R, false);
    let locked = PmpEntry { locked: true, ..unlocked };
    for access in [AccessKind::Read, AccessKind::Write, AccessKind::Execute] {
        assert_eq!(
            check(Some(&unlocked), access, DefaultPolicy::Deny),
            check(Some(&locked), access, DefaultPolicy::Deny)
        );
    }
}

// ══════════════════════════════════════════════════════════
// Full evaluation
// ══════════════════════════════════════════════════════════

fn scenario_table() -> EntryTable {
    let mut table = EntryTable::default();
    table
        .configure_region(0, RegionSpec::Napot { base: 0, size: 0x20 }, Permissions::RWX, false)
        .unwrap();
    table.configure_region(1, RegionSpec::Na4 { base: 0x40 }, Permissions::R, false).unwrap();
    table
}

#[test]
fn napot_rwx_allows_and_outside_is_denied() {
    let table = scenario_table();
    assert_eq!(
        evaluate(&table, 0x0, 1, AccessKind::Read, DefaultPolicy::Deny),
        Verdict {
            matched: Some(0),
            decision: Decision::Allow,
        }
    );
    assert_eq!(
        evaluate(&table, 0x80, 1, AccessKind::Read, DefaultPolicy::Deny),
        Verdict {
            matched: None,
            decision: Decision::Deny(DenyReason::NoMatch),
        }
    );
}

#[test]
fn na4_read_only_denies_write() {
    let table = scenario_table();
    let verdict = evaluate(&table, 0x40, 4, AccessKind::Write, DefaultPolicy::Allow);
    assert_eq!(verdict.matched, Some(1));
    assert_eq!(verdict.decision, Decision::Deny(DenyReason::MissingPermission));
}

#[test]
fn first_match_denies_even_if_later_entry_allows() {
    let mut table = EntryTable::default();
    table.configure_region(0, RegionSpec::Na4 { base: 0x10 }, Permissions::R, false).unwrap();
    table
        .configure_region(1, RegionSpec::Napot { base: 0, size: 0x100 }, Permissions::RWX, false)
        .unwrap();
    let verdict = evaluate(&table, 0x10, 4, AccessKind::Write, DefaultPolicy::Deny);
    assert_eq!(verdict.matched, Some(0));
    assert!(!verdict.decision.is_allowed());
}

#[rstest]
#[case(DefaultPolicy::Deny)]
#[case(DefaultPolicy::Allow)]
fn malformed_access_is_denied_regardless_of_policy(#[case] policy: DefaultPolicy) {
    let table = scenario_table();
    assert_eq!(
        evaluate(&table, 0x0, 0, AccessKind::Read, policy).decision,
        Decision::Deny(DenyReason::Malformed(MalformedRange::ZeroLength { address: 0 }))
    );
    assert!(!evaluate(&table, u64::MAX, 2, AccessKind::Read, policy).decision.is_allowed());
}

#[test]
fn straddling_access_falls_to_policy() {
    let table = scenario_table();
    let deny = evaluate(&table, 0x1c, 8, AccessKind::Read, DefaultPolicy::Deny);
    assert_eq!(deny.matched, None);
    assert!(!deny.decision.is_allowed());
}
