//! Shared Handle Tests.
//!
//! Verifies that `IoPmp` clones observe the same table, and that decisions
//! racing with reconfiguration always see one consistent table state.

use std::thread;

use iopmp_core::common::{AccessKind, ConfigError};
use iopmp_core::pmp::{DefaultPolicy, EntryTable, IoPmp, Permissions, RegionSpec};
use pretty_assertions::assert_eq;

#[test]
fn clones_share_one_table() {
    let pmp = IoPmp::default();
    let other = pmp.clone();
    pmp.configure_region(0, RegionSpec::Napot { base: 0, size: 0x20 }, Permissions::R, false)
        .unwrap();
    assert!(other.decide(0x10, 4, AccessKind::Read).decision.is_allowed());
    assert_eq!(other.read(0), pmp.read(0));
    assert_eq!(other.snapshot(), pmp.snapshot());
}

#[test]
fn handle_exposes_table_registers() {
    let pmp = IoPmp::new(EntryTable::new(8, 54).unwrap(), DefaultPolicy::Allow);
    assert_eq!(pmp.len(), 8);
    assert!(!pmp.is_empty());
    assert_eq!(pmp.default_policy(), DefaultPolicy::Allow);

    pmp.write_addr(1, 0x3).unwrap();
    pmp.write_cfg(1, 0b1001_1001).unwrap();
    assert_eq!(pmp.read_addr(1), 0x3);
    assert_eq!(pmp.read_cfg(1), 0b1001_1001);
    assert_eq!(
        pmp.write_cfg(1, 0),
        Err(ConfigError::LockedEntryViolation { index: 1, locked_by: 1 })
    );

    pmp.reset();
    assert_eq!(pmp.read_cfg(1), 0);
    pmp.write_cfg(1, 0).unwrap();
}

#[test]
fn decisions_see_consistent_snapshots() {
    // Two states: entry 0 grants read over [0, 0x1000), or it is narrowed to
    // [0, 0x100). A decision for 0x800 must be "allowed" exactly in the first.
    let pmp = IoPmp::default();
    let wide = RegionSpec::Napot { base: 0, size: 0x1000 };
    let narrow = RegionSpec::Napot { base: 0, size: 0x100 };
    pmp.configure_region(0, wide, Permissions::R, false).unwrap();

    thread::scope(|s| {
        for _ in 0..4 {
            let reader = pmp.clone();
            let _ = s.spawn(move || {
                for _ in 0..2_000 {
                    let verdict = reader.decide(0x800, 8, AccessKind::Read);
                    match verdict.matched {
                        Some(0) => assert!(verdict.decision.is_allowed()),
                        None => assert!(!verdict.decision.is_allowed()),
                        other => panic!("unexpected match {other:?}"),
                    }
                }
            });
        }

        let writer = pmp.clone();
        let _ = s.spawn(move || {
            for i in 0..2_000 {
                let spec = if i % 2 == 0 { narrow } else { wide };
                writer.configure_region(0, spec, Permissions::R, false).unwrap();
            }
        });
    });

    // Last write (i = 1999) was the wide region.
    assert!(pmp.decide(0x800, 8, AccessKind::Read).decision.is_allowed());
}

#[test]
fn gates_on_separate_threads_share_the_unit() {
    let pmp = IoPmp::default();
    pmp.configure_region(0, RegionSpec::Na4 { base: 0x40 }, Permissions::RW, false)
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pmp = pmp.clone();
            thread::spawn(move || {
                (0..512)
                    .filter(|i| pmp.decide(0x40 + (i % 8), 1, AccessKind::Write).decision.is_allowed())
                    .count()
            })
        })
        .collect();

    for handle in handles {
        // Offsets 0..4 fall inside the NA4 word, 4..8 outside.
        assert_eq!(handle.join().unwrap(), 256);
    }
}
