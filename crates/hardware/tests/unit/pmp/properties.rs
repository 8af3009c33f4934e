//! Randomized Properties.
//!
//! Uses proptest to check encoding and matching invariants across the whole
//! address space rather than a handful of hand-picked addresses.

use iopmp_core::pmp::{
    AddrMatch, EntryTable, MatchResult, Permissions, PmpEntry, Region, RegionSpec, match_range, napot_decode,
    napot_encode,
};
use proptest::prelude::*;

/// One packed-register write: a cfg byte if present, otherwise the address value.
fn register_write() -> impl Strategy<Value = (usize, Option<u8>, u64)> {
    (0usize..16, any::<Option<u8>>(), any::<u64>())
}

/// A naturally aligned power-of-two region inside a 54-bit field.
fn napot_region() -> impl Strategy<Value = (u64, u64)> {
    (3u32..40).prop_flat_map(|order| {
        let size = 1u64 << order;
        (0u64..(1 << 16)).prop_map(move |slot| (slot * size, size))
    })
}

proptest! {
    #[test]
    fn napot_encoding_round_trips((base, size) in napot_region()) {
        let bits = napot_encode(base, size, 54).unwrap();
        prop_assert_eq!(napot_decode(bits, 54), Region::new(base, base + size));
    }

    #[test]
    fn napot_region_contains_exactly_its_bytes((base, size) in napot_region(), offset in any::<u64>()) {
        let mut table = EntryTable::default();
        table.configure_region(0, RegionSpec::Napot { base, size }, Permissions::R, false).unwrap();

        let inside = base + offset % size;
        prop_assert_eq!(match_range(&table, inside, 1), MatchResult::Matched(0));
        prop_assert_eq!(match_range(&table, base + size, 1), MatchResult::NoMatch);
        if base > 0 {
            prop_assert_eq!(match_range(&table, base - 1, 1), MatchResult::NoMatch);
            prop_assert_eq!(match_range(&table, base - 1, 2), MatchResult::NoMatch);
        }
    }

    #[test]
    fn off_entries_never_match(
        fields in proptest::collection::vec(0u64..(1 << 54), 16),
        address in 0u64..(1 << 56),
        length in 1u64..0x1000,
    ) {
        let mut table = EntryTable::default();
        for (index, bits) in fields.into_iter().enumerate() {
            table.configure(index, PmpEntry::new(AddrMatch::Off, bits, Permissions::RWX, false)).unwrap();
        }
        prop_assert_eq!(match_range(&table, address, length), MatchResult::NoMatch);
    }

    #[test]
    fn first_containing_entry_wins(
        (base, size) in napot_region(),
        shadowed in 1usize..16,
    ) {
        // The same region at entry 0 and at a later index: entry 0 always wins.
        let mut table = EntryTable::default();
        let spec = RegionSpec::Napot { base, size };
        table.configure_region(0, spec, Permissions::R, false).unwrap();
        table.configure_region(shadowed, spec, Permissions::RWX, false).unwrap();
        prop_assert_eq!(match_range(&table, base, 1), MatchResult::Matched(0));
    }

    #[test]
    fn locked_tor_range_survives_register_writes(
        (base, size) in napot_region(),
        words in 1u64..0x400,
        tor in 1usize..16,
        writes in proptest::collection::vec(register_write(), 1..48),
    ) {
        let mut table = EntryTable::default();
        let top = base + size + words * 4;
        table.configure_region(tor - 1, RegionSpec::Napot { base, size }, Permissions::RWX, false).unwrap();
        table.configure_region(tor, RegionSpec::Tor { top }, Permissions::R, true).unwrap();
        let region = table.region(tor);
        prop_assert_eq!(region, Some(Region::new(base + size, top)));

        for (index, cfg, addr) in writes {
            let _ = match cfg {
                Some(cfg) => table.write_cfg(index, cfg),
                None => table.write_addr(index, addr),
            };
            prop_assert_eq!(table.region(tor), region);
            prop_assert!(table.read(tor).locked);
        }
    }

    #[test]
    fn read_is_idempotent(index in 0usize..16, bits in 0u64..(1 << 54), cfg in any::<u8>()) {
        let mut table = EntryTable::default();
        table.configure(index, PmpEntry::from_registers(cfg, bits)).unwrap();
        let first = table.read(index);
        prop_assert_eq!(first, table.read(index));
        prop_assert_eq!(first, PmpEntry::from_registers(cfg, bits));
    }
}
