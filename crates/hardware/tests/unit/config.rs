//! # Configuration Tests
//!
//! Tests for configuration defaults, JSON parsing, and building the
//! protection unit and bus from a configuration.

use iopmp_core::common::{AccessKind, ConfigError, SetupError};
use iopmp_core::config::*;
use iopmp_core::gate::Response;
use iopmp_core::pmp::{AddrMatch, DefaultPolicy, Permissions, RegionSpec};
use pretty_assertions::assert_eq;

use crate::common::harness::TestContext;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.pmp.entry_count, 16);
    assert_eq!(config.pmp.addr_bits, 54);
    assert_eq!(config.pmp.default_policy, DefaultPolicy::Deny);
    assert!(config.pmp.entries.is_empty());
    assert_eq!(config.bus.ram_base, 0);
    assert_eq!(config.bus.ram_size, 64 * 1024);
}

#[test]
fn test_empty_json_uses_defaults() {
    let config = Config::from_json("{}").unwrap();
    assert_eq!(config.pmp.entry_count, 16);
    assert_eq!(config.bus.ram_size, 64 * 1024);
}

#[test]
fn test_full_json() {
    let json = r#"{
        "pmp": {
            "entry_count": 8,
            "addr_bits": 32,
            "default_policy": "allow",
            "entries": [
                { "index": 0, "mode": "TOR", "bound": 256 },
                { "index": 1, "mode": "tor", "bound": 512, "read": true, "locked": true },
                { "index": 2, "mode": "NA4", "base": 16, "read": true, "write": true },
                { "index": 3, "mode": "Napot", "base": 4096, "size": 4096, "execute": true },
                { "index": 4, "mode": "OFF" }
            ]
        },
        "bus": { "ram_base": 4096, "ram_size": 8192 }
    }"#;
    let config = Config::from_json(json).unwrap();
    assert_eq!(config.pmp.entry_count, 8);
    assert_eq!(config.pmp.addr_bits, 32);
    assert_eq!(config.pmp.default_policy, DefaultPolicy::Allow);
    assert_eq!(config.pmp.entries.len(), 5);
    assert_eq!(config.pmp.entries[1].mode, AddrMatch::Tor);
    assert_eq!(config.pmp.entries[1].permissions(), Permissions::R);
    assert!(config.pmp.entries[1].locked);
    assert_eq!(config.bus.ram_base, 4096);

    let pmp = config.build_pmp().unwrap();
    assert_eq!(pmp.len(), 8);
    assert!(pmp.read(1).locked);
    assert_eq!(pmp.read(3).mode, AddrMatch::Napot);
    assert!(pmp.decide(0x1800, 4, AccessKind::Execute).decision.is_allowed());
    assert!(!pmp.decide(0x10, 4, AccessKind::Execute).decision.is_allowed());
}

#[test]
fn test_entry_region_spec() {
    let json = r#"{ "index": 0, "mode": "NAPOT", "base": 0, "size": 32 }"#;
    let entry: EntryConfig = serde_json::from_str(json).unwrap();
    assert_eq!(entry.region_spec().unwrap(), RegionSpec::Napot { base: 0, size: 32 });
    assert_eq!(entry.permissions(), Permissions::NONE);
}

#[test]
fn test_missing_field_is_shape_error() {
    let json = r#"{ "pmp": { "entries": [ { "index": 3, "mode": "NAPOT", "base": 0 } ] } }"#;
    let err = Config::from_json(json).unwrap().build_pmp().unwrap_err();
    assert!(matches!(err, SetupError::EntryShape { index: 3, .. }));
}

#[test]
fn test_locked_initial_entry_refuses_later_entry() {
    let json = r#"{ "pmp": { "entries": [
        { "index": 0, "mode": "NA4", "base": 0, "read": true, "locked": true },
        { "index": 0, "mode": "NA4", "base": 0, "write": true }
    ] } }"#;
    let err = Config::from_json(json).unwrap().build_pmp().unwrap_err();
    assert!(matches!(
        err,
        SetupError::Entry {
            index: 0,
            source: ConfigError::LockedEntryViolation { index: 0, locked_by: 0 },
        }
    ));
}

#[test]
fn test_invalid_geometry() {
    let json = r#"{ "pmp": { "entry_count": 0 } }"#;
    let err = Config::from_json(json).unwrap().build_pmp().unwrap_err();
    assert!(matches!(err, SetupError::InvalidEntryCount { count: 0, .. }));
}

#[test]
fn test_bad_json() {
    assert!(matches!(Config::from_json("{ pmp: "), Err(SetupError::Json(_))));
    assert!(matches!(
        Config::from_json(r#"{ "pmp": { "default_policy": "maybe" } }"#),
        Err(SetupError::Json(_))
    ));
}

#[test]
fn test_ram_overflow() {
    let json = r#"{ "bus": { "ram_base": 18446744073709551600, "ram_size": 64 } }"#;
    let err = Config::from_json(json).unwrap().build_bus().unwrap_err();
    assert!(matches!(err, SetupError::RamOverflow { .. }));
}

#[test]
fn test_configured_gate_end_to_end() {
    let json = r#"{ "pmp": { "entries": [
        { "index": 0, "mode": "NAPOT", "base": 0, "size": 32, "read": true, "write": true, "execute": true }
    ] } }"#;
    let mut ctx = TestContext::from_config(&Config::from_json(json).unwrap());
    assert_eq!(ctx.read(0x0, 1), Response::ReadData(vec![0]));
    assert!(!ctx.read(0x40, 1).is_ok());
}

#[test]
fn test_demo_testbench_config() {
    let config = Config::from_json(include_str!("../../../../demos/testbench.json")).unwrap();
    let mut ctx = TestContext::from_config(&config).with_memory(0x0, &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(ctx.read(0x0, 4), Response::ReadData(vec![0xde, 0xad, 0xbe, 0xef]));
    assert!(!ctx.read(0x40, 1).is_ok());
    assert!(ctx.read(0x150, 1).is_ok());
    assert!(!ctx.write(0x150, &[0]).is_ok());
    assert!(ctx.pmp().read(2).locked);
}
