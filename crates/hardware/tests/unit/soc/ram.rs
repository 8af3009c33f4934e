//! RAM Device Tests.
//!
//! Verifies device-relative reads and writes, preloading, and the slave error
//! returned for accesses that run off the end of the array.

use iopmp_core::common::ResponseError;
use iopmp_core::soc::{Device, Ram};
use pretty_assertions::assert_eq;

#[test]
fn fresh_ram_is_zeroed() {
    let mut ram = Ram::new(0x8000_0000, 64);
    assert_eq!(ram.name(), "RAM");
    assert_eq!(ram.address_range(), (0x8000_0000, 64));
    assert_eq!(ram.read(0, 8), Ok(vec![0; 8]));
}

#[test]
fn write_then_read() {
    let mut ram = Ram::new(0, 64);
    ram.write(10, &[1, 2, 3]).unwrap();
    assert_eq!(ram.read(9, 5), Ok(vec![0, 1, 2, 3, 0]));
}

#[test]
fn load_seeds_contents() {
    let mut ram = Ram::new(0, 16);
    ram.load(&[0xff; 4], 12);
    assert_eq!(&ram.as_slice()[12..], &[0xff; 4]);
}

#[test]
fn out_of_range_load_is_dropped() {
    let mut ram = Ram::new(0, 16);
    ram.load(&[0xff; 4], 14);
    assert!(ram.as_slice().iter().all(|&b| b == 0));
}

#[test]
fn access_past_end_is_slave_error() {
    let mut ram = Ram::new(0, 16);
    assert_eq!(ram.read(12, 8), Err(ResponseError::SlaveError));
    assert_eq!(ram.write(16, &[1]), Err(ResponseError::SlaveError));
    assert_eq!(ram.read(u64::MAX, 2), Err(ResponseError::SlaveError));
}
