#![allow(unused_imports)]

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::test_support::*;

use super::*;

#[test]
fn read_exact_window() {
    let dir = tempdir().unwrap();
    write_region(dir.path(), 0x10000, &[0xAA; 0x1000]);
    let store = load_store(dir.path());

    assert_eq!(store.read(0x10000, 4), Some(&[0xAA, 0xAA, 0xAA, 0xAA][..]));
    assert_eq!(store.read(0x10FFC, 4), Some(&[0xAA, 0xAA, 0xAA, 0xAA][..]));
}

#[test]
fn read_rejects_crossing_region_boundary() {
    let dir = tempdir().unwrap();
    write_region(dir.path(), 0x10000, &[0xAA; 0x1000]);
    let store = load_store(dir.path());

    // Starts one byte before the end of the region.
    assert_eq!(store.read(0x10FFF, 4), None);
    // Entirely outside any region.
    assert_eq!(store.read(0x20000, 4), None);
}

#[test]
fn read_surroundings_rejects_underflow_past_base() {
    let dir = tempdir().unwrap();
    write_region(dir.path(), 0x10000, &[0xAA; 0x1000]);
    let store = load_store(dir.path());

    assert_eq!(store.read_surroundings(0x10010, 0x20, 0x10), None);
    assert!(store.read_surroundings(0x10010, 0x10, 0x10).is_some());
}

#[test]
fn regions_do_not_stitch_even_when_adjacent() {
    let dir = tempdir().unwrap();
    write_region(dir.path(), 0x10000, &[0x01; 0x100]);
    write_region(dir.path(), 0x10100, &[0x02; 0x100]);
    let store = load_store(dir.path());

    // Straddles the two regions - must fail closed, never stitched together.
    assert_eq!(store.read(0x100F0, 0x20), None);
}

#[test]
fn u64_roundtrip_through_hex() {
    let v: u64 = 0x1234_5678_9abc_def0;
    let hex = format!("{:x}", v);
    let back = u64::from_str_radix(&hex, 16).unwrap();
    assert_eq!(v, back);
}

#[test]
fn scan_finds_leftmost_nonoverlapping_matches_in_order() {
    let dir = tempdir().unwrap();
    let mut bytes = vec![0u8; 0x40];
    bytes[0x04..0x08].copy_from_slice(b"\xAA\xAA\xAA\xAA");
    bytes[0x10..0x14].copy_from_slice(b"\xAA\xAA\xAA\xAA");
    write_region(dir.path(), 0x5000, &bytes);
    let store = load_store(dir.path());

    let pattern = regex::bytes::Regex::new(r"(?s)\xAA{4}").unwrap();
    let matches: Vec<u64> = store.scan(&pattern).map(|(_, addr)| addr).collect();
    assert_eq!(matches, vec![0x5004, 0x5010]);
}

#[test]
fn find_literal_locates_all_occurrences() {
    let dir = tempdir().unwrap();
    let needle = 0x1234_5678_u64.to_le_bytes();
    let mut bytes = vec![0u8; 0x40];
    bytes[0x08..0x10].copy_from_slice(&needle);
    bytes[0x20..0x28].copy_from_slice(&needle);
    write_region(dir.path(), 0x7000, &bytes);
    let store = load_store(dir.path());

    let hits: Vec<u64> = store.find_literal(&needle).collect();
    assert_eq!(hits, vec![0x7008, 0x7020]);
}
