//! Synthetic-dump builders shared by every module's test suite. Not part of
//! the public API; the Region Store only reads real memory-mapped files, so
//! tests build small `.dmp` files under a [`tempfile::TempDir`] rather than
//! standing up a parallel in-memory store.

use std::path::Path;

use utf16string::{WString, LE};

use crate::region::RegionStore;

/// Writes `bytes` as a region based at `base_address` into `dir`, using the
/// `<hex_base>_<hex_size>.dmp` naming convention.
pub fn write_region(dir: &Path, base_address: u64, bytes: &[u8]) {
    let path = dir.join(format!("{:x}_{:x}.dmp", base_address, bytes.len()));
    std::fs::write(path, bytes).unwrap();
}

/// Loads whatever `.dmp` files have been written into `dir` so far.
pub fn load_store(dir: &Path) -> RegionStore {
    RegionStore::load(dir).unwrap()
}

/// Builds a QString contents block per spec.md §3: a 16-byte header (ref
/// count / flags, opaque except for the length at offset 4), the `0x18` tag
/// byte followed by 7 zero bytes, the UTF-16LE text, and a terminating zero
/// code unit.
pub fn qstring_contents(text: &str) -> Vec<u8> {
    let utf16: WString<LE> = WString::from(text);
    let code_units = utf16.as_bytes();
    let char_count = (code_units.len() / 2) as u32;

    let mut out = Vec::with_capacity(24 + code_units.len() + 2);
    out.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]); // opaque header bytes 0..4
    out.extend_from_slice(&char_count.to_le_bytes()); // header bytes 4..8 (length)
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x80]); // header bytes 8..12
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // header bytes 12..16
    out.push(0x18);
    out.extend_from_slice(&[0x00; 7]);
    out.extend_from_slice(code_units);
    out.extend_from_slice(&[0x00, 0x00]);
    out
}

/// Pads/truncates a byte vector to exactly `len`, filling new space with
/// zeroes, for laying out a fixed-offset struct window.
pub fn fixed_window(len: usize) -> Vec<u8> {
    vec![0u8; len]
}

/// Writes `value` (little-endian) into `buf` at `offset`, growing `buf` if
/// necessary.
pub fn put_u64(buf: &mut Vec<u8>, offset: usize, value: u64) {
    put_bytes(buf, offset, &value.to_le_bytes());
}

pub fn put_u32(buf: &mut Vec<u8>, offset: usize, value: u32) {
    put_bytes(buf, offset, &value.to_le_bytes());
}

pub fn put_u8(buf: &mut Vec<u8>, offset: usize, value: u8) {
    put_bytes(buf, offset, &[value]);
}

pub fn put_bytes(buf: &mut Vec<u8>, offset: usize, bytes: &[u8]) {
    if buf.len() < offset + bytes.len() {
        buf.resize(offset + bytes.len(), 0);
    }
    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
}
