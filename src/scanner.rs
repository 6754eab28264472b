//! QString recognition: the two compiled patterns from spec.md §4.2, plus
//! the `is_address_of_qstring_contents`/`extract_qstring_text` primitives
//! every recogniser and analyser is built on.

use lazy_static::lazy_static;
use utf16string::WStr;

use crate::region::RegionStore;

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;

/// Sentinel returned by [`extract_qstring_text`] when the matched bytes
/// don't decode as UTF-16LE. Never panics, per spec.md §4.2/§7.
pub const DECODE_ERROR_SENTINEL: &str = "Error when decoding from UTF-16";

/// Which QString-contents pattern to use. The engine defaults to [`Lax`],
/// matching spec.md's documented Open Question resolution; [`Strict`]
/// exists as a tightening knob for callers who want it.
///
/// [`Lax`]: QStringPolicy::Lax
/// [`Strict`]: QStringPolicy::Strict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QStringPolicy {
    #[default]
    Lax,
    Strict,
}

lazy_static! {
    /// `.{16} \x18\x00{7} .*? \x00{2}` - sixteen arbitrary header bytes, the
    /// tag byte and its seven zero bytes, lazily any text, then a
    /// terminating zero code unit.
    static ref LAX_QSTRING_PATTERN: regex::bytes::Regex =
        regex::bytes::Regex::new(r"(?s-u).{16}\x18\x00{7}.*?\x00{2}").unwrap();

    /// Tighter form anchored to the header flag bytes actually observed:
    /// `[\x00\x01\x02]\x00{3} . \x00{3} . \x00{2} [\x00\x80] .{4} \x18\x00{7} .*? \x00{2}`.
    static ref STRICT_QSTRING_PATTERN: regex::bytes::Regex =
        regex::bytes::Regex::new(r"(?s-u)[\x00\x01\x02]\x00{3}.\x00{3}.\x00{2}[\x00\x80].{4}\x18\x00{7}.*?\x00{2}")
            .unwrap();
}

fn pattern_for(policy: QStringPolicy) -> &'static regex::bytes::Regex {
    match policy {
        QStringPolicy::Lax => &LAX_QSTRING_PATTERN,
        QStringPolicy::Strict => &STRICT_QSTRING_PATTERN,
    }
}

/// True iff the QString-contents pattern matches starting exactly at `addr`.
pub fn is_address_of_qstring_contents(store: &RegionStore, addr: u64, policy: QStringPolicy) -> bool {
    match store.find_from(addr, pattern_for(policy)) {
        Some((_, matched_addr)) => matched_addr == addr,
        None => false,
    }
}

/// Decodes the first QString-contents match at or after `addr` (searching
/// only within the region `addr` lies in). Reads the 32-bit length at header
/// offset 4 and decodes the 2·N bytes at offset 24 as UTF-16LE. A decode
/// failure never aborts the scan; it yields [`DECODE_ERROR_SENTINEL`].
pub fn extract_qstring_text(store: &RegionStore, addr: u64, policy: QStringPolicy) -> Option<String> {
    let (matched, _) = store.find_from(addr, pattern_for(policy))?;
    if matched.len() < 26 {
        return Some(DECODE_ERROR_SENTINEL.to_owned());
    }
    let length = u32::from_le_bytes(matched[4..8].try_into().unwrap()) as usize;
    let end = 24 + length.checked_mul(2)?;
    if end > matched.len() {
        return Some(DECODE_ERROR_SENTINEL.to_owned());
    }
    match WStr::from_utf16le(&matched[24..end]) {
        Ok(wstr) => Some(wstr.to_utf8()),
        Err(_) => Some(DECODE_ERROR_SENTINEL.to_owned()),
    }
}

/// Every use site of a recovered string filters out empty strings and
/// lone-NUL strings, per spec.md §4.2/§3 ("every recovered string is
/// non-empty and not the single NUL byte").
pub fn is_meaningful_string(s: &str) -> bool {
    !s.is_empty() && s.as_bytes() != [0u8]
}
