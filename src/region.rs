//! Region Store: enumerates dump files and answers address-based byte
//! lookups against their memory-mapped contents.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use regex::bytes::Regex;

use crate::error::{require, Result};

#[cfg(test)]
#[path = "region_tests.rs"]
mod tests;

/// One `<hex_base>_<hex_size>.dmp` file, memory-mapped read-only for its
/// whole lifetime.
pub struct Region {
    pub base_address: u64,
    pub size: u64,
    mmap: Mmap,
}

impl Region {
    fn load(path: &Path, base_address: u64, size: u64) -> Result<Region> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Region { base_address, size, mmap })
    }

    fn bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    fn contains(&self, address: u64) -> bool {
        address >= self.base_address && address < self.base_address + self.size
    }

    /// Offset into this region's byte slice, if `address` falls within it.
    fn local_offset(&self, address: u64) -> Option<usize> {
        self.contains(address).then(|| (address - self.base_address) as usize)
    }
}

/// The immutable, sparse set of regions that make up one memory dump.
pub struct RegionStore {
    regions: Vec<Region>,
}

impl RegionStore {
    /// Enumerates every `*.dmp` file directly under `dir`, in directory
    /// order. A file whose name doesn't parse as `<hex_base>_<hex_size>.dmp`,
    /// or whose length disagrees with `hex_size`, is skipped with a warning
    /// rather than aborting the whole load.
    pub fn load(dir: &Path) -> Result<RegionStore> {
        require!(dir.is_dir(), "{} is not a directory", dir.display());

        let mut regions = vec![];
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("dmp") {
                continue;
            }
            match parse_dump_filename(&path) {
                Some((base_address, size)) => match Region::load(&path, base_address, size) {
                    Ok(region) => {
                        if region.mmap.len() as u64 != size {
                            log::warn!(
                                "{}: declared size {:#x} doesn't match file length {:#x}, skipping",
                                path.display(), size, region.mmap.len()
                            );
                            continue;
                        }
                        regions.push(region);
                    }
                    Err(e) => log::warn!("{}: could not be mapped, skipping ({e})", path.display()),
                },
                None => log::warn!("{}: does not match <hex_base>_<hex_size>.dmp, skipping", path.display()),
            }
        }

        require!(!regions.is_empty(), "No usable .dmp files found in {}", dir.display());
        Ok(RegionStore { regions })
    }

    fn region_for(&self, address: u64) -> Option<&Region> {
        self.regions.iter().find(|r| r.contains(address))
    }

    /// Returns exactly `length` bytes starting at `address`, or `None` if
    /// that window does not lie entirely within a single region.
    pub fn read(&self, address: u64, length: usize) -> Option<&[u8]> {
        let region = self.region_for(address)?;
        let offset = region.local_offset(address)?;
        let end = offset.checked_add(length)?;
        (end as u64 <= region.size).then(|| &region.bytes()[offset..end])
    }

    /// Returns the window `[address - above, address + below)`, or `None` if
    /// it would cross a region boundary (including underflowing below the
    /// region's base).
    pub fn read_surroundings(&self, address: u64, above: usize, below: usize) -> Option<&[u8]> {
        let start = address.checked_sub(above as u64)?;
        self.read(start, above + below)
    }

    /// Returns an 8-byte little-endian pointer read at `address`, if it lies
    /// within a single region.
    pub fn read_u64(&self, address: u64) -> Option<u64> {
        let bytes = self.read(address, 8)?;
        Some(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Lazily enumerates every non-overlapping match of `pattern` across
    /// every region, in region-enumeration order, leftmost-first within each
    /// region. Each item is the matched bytes and its absolute address.
    pub fn scan<'a>(&'a self, pattern: &'a Regex) -> impl Iterator<Item = (&'a [u8], u64)> + 'a {
        self.regions.iter().flat_map(move |region| {
            pattern.find_iter(region.bytes()).map(move |m| {
                (m.as_bytes(), region.base_address + m.start() as u64)
            })
        })
    }

    /// Finds the first match of `pattern` at or after `address`, without
    /// crossing into a different region than the one `address` falls in.
    /// Mirrors the original's `pattern.search(mmap_object, start_offset)`.
    pub fn find_from(&self, address: u64, pattern: &Regex) -> Option<(Vec<u8>, u64)> {
        let region = self.region_for(address)?;
        let offset = region.local_offset(address)?;
        let m = pattern.find_at(region.bytes(), offset)?;
        Some((m.as_bytes().to_vec(), region.base_address + m.start() as u64))
    }

    /// Locates every occurrence of `needle` as a literal byte string,
    /// returning their absolute addresses. Used to find back-references to a
    /// known pointer value (e.g. the 8 little-endian bytes of a QString
    /// contents address).
    pub fn find_literal<'a>(&'a self, needle: &'a [u8]) -> impl Iterator<Item = u64> + 'a {
        self.regions.iter().flat_map(move |region| {
            let base = region.base_address;
            find_all_occurrences(region.bytes(), needle).into_iter().map(move |off| base + off as u64)
        })
    }
}

/// All non-overlapping occurrences of `needle` in `haystack`, in ascending
/// order.
fn find_all_occurrences(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return vec![];
    }
    let mut result = vec![];
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if &haystack[i..i + needle.len()] == needle {
            result.push(i);
            i += needle.len();
        } else {
            i += 1;
        }
    }
    result
}

fn parse_dump_filename(path: &Path) -> Option<(u64, u64)> {
    let stem = path.file_stem()?.to_str()?;
    let (base_hex, size_hex) = stem.split_once('_')?;
    let base = u64::from_str_radix(base_hex, 16).ok()?;
    let size = u64::from_str_radix(size_hex, 16).ok()?;
    Some((base, size))
}
