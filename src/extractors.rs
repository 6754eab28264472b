//! Extractors: drive the scanner and recognisers to enumerate raw object
//! byte windows for each artifact kind, without yet interpreting their
//! fields. Two anchor techniques are used: regex anchors (phone numbers,
//! time text) followed by back-reference scans, and stride walks that
//! exploit the fixed spacing between sibling objects.

use lazy_static::lazy_static;
use regex::bytes::Regex;

use crate::offsets::Offsets;
use crate::recognisers::is_raw_user;
use crate::region::RegionStore;
use crate::scanner::{is_address_of_qstring_contents, QStringPolicy};

#[cfg(test)]
#[path = "extractors_tests.rs"]
mod tests;

lazy_static! {
    /// UTF-16LE digits, 7 to 16 of them, terminated by a zero code unit -
    /// phone numbers as Telegram stores them.
    static ref PHONE_NUMBER_PATTERN: Regex = Regex::new(r"(?s-u)(\d\x00){7,16}\x00{2}").unwrap();

    /// `H:MM` or `HH:MM` zero-padded UTF-16LE time text, e.g. `"9:05"` or
    /// `"14:30"`.
    static ref TIMETEXT_PATTERN: Regex =
        Regex::new(r"(?s-u)([0-2]\x00)?\d\x00:\x00[0-5]\x00\d\x00").unwrap();
}

/// One raw object window and the address it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWindow {
    pub address: u64,
    pub bytes: Vec<u8>,
}

/// The capability surface every IM platform's extractor implements; a new
/// platform is a new implementation, not a change to this trait.
pub trait Extractor {
    fn extract_users(&self, store: &RegionStore) -> Vec<RawWindow>;
    fn extract_messages(&self, store: &RegionStore) -> Vec<RawWindow>;
    fn extract_accounts(&self, store: &RegionStore) -> Vec<RawWindow>;
    fn extract_conversations(&self, store: &RegionStore) -> Vec<RawWindow>;
    fn extract_message_attachments(&self, store: &RegionStore) -> Vec<RawWindow>;
}

pub struct TelegramDesktopExtractor {
    pub offsets: Offsets,
    pub policy: QStringPolicy,
}

impl TelegramDesktopExtractor {
    pub fn new(offsets: Offsets) -> Self {
        TelegramDesktopExtractor { offsets, policy: QStringPolicy::default() }
    }

    fn read_user_window(&self, store: &RegionStore, base: u64) -> Option<RawWindow> {
        if !is_raw_user(store, base, &self.offsets, self.policy) {
            return None;
        }
        let bytes = store.read(base, self.offsets.user.subpattern_size())?.to_vec();
        Some(RawWindow { address: base, bytes })
    }

    /// Phase A of `extract_users`: anchor on a phone number's QString
    /// contents, then follow every pointer back to it to find candidate
    /// `UserData` bases.
    fn anchor_users(&self, store: &RegionStore) -> Vec<u64> {
        let mut bases = vec![];
        for (_, phone_text_addr) in store.scan(&PHONE_NUMBER_PATTERN) {
            let candidate_contents_addr = match phone_text_addr.checked_sub(24) {
                Some(a) => a,
                None => continue,
            };
            if !is_address_of_qstring_contents(store, candidate_contents_addr, self.policy) {
                continue;
            }
            let needle = candidate_contents_addr.to_le_bytes();
            for reference_addr in store.find_literal(&needle) {
                let base = match reference_addr.checked_sub(self.offsets.user.bytes_above_phone as u64) {
                    Some(b) => b,
                    None => continue,
                };
                if !bases.contains(&base) && self.read_user_window(store, base).is_some() {
                    bases.push(base);
                }
            }
        }
        bases
    }

    /// Phase B of `extract_users`: walk outward from every known base in
    /// both directions at the fixed inter-user stride, stopping each ray at
    /// its first non-user.
    fn walk_user_neighbours(&self, store: &RegionStore, known: &mut Vec<u64>) {
        let stride = self.offsets.user_stride as u64;
        let seeds = known.clone();
        for seed in seeds {
            let mut forward = seed;
            while let Some(next) = forward.checked_add(stride) {
                if known.contains(&next) || self.read_user_window(store, next).is_none() {
                    break;
                }
                known.push(next);
                forward = next;
            }

            let mut backward = seed;
            while let Some(prev) = backward.checked_sub(stride) {
                if known.contains(&prev) || self.read_user_window(store, prev).is_none() {
                    break;
                }
                known.push(prev);
                backward = prev;
            }
        }
    }
}

impl Extractor for TelegramDesktopExtractor {
    fn extract_users(&self, store: &RegionStore) -> Vec<RawWindow> {
        let mut bases = self.anchor_users(store);
        self.walk_user_neighbours(store, &mut bases);
        bases.into_iter().filter_map(|base| self.read_user_window(store, base)).collect()
    }

    fn extract_messages(&self, store: &RegionStore) -> Vec<RawWindow> {
        let above = self.offsets.message_window_above as u64;
        let below = self.offsets.message_window_below;
        let mut windows = vec![];

        for (_, timetext_addr) in store.scan(&TIMETEXT_PATTERN) {
            let candidate_contents_addr = match timetext_addr.checked_sub(24) {
                Some(a) => a,
                None => continue,
            };
            if !is_address_of_qstring_contents(store, candidate_contents_addr, self.policy) {
                continue;
            }
            let needle = candidate_contents_addr.to_le_bytes();
            for reference_addr in store.find_literal(&needle) {
                if let Some(start) = reference_addr.checked_sub(above) {
                    if let Some(bytes) = store.read(start, (above + below) as usize) {
                        windows.push(RawWindow { address: start, bytes: bytes.to_vec() });
                    }
                }
            }
        }
        windows
    }

    /// No direct memory anchor identifies an `Account`; the organiser
    /// synthesises the single account from the recovered population.
    fn extract_accounts(&self, _store: &RegionStore) -> Vec<RawWindow> {
        vec![]
    }

    /// Conversations are discovered transitively, through the messages that
    /// reference them.
    fn extract_conversations(&self, _store: &RegionStore) -> Vec<RawWindow> {
        vec![]
    }

    /// Attachments are discovered transitively, through each message's
    /// `media` pointer.
    fn extract_message_attachments(&self, _store: &RegionStore) -> Vec<RawWindow> {
        vec![]
    }
}
