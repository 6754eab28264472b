//! Analysers: turn a raw byte window into a typed record. A record is a
//! flat bag of optional fields - nothing here is a promise that a given
//! field was recovered, only that the window was accepted as *the right
//! kind* of object.

use chrono::{DateTime, TimeZone, Utc};

use crate::offsets::Offsets;
use crate::recognisers::{is_documentdata_address, is_media_contact, is_media_location, is_peerdata_address, is_raw_user};
use crate::region::RegionStore;
use crate::scanner::{extract_qstring_text, is_meaningful_string, QStringPolicy};

#[cfg(test)]
#[path = "analysers_tests.rs"]
mod tests;

/// Analyser output for a `UserData` window. The first decoded QString is
/// the display name; the rest are left for the organiser's factory step to
/// disambiguate into username/phone_number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserRecord {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub strings: Vec<String>,
    pub is_contact: Option<bool>,
    pub is_bot: Option<bool>,
    pub is_blocked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationRecord {
    pub id: Option<u64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageRecord {
    pub text: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub from_user: Option<UserRecord>,
    pub from_conversation: Option<ConversationRecord>,
    pub conversation: Option<ConversationRecord>,
    pub attachment: Option<AttachmentRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentRecord {
    File { filename: Option<String>, filetype: Option<String> },
    SharedContact { firstname: Option<String>, lastname: Option<String>, phone_number: Option<String> },
    GeographicLocation { latitude: f64, longitude: f64, title: Option<String>, description: Option<String> },
}

/// The capability surface every IM platform's analyser implements; a new
/// platform is a new implementation, not a change to this trait.
pub trait Analyser {
    fn analyse_user(&self, store: &RegionStore, addr: u64) -> Option<UserRecord>;
    fn analyse_conversation(&self, store: &RegionStore, addr: u64) -> Option<ConversationRecord>;
    fn analyse_message(&self, store: &RegionStore, addr: u64) -> Option<MessageRecord>;
    fn analyse_attachment(&self, store: &RegionStore, addr: u64) -> Option<AttachmentRecord>;
}

pub struct TelegramDesktopAnalyser {
    pub offsets: Offsets,
    pub policy: QStringPolicy,
}

impl TelegramDesktopAnalyser {
    pub fn new(offsets: Offsets) -> Self {
        TelegramDesktopAnalyser { offsets, policy: QStringPolicy::default() }
    }

    fn decode_qstring_field(&self, store: &RegionStore, addr: u64, field_offset: usize) -> Option<String> {
        let ptr = store.read_u64(addr + field_offset as u64)?;
        if ptr == 0 {
            return None;
        }
        let text = extract_qstring_text(store, ptr, self.policy)?;
        is_meaningful_string(&text).then_some(text)
    }

    /// `0x01` -> true, `0x02` -> false, any other byte (including an
    /// unreadable one) leaves the field unset - per spec.md's Open Question
    /// resolution, unknown bytes are never inferred.
    fn decode_tristate_bool(&self, store: &RegionStore, addr: u64, field_offset: usize) -> Option<bool> {
        match store.read(addr + field_offset as u64, 1)?[0] {
            0x01 => Some(true),
            0x02 => Some(false),
            _ => None,
        }
    }

    fn decode_nonzero_pointer_bool(&self, store: &RegionStore, addr: u64, field_offset: usize) -> Option<bool> {
        Some(store.read_u64(addr + field_offset as u64)? != 0)
    }
}

impl Analyser for TelegramDesktopAnalyser {
    fn analyse_user(&self, store: &RegionStore, addr: u64) -> Option<UserRecord> {
        let u = &self.offsets.user;
        let decoded: Vec<String> = [self.offsets.peer.name, u.firstname, u.lastname, u.username, u.phone]
            .into_iter()
            .filter_map(|offset| self.decode_qstring_field(store, addr, offset))
            .collect();

        let mut iter = decoded.into_iter();
        let name = iter.next();
        let strings: Vec<String> = iter.collect();

        let id = store.read_u64(addr + self.offsets.peer.id as u64).map(id_from_raw_le_bytes);

        Some(UserRecord {
            id,
            name,
            strings,
            is_contact: self.decode_tristate_bool(store, addr, u.is_contact),
            is_bot: self.decode_nonzero_pointer_bool(store, addr, u.is_bot),
            is_blocked: self.decode_tristate_bool(store, addr, self.offsets.peer.is_blocked),
        })
    }

    fn analyse_conversation(&self, store: &RegionStore, addr: u64) -> Option<ConversationRecord> {
        let p = &self.offsets.peer;
        let id = store.read_u64(addr + p.id as u64);
        let name = self.decode_qstring_field(store, addr, p.name);
        Some(ConversationRecord { id, name })
    }

    fn analyse_message(&self, store: &RegionStore, addr: u64) -> Option<MessageRecord> {
        let m = &self.offsets.message;

        let text = self
            .decode_qstring_field(store, addr, m.text)
            .map(|s| s.strip_suffix('_').map(str::to_owned).unwrap_or(s))
            .filter(|s| is_meaningful_string(s));

        let date = store
            .read(addr + m.date as u64, 4)
            .map(|bytes| u32::from_le_bytes(bytes.try_into().unwrap()))
            .and_then(|epoch| Utc.timestamp_opt(epoch as i64, 0).single());

        let from = store.read_u64(addr + m.from as u64).filter(|&p| p != 0);
        let (from_user, from_conversation) = match from {
            Some(ptr) if is_raw_user(store, ptr, &self.offsets, self.policy) => {
                (self.analyse_user(store, ptr), None)
            }
            Some(ptr) if is_peerdata_address(store, ptr, &self.offsets, self.policy) => {
                (None, self.analyse_conversation(store, ptr))
            }
            _ => (None, None),
        };

        let conversation = store
            .read_u64(addr + m.history as u64)
            .filter(|&p| p != 0)
            .and_then(|history| store.read_u64(history + self.offsets.history.peer as u64))
            .filter(|&peer| peer != 0)
            .filter(|&peer| is_peerdata_address(store, peer, &self.offsets, self.policy))
            .and_then(|peer| self.analyse_conversation(store, peer));

        let attachment = store
            .read_u64(addr + m.media as u64)
            .filter(|&p| p != 0)
            .and_then(|media| self.analyse_attachment(store, media));

        Some(MessageRecord { text, date, from_user, from_conversation, conversation, attachment })
    }

    fn analyse_attachment(&self, store: &RegionStore, addr: u64) -> Option<AttachmentRecord> {
        // `addr` is the `MediaFile`; its `DocumentData` lives behind a
        // pointer at `f.document`, so `is_documentdata_address`/filename/
        // filetype are all read from the dereferenced address, not `addr`.
        let f = &self.offsets.file;
        if let Some(doc_addr) = store.read_u64(addr + f.document as u64).filter(|&p| p != 0) {
            if is_documentdata_address(store, doc_addr, &self.offsets, self.policy) {
                let filename = self.decode_qstring_field(store, doc_addr, f.filename);
                if filename.is_some() {
                    let filetype = self.decode_qstring_field(store, doc_addr, f.filetype);
                    return Some(AttachmentRecord::File { filename, filetype });
                }
            }
        }

        if is_media_contact(store, addr, &self.offsets, self.policy) {
            let c = &self.offsets.shared_contact;
            let firstname = self.decode_qstring_field(store, addr, c.firstname);
            if firstname.is_some() {
                let lastname = self.decode_qstring_field(store, addr, c.lastname);
                let phone_number = self.decode_qstring_field(store, addr, c.phone_number);
                return Some(AttachmentRecord::SharedContact { firstname, lastname, phone_number });
            }
        }

        if is_media_location(store, addr, &self.offsets, self.policy) {
            let l = &self.offsets.media_location;
            let latitude = store.read(addr + l.latitude as u64, 8).map(read_f64_le);
            let longitude = store.read(addr + l.longitude as u64, 8).map(read_f64_le);
            if let (Some(latitude), Some(longitude)) = (latitude, longitude) {
                let title = self.decode_qstring_field(store, addr, l.title);
                let description = self.decode_qstring_field(store, addr, l.description);
                return Some(AttachmentRecord::GeographicLocation { latitude, longitude, title, description });
            }
        }

        None
    }
}

/// The id is the raw 64-bit value read little-endian off the wire; spec.md
/// §4.5 describes this as "big-endian from hex-dumped little-endian bytes",
/// which is exactly the native value `u64::from_le_bytes` already produces -
/// no byte-order transform is applied here beyond that.
fn id_from_raw_le_bytes(raw: u64) -> u64 {
    raw
}

fn read_f64_le(bytes: &[u8]) -> f64 {
    f64::from_le_bytes(bytes.try_into().unwrap())
}
