//! Type recognisers: validate that a candidate address really holds the C++
//! object its caller expects, by checking the QString pointers a genuine
//! instance would have. Every recogniser short-circuits to `false` the
//! moment a read falls outside all known regions - an unreadable pointer
//! can never belong to a live object.

use crate::offsets::Offsets;
use crate::region::RegionStore;
use crate::scanner::{is_address_of_qstring_contents, QStringPolicy};

#[cfg(test)]
#[path = "recognisers_tests.rs"]
mod tests;

fn points_to_qstring(store: &RegionStore, addr: u64, field_offset: usize, policy: QStringPolicy) -> bool {
    match store.read_u64(addr + field_offset as u64) {
        Some(ptr) if ptr != 0 => is_address_of_qstring_contents(store, ptr, policy),
        _ => false,
    }
}

/// A raw `UserData*`: the inherited `PeerData::name` pointer and the four
/// `UserData`-specific pointers (`firstname`, `lastname`, `username`,
/// `phone`) must all resolve to QString contents.
pub fn is_raw_user(store: &RegionStore, addr: u64, offsets: &Offsets, policy: QStringPolicy) -> bool {
    let u = &offsets.user;
    points_to_qstring(store, addr, offsets.peer.name, policy)
        && points_to_qstring(store, addr, u.firstname, policy)
        && points_to_qstring(store, addr, u.lastname, policy)
        && points_to_qstring(store, addr, u.username, policy)
        && points_to_qstring(store, addr, u.phone, policy)
}

/// A `PeerData*`: its `name` pointer must resolve to a QString contents
/// block.
pub fn is_peerdata_address(store: &RegionStore, addr: u64, offsets: &Offsets, policy: QStringPolicy) -> bool {
    points_to_qstring(store, addr, offsets.peer.name, policy)
}

/// A `DocumentData*`: both the `filename` and `filetype` pointers must
/// resolve to QString contents.
pub fn is_documentdata_address(store: &RegionStore, addr: u64, offsets: &Offsets, policy: QStringPolicy) -> bool {
    let f = &offsets.file;
    points_to_qstring(store, addr, f.filename, policy) && points_to_qstring(store, addr, f.filetype, policy)
}

/// A `MediaContact*`: the `firstname`, `lastname`, and `phone_number`
/// pointers must all resolve to QString contents.
pub fn is_media_contact(store: &RegionStore, addr: u64, offsets: &Offsets, policy: QStringPolicy) -> bool {
    let c = &offsets.shared_contact;
    points_to_qstring(store, addr, c.firstname, policy)
        && points_to_qstring(store, addr, c.lastname, policy)
        && points_to_qstring(store, addr, c.phone_number, policy)
}

/// A `MediaLocation*`: both the `title` and `description` pointers must
/// resolve to QString contents. Latitude/longitude are raw little-endian
/// `f64`s, not pointers, and play no part in recognition.
pub fn is_media_location(store: &RegionStore, addr: u64, offsets: &Offsets, policy: QStringPolicy) -> bool {
    let l = &offsets.media_location;
    points_to_qstring(store, addr, l.title, policy) && points_to_qstring(store, addr, l.description, policy)
}
