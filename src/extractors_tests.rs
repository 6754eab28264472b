#![allow(unused_imports)]

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use crate::offsets::Offsets;
use crate::test_support::*;

use super::*;

fn place_qstring(dir: &std::path::Path, addr: u64, text: &str) {
    write_region(dir, addr, &qstring_contents(text));
}

fn build_user_struct(offsets: &Offsets, name: u64, firstname: u64, lastname: u64, username: u64, phone: u64) -> Vec<u8> {
    let mut bytes = fixed_window(offsets.user.subpattern_size());
    put_u64(&mut bytes, offsets.peer.name, name);
    put_u64(&mut bytes, offsets.user.firstname, firstname);
    put_u64(&mut bytes, offsets.user.lastname, lastname);
    put_u64(&mut bytes, offsets.user.username, username);
    put_u64(&mut bytes, offsets.user.phone, phone);
    bytes
}

#[test]
fn extract_users_finds_a_single_user_via_phone_anchor() {
    let offsets = Offsets::default();
    let dir = tempdir().unwrap();

    place_qstring(dir.path(), 0x10000, "Ada");
    place_qstring(dir.path(), 0x10100, "Lovelace");
    place_qstring(dir.path(), 0x10200, "ada");
    place_qstring(dir.path(), 0x10300, "12025550123");

    let user_base = 0x20000u64;
    let user_bytes = build_user_struct(&offsets, 0x10000, 0x10000, 0x10100, 0x10200, 0x10300);
    write_region(dir.path(), user_base, &user_bytes);

    let store = load_store(dir.path());
    let extractor = TelegramDesktopExtractor::new(offsets);
    let windows = extractor.extract_users(&store);

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].address, user_base);
    assert_eq!(windows[0].bytes.len(), offsets.user.subpattern_size());
}

#[test]
fn extract_users_walks_an_adjacent_user_regardless_of_which_was_anchored() {
    let offsets = Offsets::default();
    let dir = tempdir().unwrap();

    place_qstring(dir.path(), 0x10000, "Ada");
    place_qstring(dir.path(), 0x10100, "Lovelace");
    place_qstring(dir.path(), 0x10200, "ada");
    place_qstring(dir.path(), 0x10300, "12025550123");

    place_qstring(dir.path(), 0x10400, "Grace");
    place_qstring(dir.path(), 0x10500, "Hopper");
    place_qstring(dir.path(), 0x10600, "grace");
    place_qstring(dir.path(), 0x10700, "compiler");

    let user1_base = 0x20000u64;
    let user1_bytes = build_user_struct(&offsets, 0x10000, 0x10000, 0x10100, 0x10200, 0x10300);
    // Sized to exactly the stride so the second user lands immediately past
    // this region without overlapping it.
    let mut region1 = user1_bytes.clone();
    region1.resize(offsets.user_stride, 0);
    write_region(dir.path(), user1_base, &region1);

    let user2_base = user1_base + offsets.user_stride as u64;
    let user2_bytes = build_user_struct(&offsets, 0x10400, 0x10400, 0x10500, 0x10600, 0x10700);
    write_region(dir.path(), user2_base, &user2_bytes);

    let store = load_store(dir.path());
    let extractor = TelegramDesktopExtractor::new(offsets);
    let mut addresses: Vec<u64> = extractor.extract_users(&store).into_iter().map(|w| w.address).collect();
    addresses.sort();

    assert_eq!(addresses, vec![user1_base, user2_base]);
}

#[test]
fn extract_messages_finds_a_window_via_timetext_anchor() {
    let offsets = Offsets::default();
    let dir = tempdir().unwrap();

    place_qstring(dir.path(), 0x30000, "9:05");

    let reference_addr = 0x40000u64 + offsets.message_window_above as u64;
    let mut region = fixed_window(offsets.message_window_above + offsets.message_window_below);
    put_u64(&mut region, offsets.message_window_above, 0x30000);
    write_region(dir.path(), 0x40000, &region);

    let store = load_store(dir.path());
    let extractor = TelegramDesktopExtractor::new(offsets);
    let windows = extractor.extract_messages(&store);

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].address, reference_addr - offsets.message_window_above as u64);
}
