//! Hardening tests: tampering, nonce freshness, and property-based
//! round trips.
//!
//! These tests verify coffer detects every modification of its file and
//! of individual entries instead of returning wrong data.

mod support;

use std::collections::HashSet;

use coffer::core::domain::EntryRecord;
use coffer::core::encoder::Encoder;
use coffer::core::item::item_label;
use coffer::core::{envelope, master};
use coffer::{Error, Store};
use support::*;

// ============================================================================
// Whole-file tampering
// ============================================================================

#[test]
fn test_every_bit_flip_in_file_is_detected() {
    let t = Test::with_secrets(&[("login", "alice")]);
    let original = std::fs::read(t.store_path()).unwrap();

    for byte in 0..original.len() {
        for bit in 0..8 {
            let mut tampered = original.clone();
            tampered[byte] ^= 1 << bit;
            std::fs::write(t.store_path(), &tampered).unwrap();

            match Store::open(t.store_path(), Test::encoder()) {
                Err(Error::CorruptFile(_)) => {}
                other => panic!(
                    "flip of byte {} bit {} not detected: {:?}",
                    byte,
                    bit,
                    other.map(|s| s.len())
                ),
            }
        }
    }
}

#[test]
fn test_empty_and_garbage_files_are_corrupt() {
    let t = Test::new();
    for content in [&b""[..], b"hello", &[0u8; 28], &[0xffu8; 512]] {
        std::fs::write(t.store_path(), content).unwrap();
        let err = Store::open(t.store_path(), Test::encoder()).unwrap_err();
        assert!(matches!(err, Error::CorruptFile(_)), "{:?}", err);
    }
}

// ============================================================================
// Entry tampering
// ============================================================================

/// Rewrite the record of `key` inside the sealed file.
fn rewrite_entry(t: &Test, key: &str, edit: impl FnOnce(&mut EntryRecord)) {
    let master_key = master::derive_master_key(&Test::encoder()).unwrap();
    let mut document = envelope::load(&t.store_path(), &master_key)
        .unwrap()
        .unwrap();
    edit(document.entries.get_mut(key).unwrap());
    envelope::persist(&t.store_path(), &master_key, &document).unwrap();
}

fn flip_hex_bit(hex_field: &str, bit: usize) -> String {
    let mut bytes = hex::decode(hex_field).unwrap();
    bytes[bit / 8] ^= 1 << (bit % 8);
    hex::encode(bytes)
}

fn assert_entry_corrupt(t: &Test, key: &str) {
    let store = t.open_store();
    match store.get(key) {
        Err(Error::CorruptEntry { key: k, .. }) => assert_eq!(k, key),
        other => panic!("expected CorruptEntry, got {:?}", other.map(|v| v.len())),
    }
}

#[test]
fn test_every_bit_flip_in_nonce_is_detected() {
    let t = Test::with_secrets(&[("login", "alice")]);
    let original = t.open_store().raw("login").unwrap().clone();

    for bit in 0..original.wrapped_nonce.len() / 2 * 8 {
        rewrite_entry(&t, "login", |r| {
            *r = original.clone();
            r.wrapped_nonce = flip_hex_bit(&original.wrapped_nonce, bit);
        });
        assert_entry_corrupt(&t, "login");
    }
}

#[test]
fn test_every_bit_flip_in_value_is_detected() {
    let t = Test::with_secrets(&[("login", "alice")]);
    let original = t.open_store().raw("login").unwrap().clone();

    for bit in 0..original.ciphertext.len() / 2 * 8 {
        rewrite_entry(&t, "login", |r| {
            *r = original.clone();
            r.ciphertext = flip_hex_bit(&original.ciphertext, bit);
        });
        assert_entry_corrupt(&t, "login");
    }
}

#[test]
fn test_malformed_entry_fields() {
    let t = Test::with_secrets(&[("login", "alice")]);
    let cases: [fn(&mut EntryRecord); 4] = [
        |r| r.wrapped_nonce = "not hex".into(),
        |r| r.ciphertext = "abc".into(),
        |r| r.wrapped_nonce.truncate(16),
        |r| r.ciphertext = hex::encode([0u8; 10]),
    ];
    for edit in cases {
        let t2 = Test::with_secrets(&[("login", "alice")]);
        rewrite_entry(&t2, "login", edit);
        assert_entry_corrupt(&t2, "login");
    }
    // untouched store still fine
    assert_eq!(*t.open_store().get("login").unwrap(), "alice");
}

#[test]
fn test_swapped_entries_are_detected() {
    let t = Test::with_secrets(&[("a", "one"), ("b", "two")]);
    let b = t.open_store().raw("b").unwrap().clone();
    rewrite_entry(&t, "a", |r| *r = b);
    assert_entry_corrupt(&t, "a");
}

// ============================================================================
// Nonce freshness
// ============================================================================

#[test]
fn test_nonces_are_unique() {
    let t = Test::new();
    let encoder = Test::encoder();
    let mut store = t.open_store();
    let mut seen = HashSet::new();

    for i in 0..200 {
        let key = format!("key-{}", i);
        store.set(&key, "same value").unwrap();
        let wrapped = hex::decode(&store.raw(&key).unwrap().wrapped_nonce).unwrap();
        let nonce = encoder.unwrap(&item_label(&key), &wrapped).unwrap();
        assert_eq!(nonce.len(), 32);
        assert!(seen.insert(nonce), "nonce repeated at {}", i);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn roundtrip_survives_reopen(
            entries in prop::collection::btree_map("[^\\x00]{0,40}", ".{0,200}", 1..8)
        ) {
            let t = Test::new();
            let mut store = t.open_store();
            for (k, v) in &entries {
                store.set(k, v).unwrap();
                let got = store.get(k).unwrap();
                prop_assert_eq!(got.as_str(), v.as_str());
            }
            store.sync().unwrap();
            store.close();

            let store = t.open_store();
            prop_assert_eq!(store.len().unwrap(), entries.len());
            for (k, v) in &entries {
                let got = store.get(k).unwrap();
                prop_assert_eq!(got.as_str(), v.as_str());
            }
        }

        #[test]
        fn arbitrary_bytes_never_open(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let t = Test::new();
            std::fs::write(t.store_path(), &bytes).unwrap();
            let result = Store::open(t.store_path(), Test::encoder());
            prop_assert!(matches!(result, Err(Error::CorruptFile(_))));
        }
    }
}
