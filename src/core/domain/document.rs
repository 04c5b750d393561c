//! The decrypted store document.
//!
//! A `Document` is the JSON payload inside the file envelope:
//!
//! ```text
//! {"version": "1", "entries": {"<key>": {"nonce": "<hex>", "value": "<hex>"}}}
//! ```
//!
//! Entries keep insertion order, including across a save/load cycle.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::EntryRecord;
use crate::core::constants::STORE_VERSION;
use crate::core::types::EntryKey;

/// Whole-file payload after decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Format version.
    pub version: String,
    /// Stored entries.
    pub entries: Entries,
}

impl Document {
    /// Create an empty document with the current format version.
    pub fn new() -> Self {
        Self {
            version: STORE_VERSION.to_string(),
            entries: Entries::default(),
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Insertion-ordered map of entry key to record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entries {
    items: Vec<(EntryKey, EntryRecord)>,
}

impl Entries {
    fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|(k, _)| k == key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Record stored under `key`.
    pub fn get(&self, key: &str) -> Option<&EntryRecord> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    /// Mutable record stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut EntryRecord> {
        self.items.iter_mut().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    /// Insert or replace; a new key goes to the end.
    ///
    /// Returns the previous record for `key`, if any.
    pub fn insert(&mut self, key: EntryKey, record: EntryRecord) -> Option<EntryRecord> {
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.items[i].1, record)),
            None => {
                self.items.push((key, record));
                None
            }
        }
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<EntryRecord> {
        self.position(key).map(|i| self.items.remove(i).1)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Serialize for Entries {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.items.len()))?;
        for (key, record) in &self.items {
            map.serialize_entry(key, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of entry keys to entry records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Entries, A::Error> {
                let mut entries = Entries::default();
                while let Some((key, record)) = access.next_entry::<EntryKey, EntryRecord>()? {
                    if entries.contains(&key) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate entry key: {}",
                            key
                        )));
                    }
                    entries.items.push((key, record));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
