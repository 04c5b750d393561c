//! Encrypted key-value store.
//!
//! [`Store`] is the facade tying everything together: it derives the master
//! key on open, decrypts the file into a [`Document`], encrypts each value
//! on [`Store::set`] and decrypts it on [`Store::get`]. Changes live in
//! memory until [`Store::sync`] writes them back atomically.
//!
//! ## Device calls
//!
//! | operation | device calls |
//! |-----------|--------------|
//! | `open`    | 1 (master key) |
//! | `get`     | 1 (entry nonce) |
//! | `set`     | 1 (entry nonce) |
//! | everything else | 0 |
//!
//! ## Policies
//!
//! - existing keys cannot be overwritten; delete first
//! - deleting an absent key is a no-op returning `false`

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zeroize::Zeroizing;

use super::domain::{Document, EntryRecord};
use super::encoder::{Encoder, EncoderBackend};
use super::types::SymmetricKey;
use super::{envelope, item, master};
use crate::error::{Error, Result, UsageError};

/// State that only exists while the store is open.
struct Unlocked {
    master_key: SymmetricKey,
    document: Document,
}

/// A file-backed mapping of string keys to encrypted string values.
///
/// Generic over the encoder so tests can plug in a software or mock
/// backend; the binary uses [`EncoderBackend`].
pub struct Store<E: Encoder = EncoderBackend> {
    path: PathBuf,
    encoder: E,
    unlocked: Option<Unlocked>,
    synced: bool,
}

impl<E: Encoder> Store<E> {
    /// Open the store at `path`.
    ///
    /// Derives the master key (one device call), then decrypts the file.
    /// A missing file gives an empty store; it is created on the first
    /// [`Store::sync`] after a change.
    ///
    /// # Errors
    ///
    /// Returns device errors from key derivation, `Error::CorruptFile` if
    /// the file cannot be decrypted or parsed, or `Error::Io`.
    pub fn open(path: impl Into<PathBuf>, encoder: E) -> Result<Self> {
        let path = path.into();
        let master_key = master::derive_master_key(&encoder)?;
        let document = envelope::load(&path, &master_key)?.unwrap_or_default();

        info!(
            path = %path.display(),
            entries = document.entries.len(),
            encoder = encoder.name(),
            "store opened"
        );
        Ok(Self {
            path,
            encoder,
            unlocked: Some(Unlocked {
                master_key,
                document,
            }),
            synced: true,
        })
    }

    fn unlocked(&self) -> Result<&Unlocked> {
        self.unlocked.as_ref().ok_or(Error::Closed)
    }

    fn document(&self) -> Result<&Document> {
        self.unlocked().map(|u| &u.document)
    }

    fn document_mut(&mut self) -> Result<&mut Document> {
        self.unlocked
            .as_mut()
            .map(|u| &mut u.document)
            .ok_or(Error::Closed)
    }

    /// Whether `key` is stored. No device call.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.document()?.entries.contains(key))
    }

    /// Decrypt the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyNotFound` if absent, `Error::CorruptEntry` if the
    /// record fails to decrypt, or a device error.
    pub fn get(&self, key: &str) -> Result<Zeroizing<String>> {
        let record = self.raw(key)?;
        item::decrypt_item(&self.encoder, key, record)
    }

    /// The stored record for `key`, without decrypting it.
    pub fn raw(&self, key: &str) -> Result<&EntryRecord> {
        self.document()?
            .entries
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    /// Encrypt and store a new entry.
    ///
    /// # Errors
    ///
    /// Returns `UsageError::KeyExists` if the key is already stored; the
    /// existing value is left untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.contains(key)? {
            return Err(UsageError::KeyExists(key.to_string()).into());
        }

        let record = item::encrypt_item(&self.encoder, key, value)?;
        self.document_mut()?.entries.insert(key.to_string(), record);
        self.synced = false;
        debug!(key, "entry added");
        Ok(())
    }

    /// Remove `key`. Returns `false` (and changes nothing) if it was absent.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let removed = self.document_mut()?.entries.remove(key).is_some();
        if removed {
            self.synced = false;
            debug!(key, "entry removed");
        }
        Ok(removed)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Result<impl Iterator<Item = &str> + '_> {
        Ok(self.document()?.entries.keys())
    }

    /// Number of entries.
    pub fn len(&self) -> Result<usize> {
        Ok(self.document()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.document()?.entries.is_empty())
    }

    /// Write pending changes to disk.
    ///
    /// Returns `false` without touching the file when nothing changed.
    pub fn sync(&mut self) -> Result<bool> {
        let unlocked = self.unlocked()?;
        if self.synced {
            debug!("store already synced");
            return Ok(false);
        }

        envelope::persist(&self.path, &unlocked.master_key, &unlocked.document)?;
        self.synced = true;
        info!(path = %self.path.display(), "store synced");
        Ok(true)
    }

    /// Drop the decrypted document and wipe the master key.
    ///
    /// Unsynced changes are discarded. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.unlocked.take().is_some() {
            debug!(path = %self.path.display(), synced = self.synced, "store closed");
        }
    }

    /// True when the file reflects every change made so far.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn is_closed(&self) -> bool {
        self.unlocked.is_none()
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The encoder in use.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

impl<E: Encoder> std::fmt::Debug for Store<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.path)
            .field("encoder", &self.encoder.name())
            .field("closed", &self.is_closed())
            .field("synced", &self.synced)
            .finish()
    }
}
