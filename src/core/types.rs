//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use zeroize::Zeroizing;

use crate::core::constants::KEY_LEN;

/// An entry key name (e.g., `login`, `bank/pin`).
pub type EntryKey = String;

/// Lowercase hex string as stored in the document.
pub type HexString = String;

/// A 256-bit symmetric key, wiped from memory on drop.
pub type SymmetricKey = Zeroizing<[u8; KEY_LEN]>;
