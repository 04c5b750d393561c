//! Whole-file envelope.
//!
//! The store file is the JSON [`Document`] sealed with AES-256-GCM under the
//! master key: `IV(12) ∥ TAG(16) ∥ CIPHERTEXT`. Anything that fails to
//! decrypt or parse is reported as [`Error::CorruptFile`]; a wrong device
//! and a damaged file look the same.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;
use zeroize::Zeroizing;

use super::cipher;
use super::domain::Document;
use crate::core::constants::{KEY_LEN, STORE_VERSION};
use crate::error::{Error, Result};

/// Serialize and seal a document.
pub fn seal_document(key: &[u8; KEY_LEN], document: &Document) -> Result<Vec<u8>> {
    let json = Zeroizing::new(serde_json::to_vec(document)?);
    cipher::seal(key, &json)
}

/// Open and parse a sealed document.
///
/// # Errors
///
/// Returns `Error::CorruptFile` for short input, tag mismatch, invalid
/// UTF-8, malformed JSON, or an unsupported version.
pub fn open_document(key: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Document> {
    let plaintext =
        Zeroizing::new(cipher::open(key, sealed).map_err(|e| Error::CorruptFile(e.to_string()))?);

    let text = std::str::from_utf8(&plaintext)
        .map_err(|e| Error::CorruptFile(format!("document is not UTF-8: {}", e)))?;
    let document: Document = serde_json::from_str(text)
        .map_err(|e| Error::CorruptFile(format!("invalid document: {}", e)))?;

    if document.version != STORE_VERSION {
        return Err(Error::CorruptFile(format!(
            "unsupported version {:?}",
            document.version
        )));
    }
    Ok(document)
}

/// Read and decrypt the file at `path`.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load(path: &Path, key: &[u8; KEY_LEN]) -> Result<Option<Document>> {
    let sealed = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "store file does not exist");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let document = open_document(key, &sealed)?;
    debug!(
        path = %path.display(),
        entries = document.entries.len(),
        "store file loaded"
    );
    Ok(Some(document))
}

/// Seal `document` and atomically replace the file at `path`.
///
/// Writes to an owner-only temp file in the same directory, fsyncs it, then
/// renames it over the target. A crash leaves either the old or the new
/// file, never a partial one.
pub fn persist(path: &Path, key: &[u8; KEY_LEN], document: &Document) -> Result<()> {
    let sealed = seal_document(key, document)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&sealed)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    debug!(
        path = %path.display(),
        entries = document.entries.len(),
        bytes = sealed.len(),
        "store file written"
    );
    Ok(())
}
