//! Domain types.

mod document;
mod entry;

pub use document::{Document, Entries};
pub use entry::EntryRecord;
