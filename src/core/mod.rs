//! Core library components.
//!
//! Everything needed to open, read, modify and persist a store, with no
//! terminal interaction.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod encoder;
pub mod envelope;
pub mod item;
pub mod master;
pub mod store;
pub mod types;
