//! Test support utilities for coffer integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use std::path::PathBuf;

use coffer::core::encoder::SoftwareEncoder;
use coffer::Store;
use tempfile::TempDir;

/// Seed of the software encoder configured for every test environment.
pub const TEST_SEED: &str = "coffer-integration-tests";

/// Test environment with isolated temp directories.
///
/// Each test gets its own working dir (holding the store file) and home
/// dir (holding a config that selects the software encoder). No
/// process-global state is mutated, so tests can run in parallel.
pub struct Test {
    /// Working directory; the store file lives here
    pub dir: TempDir,
    /// Temporary home directory with `config.toml`
    pub home: TempDir,
}

impl Test {
    /// Create an environment with a config but no store file.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        let t = Self { dir, home };

        let config = format!(
            "file = '{}'\n\n[encoder]\nkind = \"software\"\nallow_insecure = true\nseed = \"{}\"\n",
            t.store_path().display(),
            TEST_SEED
        );
        std::fs::write(t.config_path(), config).expect("failed to write config");
        t
    }

    /// Create an environment whose store holds `secrets`, written through
    /// the library.
    pub fn with_secrets(secrets: &[(&str, &str)]) -> Self {
        let t = Self::new();
        let mut store = t.open_store();
        for (k, v) in secrets {
            store.set(k, v).expect("failed to set secret");
        }
        store.sync().expect("failed to sync store");
        t
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.path().join("config.toml")
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("secrets.coffer")
    }

    /// The encoder the CLI uses in this environment.
    pub fn encoder() -> SoftwareEncoder {
        SoftwareEncoder::new(TEST_SEED.as_bytes())
    }

    /// Open the store file directly.
    pub fn open_store(&self) -> Store<SoftwareEncoder> {
        Store::open(self.store_path(), Self::encoder()).expect("failed to open store")
    }
}
