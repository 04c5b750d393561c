//! Opening the store from the command line.

use std::path::Path;

use tracing::info;

use crate::cli::prompt::Prompt;
use crate::cli::{output, Context};
use crate::core::encoder::{Encoder, EncoderBackend};
use crate::core::store::Store;
use crate::error::{Result, UsageError};

/// What to do when the store file does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    /// Fail with `UsageError::MissingStoreFile`.
    Fail,
    /// Ask before starting an empty store (or accept with `--yes`).
    AskToCreate,
}

/// The store file from `--file` or the config.
pub fn store_path(ctx: &Context) -> Result<&Path> {
    ctx.file
        .as_deref()
        .ok_or_else(|| UsageError::NoStoreFile.into())
}

/// Build the configured encoder, confirm creation if needed, and unlock.
///
/// A non-interactive session only creates a file when `--yes` is given.
pub fn open(ctx: &Context, prompt: &mut impl Prompt, missing: Missing) -> Result<Store> {
    let path = store_path(ctx)?;
    let encoder = EncoderBackend::from_config(&ctx.config)?;
    if encoder.is_insecure() {
        output::warn("software encoder in use: this store is NOT protected by a device");
    }

    if !path.exists() {
        let create = match missing {
            Missing::Fail => false,
            Missing::AskToCreate if ctx.yes => true,
            Missing::AskToCreate => {
                prompt.is_interactive()
                    && prompt.confirm(&format!(
                        "{} does not exist. Do you wish to create it?",
                        path.display()
                    ))?
            }
        };
        if !create {
            return Err(UsageError::MissingStoreFile(path.display().to_string()).into());
        }
        info!(path = %path.display(), "starting a new store");
    }

    if encoder.confirms_on_device() {
        output::device("Please confirm file unlock on the device.");
    }
    Store::open(path, encoder)
}
