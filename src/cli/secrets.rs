//! One-shot commands (list, get, put, rm).
//!
//! Each command unlocks the store, does one thing and, if it changed
//! anything, syncs before returning.

use std::io::{self, Write};

use crate::cli::prompt::{Prompt, Terminal};
use crate::cli::unlock::{self, Missing};
use crate::cli::{output, Context};
use crate::core::encoder::Encoder;
use crate::error::{Error, Result, UsageError};

/// List stored keys.
pub fn list(ctx: &Context, json: bool) -> Result<()> {
    let store = unlock::open(ctx, &mut Terminal::new(), Missing::Fail)?;
    let keys: Vec<&str> = store.keys()?.collect();

    if json {
        let output = serde_json::json!({
            "keys": keys,
            "count": keys.len()
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if keys.is_empty() {
        output::dimmed("no secrets stored");
    } else {
        let mut stdout = io::stdout().lock();
        for key in keys {
            writeln!(stdout, "{}", key)?;
        }
    }
    Ok(())
}

/// Print a value, or its stored record with `no_decrypt`.
pub fn get(ctx: &Context, key: &str, no_decrypt: bool) -> Result<()> {
    let store = unlock::open(ctx, &mut Terminal::new(), Missing::Fail)?;

    if no_decrypt {
        println!("{}", store.raw(key)?);
        return Ok(());
    }

    if !store.contains(key)? {
        return Err(Error::KeyNotFound(key.to_string()));
    }
    if store.encoder().confirms_on_device() {
        output::device("Please confirm key decryption on the device.");
    }
    let value = store.get(key)?;
    println!("{}", value.as_str());
    Ok(())
}

/// Add a new entry and sync.
///
/// The value comes from a hidden prompt, or from the first line of stdin
/// when it is piped.
pub fn put(ctx: &Context, key: &str) -> Result<()> {
    let mut prompt = Terminal::new();
    let mut store = unlock::open(ctx, &mut prompt, Missing::AskToCreate)?;

    if store.contains(key)? {
        output::hint("existing keys cannot be modified, remove it first with: coffer rm");
        return Err(UsageError::KeyExists(key.to_string()).into());
    }

    let value = prompt.secret(&format!("Value for {}", output::key(key)))?;
    if value.is_empty() {
        return Err(UsageError::EmptyValue(key.to_string()).into());
    }

    if store.encoder().confirms_on_device() {
        output::device("Please confirm on the device.");
    }
    store.set(key, &value)?;
    store.sync()?;
    output::success(&format!("added {}", output::key(key)));
    Ok(())
}

/// Delete an entry and sync.
pub fn rm(ctx: &Context, key: &str) -> Result<()> {
    let mut prompt = Terminal::new();
    let mut store = unlock::open(ctx, &mut prompt, Missing::Fail)?;

    if !store.contains(key)? {
        return Err(Error::KeyNotFound(key.to_string()));
    }
    let confirmed = ctx.yes
        || prompt.confirm(&format!("Remove {} from {}?", key, output::path(store.path())))?;
    if !confirmed {
        output::dimmed("cancelled");
        return Ok(());
    }

    store.delete(key)?;
    store.sync()?;
    output::success(&format!("removed {}", output::key(key)));
    Ok(())
}
