//! User input.
//!
//! The shell and the one-shot commands read through [`Prompt`] so they can
//! be driven by a script in tests. [`Terminal`] uses dialoguer when stdin is
//! a terminal and plain line reads when it is piped.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::{Confirm, Input, Password};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Source of user input.
pub trait Prompt {
    /// Whether a human is typing.
    fn is_interactive(&self) -> bool;

    /// Read one line. `None` at end of input.
    fn line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Read a value without echoing it.
    fn secret(&mut self, prompt: &str) -> Result<Zeroizing<String>>;

    /// Ask a yes/no question; defaults to no.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Prompt backed by the process's stdin.
#[derive(Debug)]
pub struct Terminal {
    interactive: bool,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            interactive: io::stdin().is_terminal(),
        }
    }

    fn read_stdin_line() -> Result<Option<String>> {
        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed);
        Ok(Some(buf))
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

/// Ctrl-D at a dialoguer prompt.
fn is_eof(err: &dialoguer::Error) -> bool {
    matches!(err, dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

impl Prompt for Terminal {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        if !self.interactive {
            return Self::read_stdin_line();
        }
        match Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => Ok(Some(line)),
            Err(e) if is_eof(&e) => Ok(None),
            Err(e) => Err(Error::Prompt(e)),
        }
    }

    fn secret(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        if !self.interactive {
            return Ok(Zeroizing::new(Self::read_stdin_line()?.unwrap_or_default()));
        }
        let value = Password::new().with_prompt(prompt).interact()?;
        Ok(Zeroizing::new(value))
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if !self.interactive {
            eprintln!("{} [y/N]", prompt);
            let answer = Self::read_stdin_line()?.unwrap_or_default();
            return Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"));
        }
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}
