//! Interactive shell.
//!
//! Unlocks the store once, then reads commands until `quit`. Changes stay in
//! memory until `sync`; quitting with unsynced changes asks first. The store
//! is closed whenever the shell exits, also on error.

use std::io::{self, Write};

use tracing::debug;

use crate::cli::prompt::{Prompt, Terminal};
use crate::cli::unlock::{self, Missing};
use crate::cli::{output, Context};
use crate::core::encoder::Encoder;
use crate::core::store::Store;
use crate::error::{Error, Result};

const INTRO: &str = "\
Welcome to the coffer shell. Type help or ? for the command list.

This software comes with NO WARRANTY whatsoever. Use it at your own risk.
Make sure to **backup** your store file.
";

const HELP: &str = "\
Commands:
  list        list all keys
  get KEY     decrypt and display a value
  raw KEY     display the stored record without decrypting
  put KEY     encrypt and store a new value
  del KEY     remove a key
  sync        write changes back to disk
  help        show this help
  quit        leave the shell (also q, exit)
";

const PROMPT: &str = "coffer";

/// Open the store and run the shell on the terminal.
pub fn execute(ctx: &Context) -> Result<()> {
    let mut prompt = Terminal::new();
    let store = unlock::open(ctx, &mut prompt, Missing::AskToCreate)?;
    let stdout = io::stdout();
    ShellSession::new(store, prompt, stdout.lock()).run()
}

/// What the loop does after a command.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// One shell session over an open store.
pub struct ShellSession<E: Encoder, P: Prompt, W: Write> {
    store: Store<E>,
    prompt: P,
    out: W,
}

impl<E: Encoder, P: Prompt, W: Write> ShellSession<E, P, W> {
    pub fn new(store: Store<E>, prompt: P, out: W) -> Self {
        Self { store, prompt, out }
    }

    /// Read and run commands until the user quits or input ends.
    pub fn run(mut self) -> Result<()> {
        let result = self.read_loop();
        self.store.close();
        result
    }

    fn read_loop(&mut self) -> Result<()> {
        writeln!(self.out, "{}", INTRO)?;
        loop {
            let Some(line) = self.prompt.line(PROMPT)? else {
                if !self.store.is_synced() {
                    writeln!(self.out, "End of input, unsynced changes were discarded.")?;
                }
                return Ok(());
            };

            match self.dispatch(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return Ok(()),
                Err(e @ (Error::Prompt(_) | Error::Io(_))) => return Err(e),
                Err(e) => output::error(&e.to_string()),
            }
        }
    }

    fn dispatch(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };
        debug!(command, "shell command");

        match command {
            "" => {}
            "list" | "ls" => self.list()?,
            "get" => self.get(arg)?,
            "raw" => self.raw(arg)?,
            "put" => self.put(arg)?,
            "del" => self.del(arg)?,
            "sync" => self.sync()?,
            "help" | "?" => write!(self.out, "{}", HELP)?,
            "quit" | "q" | "exit" => return self.quit(),
            other => writeln!(
                self.out,
                "Unknown command: {}. Type help for the command list.",
                other
            )?,
        }
        Ok(Flow::Continue)
    }

    fn list(&mut self) -> Result<()> {
        if self.store.is_empty()? {
            writeln!(self.out, "The store is empty.")?;
            return Ok(());
        }
        writeln!(self.out, "Here is the list of all known items:")?;
        for key in self.store.keys()? {
            writeln!(self.out, " - {}", key)?;
        }
        Ok(())
    }

    /// `Some(key)` if `arg` names a stored key, after telling the user why not.
    fn existing_key<'a>(&mut self, arg: &'a str, action: &str) -> Result<Option<&'a str>> {
        if arg.is_empty() {
            writeln!(self.out, "Please provide the key name to {}.", action)?;
            return Ok(None);
        }
        if !self.store.contains(arg)? {
            writeln!(self.out, "There is no such key.")?;
            return Ok(None);
        }
        Ok(Some(arg))
    }

    fn get(&mut self, arg: &str) -> Result<()> {
        let Some(key) = self.existing_key(arg, "display")? else {
            return Ok(());
        };
        if self.store.encoder().confirms_on_device() {
            output::device("Please confirm key decryption on the device.");
        }
        let value = self.store.get(key)?;
        writeln!(self.out, "{}", value.as_str())?;
        Ok(())
    }

    fn raw(&mut self, arg: &str) -> Result<()> {
        let Some(key) = self.existing_key(arg, "display")? else {
            return Ok(());
        };
        let record = self.store.raw(key)?;
        writeln!(self.out, "{}", record)?;
        Ok(())
    }

    fn put(&mut self, key: &str) -> Result<()> {
        if key.is_empty() {
            writeln!(self.out, "Please provide the key name to set.")?;
            return Ok(());
        }
        if self.store.contains(key)? {
            writeln!(
                self.out,
                "For safety reasons, existing keys cannot be modified.\n\
                 Remove it first then create it anew."
            )?;
            return Ok(());
        }

        let value = self
            .prompt
            .secret(&format!("Please provide the value for key \"{}\"", key))?;
        if value.is_empty() {
            writeln!(self.out, "Empty value, nothing was stored.")?;
            return Ok(());
        }
        if self.store.encoder().confirms_on_device() {
            output::device("Please confirm on the device.");
        }
        self.store.set(key, &value)?;
        writeln!(self.out, "Done!")?;
        Ok(())
    }

    fn del(&mut self, arg: &str) -> Result<()> {
        let Some(key) = self.existing_key(arg, "delete")? else {
            return Ok(());
        };
        if self
            .prompt
            .confirm("Are you sure you want to drop that key?")?
        {
            self.store.delete(key)?;
            writeln!(self.out, "Key {} removed.", key)?;
        }
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        if self.store.sync()? {
            writeln!(self.out, "Changes written back to disk.")?;
        } else {
            writeln!(self.out, "No changes were made, there is nothing to write.")?;
        }
        Ok(())
    }

    fn quit(&mut self) -> Result<Flow> {
        if self.store.is_synced() {
            writeln!(self.out, "Bye!")?;
            return Ok(Flow::Exit);
        }
        let leave = self.prompt.confirm(
            "The store was modified but not synced to disk. If you exit now, \
             all your changes will be lost.\n\nAre you sure you want to continue?",
        )?;
        Ok(if leave { Flow::Exit } else { Flow::Continue })
    }
}
