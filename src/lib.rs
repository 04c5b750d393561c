//! coffer - an encrypted key-value store unlocked by a Trezor.
//!
//! Secrets live in a single file. The hardware wallet never sees them: it
//! only wraps small fixed-size keys, and every wrap or unwrap needs a
//! button press on the device.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── shell         # Interactive shell (default command)
//! │   ├── secrets       # One-shot list/get/put/rm
//! │   ├── unlock        # Resolve the file and open the store
//! │   ├── prompt        # Terminal input
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # config.toml
//!     ├── encoder/      # Wrap/unwrap backends
//!     │   ├── device    # Transport/Session traits, HardwareEncoder
//!     │   ├── trezorctl # Transport driving the trezorctl CLI
//!     │   └── software  # Insecure stand-in
//!     ├── master        # Master key derivation
//!     ├── cipher        # AES-256-GCM seal/open
//!     ├── envelope      # Whole-file encryption, atomic writes
//!     ├── item          # Per-entry encryption
//!     └── store         # The Store facade
//! ```
//!
//! # Keys
//!
//! - **master key**: the device's wrap of a fixed constant. Encrypts the
//!   whole file. Derived once per open.
//! - **item nonce**: 32 random bytes per entry, used as that entry's
//!   AES-256 key. Stored wrapped by the device.
//!
//! # Limitations
//!
//! A store is bound to the seed of the device that created it. There is no
//! way to move a store to another device short of restoring the same seed;
//! keep a backup of the file and of the device's recovery phrase.
//!
//! The `trezorctl` transport passes payloads on the command line, so a
//! new entry's key is briefly visible to other local users in the process
//! list. See [`core::encoder::Trezorctl`].
//!
//! # Example
//!
//! ```no_run
//! use coffer::core::encoder::SoftwareEncoder;
//! use coffer::Store;
//!
//! let mut store = Store::open("secrets.coffer", SoftwareEncoder::default())?;
//! store.set("login", "hunter2")?;
//! store.sync()?;
//! assert_eq!(*store.get("login")?, "hunter2");
//! # Ok::<(), coffer::Error>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::store::Store;
pub use crate::error::{Error, Result};
