//! coffer - encrypted key-value store unlocked by a Trezor.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coffer::cli::output;
use coffer::cli::{execute, Cli};
use coffer::core::constants::LOG_ENV;
use coffer::error::{ConfigError, DeviceError, Error, UsageError};

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("coffer=debug")
        } else {
            EnvFilter::new("coffer=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli) {
        let suggestion = match &e {
            Error::Device(DeviceError::NotFound) => {
                Some("plug in your Trezor, unlock it and try again")
            }
            Error::Device(DeviceError::ToolMissing(_)) => {
                Some("install it with: pip install trezor")
            }
            Error::CorruptFile(_) => Some(
                "make sure this is a coffer file and the device that created it is plugged in",
            ),
            Error::Usage(UsageError::NoStoreFile) => Some("run: coffer --file PATH"),
            Error::Usage(UsageError::MissingStoreFile(_)) => {
                Some("create it with: coffer --file PATH put KEY")
            }
            Error::Config(ConfigError::InsecureEncoder) => {
                Some("set [encoder] kind = \"hardware\" or allow_insecure = true in the config")
            }
            e if e.is_permission_denied() => {
                Some("check the permissions of the store file and its directory")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
