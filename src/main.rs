//! Coffer - identifier-scoped secure storage for small secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use coffer::cli::output;
use coffer::cli::{execute, Cli};
use coffer::core::constants;
use coffer::ErrorKind;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(constants::LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("coffer=debug")
        } else {
            EnvFilter::new("coffer=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.config) {
        let suggestion = match e.kind() {
            ErrorKind::NotAccessible => Some("unlock the device and retry"),
            ErrorKind::Config => Some("fix the config file, then run: coffer check"),
            ErrorKind::KeyInQueryResultAlreadyExistsInDestination => {
                Some("remove the conflicting key from the destination, then retry")
            }
            ErrorKind::NoItemsToMigrateFound => Some("check --from, --from-accessibility and --from-device-local"),
            ErrorKind::Unsupported => {
                Some("user-presence stores cannot list keys, and some vaults lack enclave-backed tiers; run: coffer check")
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
