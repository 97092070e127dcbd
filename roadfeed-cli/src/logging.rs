//! Log subscriber setup.
//!
//! Library crates emit through the `log` facade; the subscriber bridges those
//! records and writes them to stderr so stdout stays reserved for command
//! output. `RUST_LOG` overrides the default `info` filter.

use tracing_subscriber::EnvFilter;

use crate::CliError;

pub(crate) fn init() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::Logging {
            message: err.to_string(),
        })
}
