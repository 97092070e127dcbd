//! Command-line interface for the roadfeed layer pipeline.
//!
//! `snapshot` runs one refresh cycle and prints the published layer snapshot
//! as JSON. `watch` keeps a controller running on its TTL timer and logs a
//! summary after every change until interrupted.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use roadfeed_core::{EnabledLayers, LayerKey};
use roadfeed_data::FeedConfig;
use roadfeed_data::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use std::time::Duration;

mod error;
mod logging;
mod snapshot;
mod watch;

pub use error::CliError;

use snapshot::SnapshotArgs;
use watch::WatchArgs;

pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_API_KEY: &str = "api-key";
pub(crate) const ARG_TIMEOUT_MS: &str = "timeout-ms";
pub(crate) const ARG_ENABLE: &str = "enable";

/// Run the roadfeed CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    logging::init()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    match cli.command {
        Command::Snapshot(args) => {
            let config = args.into_config()?;
            runtime.block_on(snapshot::run_snapshot(config, &mut std::io::stdout().lock()))
        }
        Command::Watch(args) => {
            let config = args.into_config()?;
            runtime.block_on(watch::run_watch(config))
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "roadfeed",
    about = "Fetch and normalize live road-condition feeds into map layers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one refresh cycle and print the layer snapshot as JSON.
    Snapshot(SnapshotArgs),
    /// Keep the layers refreshed on a timer until interrupted.
    Watch(WatchArgs),
}

/// Feed settings shared by every subcommand after configuration merging.
#[derive(Debug, Clone)]
pub(crate) struct FeedSettings {
    pub(crate) feed: FeedConfig,
    pub(crate) enabled: EnabledLayers,
}

/// Raw feed options as they arrive from the merged configuration layers.
pub(crate) struct FeedOptions {
    pub(crate) base_url: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) timeout_ms: Option<u64>,
    pub(crate) enable: Vec<LayerKey>,
    pub(crate) api_key_env: &'static str,
}

impl FeedOptions {
    pub(crate) fn into_settings(self) -> Result<FeedSettings, CliError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_API_KEY,
                env: self.api_key_env,
            })?;
        let timeout = positive_millis(self.timeout_ms, ARG_TIMEOUT_MS)?.unwrap_or(DEFAULT_TIMEOUT);
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let enabled = if self.enable.is_empty() {
            EnabledLayers::default()
        } else {
            EnabledLayers::only(self.enable)
        };
        Ok(FeedSettings {
            feed: FeedConfig::new(base_url, api_key).with_timeout(timeout),
            enabled,
        })
    }
}

/// Interpret an optional millisecond count, rejecting zero.
pub(crate) fn positive_millis(
    value: Option<u64>,
    field: &'static str,
) -> Result<Option<Duration>, CliError> {
    match value {
        Some(0) => Err(CliError::InvalidValue {
            field,
            reason: "must be greater than zero",
        }),
        other => Ok(other.map(Duration::from_millis)),
    }
}

#[cfg(test)]
mod tests;
