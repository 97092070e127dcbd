//! The `snapshot` subcommand: one refresh cycle, printed as JSON.

use std::io::Write;

use clap::Parser;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use roadfeed_core::{EnabledLayers, FeedSource, LayerKey};
use roadfeed_data::HttpFeedSource;
use roadfeed_layers::{AppLifecycle, ControllerConfig, LayerController, LayerSnapshot, RefreshOutcome};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_API_KEY, ARG_BASE_URL, ARG_ENABLE, ARG_TIMEOUT_MS, CliError, FeedOptions, FeedSettings,
};

pub(crate) const ENV_SNAPSHOT_API_KEY: &str = "ROADFEED_CMDS_SNAPSHOT_API_KEY";

/// CLI arguments for the `snapshot` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "snapshot",
    long_about = "Fetch every feed once, normalize the records and print the \
                 resulting layer snapshot. Options can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Run one refresh cycle and print the layer snapshot as JSON"
)]
#[ortho_config(prefix = "ROADFEED")]
pub(crate) struct SnapshotArgs {
    /// Base URL of the traveler-information API.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Static API key appended to every request.
    #[arg(long = ARG_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// Per-request timeout in milliseconds.
    #[arg(long = ARG_TIMEOUT_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) timeout_ms: Option<u64>,
    /// Layers to include; defaults to road conditions and incidents.
    #[arg(long = ARG_ENABLE, alias = "layers", value_name = "layer", value_delimiter = ',')]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) enable: Vec<LayerKey>,
}

impl SnapshotArgs {
    pub(crate) fn into_config(self) -> Result<SnapshotConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SnapshotConfig::try_from(merged)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SnapshotConfig {
    pub(crate) settings: FeedSettings,
}

impl TryFrom<SnapshotArgs> for SnapshotConfig {
    type Error = CliError;

    fn try_from(args: SnapshotArgs) -> Result<Self, Self::Error> {
        let settings = FeedOptions {
            base_url: args.base_url,
            api_key: args.api_key,
            timeout_ms: args.timeout_ms,
            enable: args.enable,
            api_key_env: ENV_SNAPSHOT_API_KEY,
        }
        .into_settings()?;
        Ok(Self { settings })
    }
}

pub(crate) async fn run_snapshot<W: Write>(
    config: SnapshotConfig,
    out: &mut W,
) -> Result<(), CliError> {
    let SnapshotConfig { settings } = config;
    let source = HttpFeedSource::with_config(settings.feed)?;
    let snapshot = capture_snapshot(source, settings.enabled).await?;
    write_snapshot(&snapshot, out)
}

/// Run one refresh over `source` and return the published snapshot.
///
/// Partial failures still produce a snapshot; only a refresh that leaves
/// nothing to show is an error.
pub(crate) async fn capture_snapshot<S: FeedSource + 'static>(
    source: S,
    enabled: EnabledLayers,
) -> Result<LayerSnapshot, CliError> {
    let lifecycle = AppLifecycle::default();
    let controller = LayerController::new(
        source,
        &lifecycle,
        ControllerConfig::default().with_enabled(enabled),
    );
    match controller.refresh().await {
        RefreshOutcome::Applied(report) => {
            if !report.failed_layers.is_empty() {
                warn!("snapshot is missing failed layers: {:?}", report.failed_layers);
            }
            info!("snapshot cached {} entities", report.entity_count);
        }
        RefreshOutcome::Failed(err) => return Err(CliError::Refresh(err)),
        other => warn!("snapshot refresh did not apply: {other:?}"),
    }
    Ok(controller.snapshot())
}

pub(crate) fn write_snapshot<W: Write>(snapshot: &LayerSnapshot, out: &mut W) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, snapshot).map_err(CliError::SerializeSnapshot)?;
    writeln!(out).map_err(CliError::WriteOutput)?;
    out.flush().map_err(CliError::WriteOutput)
}
