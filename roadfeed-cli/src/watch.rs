//! The `watch` subcommand: keep the layers refreshed until interrupted.

use std::future::Future;

use clap::Parser;
use log::{error, info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use roadfeed_core::{FeedSource, LayerKey};
use roadfeed_data::HttpFeedSource;
use roadfeed_layers::{AppLifecycle, ControllerConfig, DEFAULT_TTL, LayerController, LayerSnapshot};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_API_KEY, ARG_BASE_URL, ARG_ENABLE, ARG_TIMEOUT_MS, CliError, FeedOptions, FeedSettings,
    positive_millis,
};

pub(crate) const ARG_TTL_MS: &str = "ttl-ms";
pub(crate) const ARG_MANUAL: &str = "manual";
pub(crate) const ENV_WATCH_API_KEY: &str = "ROADFEED_CMDS_WATCH_API_KEY";

/// CLI arguments for the `watch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "watch",
    long_about = "Start a layer controller, refresh on its TTL timer and log a \
                 summary of every published snapshot until Ctrl-C. Options can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Keep the layers refreshed on a timer until interrupted"
)]
#[ortho_config(prefix = "ROADFEED")]
pub(crate) struct WatchArgs {
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
    /// Interval between timed refreshes in milliseconds.
    #[arg(long = ARG_TTL_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) ttl_ms: Option<u64>,
    /// Refresh once on start only, with no timer.
    #[arg(long = ARG_MANUAL)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) manual: bool,
    /// Layers to include; defaults to road conditions and incidents.
    #[arg(long = ARG_ENABLE, alias = "layers", value_name = "layer", value_delimiter = ',')]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) enable: Vec<LayerKey>,
}

impl WatchArgs {
    pub(crate) fn into_config(self) -> Result<WatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        WatchConfig::try_from(merged)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct WatchConfig {
    pub(crate) settings: FeedSettings,
    pub(crate) controller: ControllerConfig,
    pub(crate) auto_refresh: bool,
}

impl TryFrom<WatchArgs> for WatchConfig {
    type Error = CliError;

    fn try_from(args: WatchArgs) -> Result<Self, Self::Error> {
        let ttl = positive_millis(args.ttl_ms, ARG_TTL_MS)?.unwrap_or(DEFAULT_TTL);
        let settings = FeedOptions {
            base_url: args.base_url,
            api_key: args.api_key,
            timeout_ms: args.timeout_ms,
            enable: args.enable,
            api_key_env: ENV_WATCH_API_KEY,
        }
        .into_settings()?;
        let controller = ControllerConfig::default()
            .with_ttl(ttl)
            .with_enabled(settings.enabled.clone());
        Ok(Self {
            settings,
            controller,
            auto_refresh: !args.manual,
        })
    }
}

pub(crate) async fn run_watch(config: WatchConfig) -> Result<(), CliError> {
    let WatchConfig {
        settings,
        controller,
        auto_refresh,
    } = config;
    let source = HttpFeedSource::with_config(settings.feed)?;
    watch_until(source, controller, auto_refresh, ctrl_c()).await;
    Ok(())
}

/// Drive a controller over `source` until `shutdown` resolves, logging each
/// published snapshot. Returns the number of snapshots observed.
pub(crate) async fn watch_until<S, F>(
    source: S,
    config: ControllerConfig,
    auto_refresh: bool,
    shutdown: F,
) -> usize
where
    S: FeedSource + 'static,
    F: Future<Output = ()>,
{
    let lifecycle = AppLifecycle::default();
    let controller = LayerController::new(source, &lifecycle, config);
    let mut updates = controller.subscribe();
    let mut observed = 0;
    controller.start(auto_refresh);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                info!("stopping layer watch");
                break;
            }

            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                log_summary(&snapshot);
                observed += 1;
            }
        }
    }

    controller.stop().await;
    observed
}

fn log_summary(snapshot: &LayerSnapshot) {
    if snapshot.is_loading {
        info!("refreshing layers");
        return;
    }
    match &snapshot.error {
        Some(message) => warn!(
            "refresh failed ({message}); showing {} overlays and {} markers from the last good cycle",
            snapshot.overlays.len(),
            snapshot.markers.len()
        ),
        None => info!(
            "layers updated: {} overlays, {} markers",
            snapshot.overlays.len(),
            snapshot.markers.len()
        ),
    }
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {err}");
    }
}
