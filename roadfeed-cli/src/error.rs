//! Error types emitted by the roadfeed CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use roadfeed_data::SourceBuildError;
use roadfeed_layers::RefreshError;
use thiserror::Error;

/// Errors emitted by the roadfeed CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// An option was present but unusable.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {message}")]
    Logging { message: String },
    /// The async runtime could not be started.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Constructing the HTTP feed source failed.
    #[error(transparent)]
    BuildSource(#[from] SourceBuildError),
    /// The refresh cycle left no layers to show.
    #[error("refresh failed: {0}")]
    Refresh(#[from] RefreshError),
    /// Serializing the layer snapshot failed.
    #[error("failed to serialize layer snapshot: {0}")]
    SerializeSnapshot(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
