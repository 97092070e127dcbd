//! Test helpers simulating configuration file and environment layers.

use super::*;
use crate::snapshot::{SnapshotArgs, SnapshotConfig};

#[derive(Debug, Clone, Default)]
pub(super) struct LayerOverrides {
    pub(super) base_url: Option<String>,
    pub(super) api_key: Option<String>,
    pub(super) timeout_ms: Option<u64>,
}

/// Fill unset CLI values from the environment layer, then the file layer.
pub(super) fn merge_layers(
    mut cli_args: SnapshotArgs,
    file_layer: Option<LayerOverrides>,
    env_layer: Option<LayerOverrides>,
) -> Result<SnapshotConfig, CliError> {
    merge_field(
        &mut cli_args.base_url,
        extract_field(&env_layer, |layer| &layer.base_url),
        extract_field(&file_layer, |layer| &layer.base_url),
    );
    merge_field(
        &mut cli_args.api_key,
        extract_field(&env_layer, |layer| &layer.api_key),
        extract_field(&file_layer, |layer| &layer.api_key),
    );
    merge_field(
        &mut cli_args.timeout_ms,
        extract_field(&env_layer, |layer| &layer.timeout_ms),
        extract_field(&file_layer, |layer| &layer.timeout_ms),
    );
    SnapshotConfig::try_from(cli_args)
}

fn merge_field<T: Clone>(target: &mut Option<T>, env_value: Option<T>, file_value: Option<T>) {
    if target.is_none()
        && let Some(value) = env_value.or(file_value)
    {
        *target = Some(value);
    }
}

fn extract_field<T: Clone>(
    layer: &Option<LayerOverrides>,
    accessor: fn(&LayerOverrides) -> &Option<T>,
) -> Option<T> {
    layer.as_ref().and_then(|entry| accessor(entry).clone())
}
