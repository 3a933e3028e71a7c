// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sbic_core::{
    ExecutionContext, FeatureView, OfflineSegmenter, SbicError, SegmentationResult,
};
use sbic_offline::{Sbic, SbicConfig};

/// Segments `x` with `config` and records the configuration in the diagnostics.
pub fn run_segmentation(
    x: &FeatureView<'_>,
    config: &SbicConfig,
    ctx: &ExecutionContext<'_>,
) -> Result<SegmentationResult, SbicError> {
    let mut result = Sbic::new(config.clone())?.compute(x, ctx)?;
    result.diagnostics.params_json = serde_json::to_value(config).ok();
    Ok(result)
}

/// Parses a JSON config (missing fields take their defaults) and segments `x`.
pub fn run_segmentation_json(
    x: &FeatureView<'_>,
    config_json: &str,
    ctx: &ExecutionContext<'_>,
) -> Result<SegmentationResult, SbicError> {
    let config: SbicConfig = serde_json::from_str(config_json)
        .map_err(|err| SbicError::invalid_input(format!("invalid config JSON: {err}")))?;
    run_segmentation(x, &config, ctx)
}
