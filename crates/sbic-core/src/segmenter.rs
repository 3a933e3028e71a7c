// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{ExecutionContext, FeatureView, SbicError, SegmentationResult};

/// Offline segmenter contract: full feature matrix in, full result out.
pub trait OfflineSegmenter {
    fn compute(
        &self,
        x: &FeatureView<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<SegmentationResult, SbicError>;
}
