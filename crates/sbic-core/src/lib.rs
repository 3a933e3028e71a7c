// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod error;
pub mod execution_context;
pub mod feature_view;
pub mod observability;
pub mod results;
pub mod segmenter;

pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Diagnostics, PassStats};
pub use error::SbicError;
pub use execution_context::ExecutionContext;
pub use feature_view::{DTypeView, FeatureMatrix, FeatureView, MemoryLayout, Window};
pub use observability::{ProgressSink, TelemetrySink};
pub use results::{ChangePoint, SegmentationResult};
pub use segmenter::OfflineSegmenter;
