// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::borrow::Cow;

/// Diagnostics schema version for segmentation run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Change-point counts after each pass plus work counters.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub coarse_change_points: usize,
    pub refined_change_points: usize,
    pub validated_change_points: usize,
    pub windows_evaluated: usize,
    pub delta_bic_evals: usize,
}

/// Structured diagnostics captured from a segmentation run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub n_features: usize,
    pub n_frames: usize,
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub algorithm: Cow<'static, str>,
    pub cost_model: Cow<'static, str>,
    #[cfg(feature = "serde")]
    pub params_json: Option<serde_json::Value>,
    pub pass_stats: Option<PassStats>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            n_features: 0,
            n_frames: 0,
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            runtime_ms: None,
            notes: vec![],
            warnings: vec![],
            algorithm: Cow::Borrowed(""),
            cost_model: Cow::Borrowed(""),
            #[cfg(feature = "serde")]
            params_json: None,
            pass_stats: None,
        }
    }
}
