// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod bic;
pub mod log_det;
pub mod penalty;

pub use bic::{WindowBic, delta_bic};
pub use log_det::{LOG_DET_FLOOR, VARIANCE_FLOOR, log_det};
pub use penalty::BicPenalty;

/// Name reported in diagnostics for the diagonal Gaussian model.
pub const COST_MODEL_NAME: &str = "diag_gaussian";
