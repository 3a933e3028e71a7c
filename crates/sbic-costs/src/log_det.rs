// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sbic_core::Window;

/// Diagonal covariance entries at or below this value use [`LOG_DET_FLOOR`].
pub const VARIANCE_FLOOR: f64 = 1e-5;

/// Per-feature log contribution for (near-)constant features.
pub const LOG_DET_FLOOR: f64 = -5.0;

/// Log-determinant of the diagonal covariance of `window`.
///
/// Cross-feature covariance is ignored, so the determinant is the product of
/// per-feature variances `sum_sq/n - (sum/n)^2`. Features whose variance is
/// not above [`VARIANCE_FLOOR`] contribute [`LOG_DET_FLOOR`] instead of their
/// logarithm. Expect a discontinuity in accuracy near constant input.
///
/// Each row is divided by its largest magnitude and shifted by its first
/// sample before accumulating, and the floor test runs on the logarithm, so
/// any finite input gives a finite result and constant rows floor exactly.
///
/// `window` must hold at least one frame.
pub fn log_det(window: &Window<'_>) -> f64 {
    debug_assert!(!window.is_empty(), "log_det requires a non-empty window");

    let z = 1.0 / window.len() as f64;
    let log_floor = VARIANCE_FLOOR.ln();
    let mut logd = 0.0;
    for feature in 0..window.n_features() {
        let row = window.row(feature);
        let scale = row.iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
        if scale == 0.0 {
            logd += LOG_DET_FLOOR;
            continue;
        }

        let origin = row[0] / scale;
        let (sum, sum_sq) = row.iter().fold((0.0, 0.0), |(s, sq), &x| {
            let y = x / scale - origin;
            (s + y, sq + y * y)
        });
        let mean = sum * z;
        let scaled_var = sum_sq * z - mean * mean;
        // NaN and non-positive variances compare false and take the floor
        let log_var = 2.0 * scale.ln() + scaled_var.ln();
        logd += if scaled_var > 0.0 && log_var > log_floor {
            log_var
        } else {
            LOG_DET_FLOOR
        };
    }
    logd
}
