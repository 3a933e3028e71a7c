// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sbic_core::SbicError;

/// Model-complexity penalty for one run.
///
/// `cp` is `2 * n_features` (a mean and a variance per feature) and `cpw`
/// is the configured weight; both stay fixed for the whole run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BicPenalty {
    pub cp: f64,
    pub cpw: f64,
}

impl BicPenalty {
    pub fn new(n_features: usize, cpw: f64) -> Result<Self, SbicError> {
        if n_features == 0 {
            return Err(SbicError::invalid_input("n_features must be >= 1"));
        }
        if !cpw.is_finite() || cpw < 0.0 {
            return Err(SbicError::invalid_input(format!(
                "cpw must be finite and >= 0.0; got {cpw}"
            )));
        }
        Ok(Self {
            cp: 2.0 * n_features as f64,
            cpw,
        })
    }

    /// `cpw * cp * ln(n_frames)`.
    pub fn value(&self, n_frames: usize) -> f64 {
        self.cpw * self.cp * (n_frames as f64).ln()
    }
}
