// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{Diagnostics, SbicError};

/// A detected boundary and the BIC differential measured there.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChangePoint {
    /// Frame index of the last frame of the left-hand segment.
    pub frame: usize,
    pub delta_bic: f64,
}

/// Output of a segmentation run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationResult {
    /// Ordered change points; empty means the whole input is one segment.
    pub change_points: Vec<ChangePoint>,
    /// Concatenated BIC differential trace of the coarse pass.
    pub bic_values: Vec<f64>,
    pub diagnostics: Diagnostics,
}

impl SegmentationResult {
    pub fn new(
        change_points: Vec<ChangePoint>,
        bic_values: Vec<f64>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            change_points,
            bic_values,
            diagnostics,
        }
    }

    pub fn frames(&self) -> Vec<usize> {
        self.change_points.iter().map(|cp| cp.frame).collect()
    }

    /// Change-point positions in frames, as real numbers.
    pub fn segmentation(&self) -> Vec<f64> {
        self.change_points.iter().map(|cp| cp.frame as f64).collect()
    }

    /// BIC differential at each change point, index-aligned with [`Self::segmentation`].
    pub fn seg_values(&self) -> Vec<f64> {
        self.change_points.iter().map(|cp| cp.delta_bic).collect()
    }

    /// Converts change-point frames to seconds: `frame * hop_size / sample_rate`.
    pub fn to_seconds(&self, hop_size: usize, sample_rate: f64) -> Result<Vec<f64>, SbicError> {
        if hop_size == 0 {
            return Err(SbicError::invalid_input("hop_size must be >= 1"));
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SbicError::invalid_input(format!(
                "sample_rate must be finite and > 0.0; got {sample_rate}"
            )));
        }
        let seconds_per_frame = hop_size as f64 / sample_rate;
        Ok(self
            .change_points
            .iter()
            .map(|cp| cp.frame as f64 * seconds_per_frame)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangePoint, SegmentationResult};
    use crate::Diagnostics;

    fn result() -> SegmentationResult {
        SegmentationResult::new(
            vec![
                ChangePoint {
                    frame: 99,
                    delta_bic: -12.5,
                },
                ChangePoint {
                    frame: 199,
                    delta_bic: -3.0,
                },
            ],
            vec![1.0, -12.5, 4.0],
            Diagnostics::default(),
        )
    }

    #[test]
    fn accessors_keep_index_alignment() {
        let result = result();
        assert_eq!(result.frames(), vec![99, 199]);
        assert_eq!(result.segmentation(), vec![99.0, 199.0]);
        assert_eq!(result.seg_values(), vec![-12.5, -3.0]);
    }

    #[test]
    fn to_seconds_uses_hop_and_sample_rate() {
        let seconds = result()
            .to_seconds(512, 44_100.0)
            .expect("conversion should succeed");
        assert!((seconds[0] - 99.0 * 512.0 / 44_100.0).abs() < 1e-12);
        assert!((seconds[1] - 199.0 * 512.0 / 44_100.0).abs() < 1e-12);
    }

    #[test]
    fn to_seconds_rejects_bad_units() {
        let result = result();
        assert!(result.to_seconds(0, 44_100.0).is_err());
        let err = result
            .to_seconds(512, 0.0)
            .expect_err("zero sample rate must fail");
        assert!(err.to_string().contains("sample_rate"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn result_serde_roundtrip() {
        let result = result();
        let encoded = serde_json::to_string(&result).expect("result should serialize");
        let decoded: SegmentationResult =
            serde_json::from_str(&encoded).expect("result should deserialize");
        assert_eq!(decoded, result);
    }
}
