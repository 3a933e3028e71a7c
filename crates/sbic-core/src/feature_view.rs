// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::SbicError;

/// Borrowed numeric data view over either f32 or f64 values.
#[derive(Clone, Copy, Debug)]
pub enum DTypeView<'a> {
    F32(&'a [f32]),
    F64(&'a [f64]),
}

impl DTypeView<'_> {
    fn len(&self) -> usize {
        match self {
            Self::F32(values) => values.len(),
            Self::F64(values) => values.len(),
        }
    }

    fn get(&self, idx: usize) -> Option<f64> {
        match self {
            Self::F32(values) => values.get(idx).map(|v| f64::from(*v)),
            Self::F64(values) => values.get(idx).copied(),
        }
    }
}

/// Memory layout of the underlying buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemoryLayout {
    /// One contiguous row per feature: `values[feature * n_frames + frame]`.
    #[default]
    FeatureMajor,
    /// One contiguous row per frame: `values[frame * n_features + feature]`.
    FrameMajor,
}

/// Zero-copy view over a features x frames matrix.
#[derive(Clone, Copy, Debug)]
pub struct FeatureView<'a> {
    pub values: DTypeView<'a>,
    pub n_features: usize,
    pub n_frames: usize,
    pub layout: MemoryLayout,
}

impl<'a> FeatureView<'a> {
    /// Constructs a validated `FeatureView`.
    pub fn new(
        values: DTypeView<'a>,
        n_features: usize,
        n_frames: usize,
        layout: MemoryLayout,
    ) -> Result<Self, SbicError> {
        if n_features == 0 {
            return Err(SbicError::invalid_input("n_features must be >= 1"));
        }
        if n_frames == 0 {
            return Err(SbicError::invalid_input("n_frames must be >= 1"));
        }

        let expected_len = n_features.checked_mul(n_frames).ok_or_else(|| {
            SbicError::invalid_input("n_features*n_frames overflow while validating shape")
        })?;
        let value_len = values.len();
        if value_len != expected_len {
            return Err(SbicError::invalid_input(format!(
                "value length mismatch: got {value_len}, expected {expected_len} (n_features={n_features}, n_frames={n_frames})"
            )));
        }

        let non_finite = match values {
            DTypeView::F32(slice) => slice.iter().position(|v| !v.is_finite()),
            DTypeView::F64(slice) => slice.iter().position(|v| !v.is_finite()),
        };
        if let Some(idx) = non_finite {
            return Err(SbicError::invalid_input(format!(
                "feature values must be finite: index {idx} is not"
            )));
        }

        Ok(Self {
            values,
            n_features,
            n_frames,
            layout,
        })
    }

    /// Convenience constructor for f32-backed data.
    pub fn from_f32(
        values: &'a [f32],
        n_features: usize,
        n_frames: usize,
        layout: MemoryLayout,
    ) -> Result<Self, SbicError> {
        Self::new(DTypeView::F32(values), n_features, n_frames, layout)
    }

    /// Convenience constructor for f64-backed data.
    pub fn from_f64(
        values: &'a [f64],
        n_features: usize,
        n_frames: usize,
        layout: MemoryLayout,
    ) -> Result<Self, SbicError> {
        Self::new(DTypeView::F64(values), n_features, n_frames, layout)
    }

    /// Reads one value as f64.
    pub fn value(&self, feature: usize, frame: usize) -> Result<f64, SbicError> {
        if feature >= self.n_features || frame >= self.n_frames {
            return Err(SbicError::invalid_input(format!(
                "index out of bounds: feature={feature}, frame={frame}, shape=({}, {})",
                self.n_features, self.n_frames
            )));
        }
        let idx = match self.layout {
            MemoryLayout::FeatureMajor => feature * self.n_frames + frame,
            MemoryLayout::FrameMajor => frame * self.n_features + feature,
        };
        self.values
            .get(idx)
            .ok_or_else(|| SbicError::invalid_input("feature view index out of bounds"))
    }
}

/// Owned feature-major f64 copy of a [`FeatureView`].
///
/// Built once per run so every window evaluation reads contiguous rows.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    values: Vec<f64>,
    n_features: usize,
    n_frames: usize,
}

impl FeatureMatrix {
    pub fn from_view(x: &FeatureView<'_>) -> Result<Self, SbicError> {
        let mut values = Vec::with_capacity(x.n_features * x.n_frames);
        match (x.values, x.layout) {
            (DTypeView::F64(slice), MemoryLayout::FeatureMajor) => {
                values.extend_from_slice(slice);
            }
            (DTypeView::F32(slice), MemoryLayout::FeatureMajor) => {
                values.extend(slice.iter().map(|v| f64::from(*v)));
            }
            (_, MemoryLayout::FrameMajor) => {
                for feature in 0..x.n_features {
                    for frame in 0..x.n_frames {
                        values.push(x.value(feature, frame)?);
                    }
                }
            }
        }

        Ok(Self {
            values,
            n_features: x.n_features,
            n_frames: x.n_frames,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_frames(&self) -> usize {
        self.n_frames
    }

    /// All frames of one feature.
    pub fn row(&self, feature: usize) -> &[f64] {
        let start = feature * self.n_frames;
        &self.values[start..start + self.n_frames]
    }

    /// Frame range `[start, end)` over all features.
    ///
    /// Bounds are clamped to the matrix, and `start` to `end`.
    pub fn window(&self, start: usize, end: usize) -> Window<'_> {
        let end = end.min(self.n_frames);
        Window {
            matrix: self,
            start: start.min(end),
            end,
        }
    }

    /// The whole matrix as a single window.
    pub fn full(&self) -> Window<'_> {
        self.window(0, self.n_frames)
    }
}

/// Borrowed frame range of a [`FeatureMatrix`].
#[derive(Clone, Copy, Debug)]
pub struct Window<'m> {
    matrix: &'m FeatureMatrix,
    start: usize,
    end: usize,
}

impl<'m> Window<'m> {
    /// Absolute index of the first frame.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute index one past the last frame.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn n_features(&self) -> usize {
        self.matrix.n_features
    }

    pub fn row(&self, feature: usize) -> &'m [f64] {
        &self.matrix.row(feature)[self.start..self.end]
    }

    /// Splits into `[0, offset)` and `[offset, len)` relative to the window.
    pub fn split_at(&self, offset: usize) -> (Window<'m>, Window<'m>) {
        let mid = self.start + offset.min(self.len());
        (
            Window {
                matrix: self.matrix,
                start: self.start,
                end: mid,
            },
            Window {
                matrix: self.matrix,
                start: mid,
                end: self.end,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{DTypeView, FeatureMatrix, FeatureView, MemoryLayout};

    #[test]
    fn new_rejects_empty_shapes_and_length_mismatch() {
        let values = [1.0_f64, 2.0, 3.0, 4.0];
        let err = FeatureView::from_f64(&values, 0, 4, MemoryLayout::FeatureMajor)
            .expect_err("zero features must fail");
        assert!(err.to_string().contains("n_features"));

        let err = FeatureView::from_f64(&values, 4, 0, MemoryLayout::FeatureMajor)
            .expect_err("zero frames must fail");
        assert!(err.to_string().contains("n_frames"));

        let err = FeatureView::from_f64(&values, 3, 2, MemoryLayout::FeatureMajor)
            .expect_err("length mismatch must fail");
        assert!(err.to_string().contains("value length mismatch"));
    }

    #[test]
    fn new_rejects_non_finite_values() {
        let values = [1.0_f32, f32::NAN, 3.0, 4.0];
        let err = FeatureView::new(DTypeView::F32(&values), 2, 2, MemoryLayout::FeatureMajor)
            .expect_err("NaN must fail");
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn frame_major_is_transposed_into_feature_rows() {
        // three frames of two features each
        let values = [1.0_f64, 10.0, 2.0, 20.0, 3.0, 30.0];
        let view = FeatureView::from_f64(&values, 2, 3, MemoryLayout::FrameMajor)
            .expect("view should be valid");
        assert_eq!(view.value(1, 2).expect("in bounds"), 30.0);

        let matrix = FeatureMatrix::from_view(&view).expect("matrix should build");
        assert_eq!(matrix.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(matrix.row(1), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn f32_feature_major_is_widened() {
        let values = [0.5_f32, 1.5, 2.5, 3.5];
        let view = FeatureView::from_f32(&values, 2, 2, MemoryLayout::FeatureMajor)
            .expect("view should be valid");
        let matrix = FeatureMatrix::from_view(&view).expect("matrix should build");
        assert_eq!(matrix.row(1), &[2.5, 3.5]);
    }

    #[test]
    fn windows_clamp_and_split() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let view = FeatureView::from_f64(&values, 1, 10, MemoryLayout::FeatureMajor)
            .expect("view should be valid");
        let matrix = FeatureMatrix::from_view(&view).expect("matrix should build");

        let window = matrix.window(3, 50);
        assert_eq!((window.start(), window.end(), window.len()), (3, 10, 7));
        assert_eq!(window.row(0), &[3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);

        let (left, right) = window.split_at(2);
        assert_eq!(left.row(0), &[3.0, 4.0]);
        assert_eq!(right.start(), 5);
        assert_eq!(right.len(), 5);

        assert!(matrix.window(12, 4).is_empty());
        assert_eq!(matrix.full().len(), 10);
    }
}
