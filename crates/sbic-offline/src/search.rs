// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sbic_core::{SbicError, Window};
use sbic_costs::{BicPenalty, WindowBic};

/// Best split found by [`change_search`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoundChange {
    /// Absolute frame index of the last frame of the left half.
    pub frame: usize,
    pub delta_bic: f64,
    /// Index of this candidate in [`SearchOutcome::curve`].
    pub sample: usize,
}

/// Result of scanning one window.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    /// `Some` only when the minimal differential is negative.
    pub change: Option<FoundChange>,
    /// Differential at every scanned candidate, in scan order.
    pub curve: Vec<f64>,
}

/// Scans every `inc`-th interior position of `window` for the split with the
/// smallest BIC differential.
///
/// Candidates start at local position `inc - 1` and must leave at least `inc`
/// frames to their right, so windows shorter than `2 * inc` produce an empty
/// curve. The first minimum in scan order wins.
pub fn change_search(
    window: &Window<'_>,
    inc: usize,
    penalty: &BicPenalty,
) -> Result<SearchOutcome, SbicError> {
    if inc == 0 {
        return Err(SbicError::invalid_input("search step must be >= 1"));
    }

    let n = window.len();
    let evaluator = WindowBic::new(window, penalty);
    let mut curve = Vec::with_capacity(n / inc);
    let mut best: Option<(usize, usize, f64)> = None;

    let mut shift = inc - 1;
    while shift + inc < n {
        let value = evaluator.evaluate(shift + 1)?;
        if best.is_none_or(|(_, _, dmin)| value < dmin) {
            best = Some((shift, curve.len(), value));
        }
        curve.push(value);
        shift += inc;
    }

    let change = best
        .filter(|&(_, _, dmin)| dmin < 0.0)
        .map(|(shift, sample, delta_bic)| FoundChange {
            frame: window.start() + shift,
            delta_bic,
            sample,
        });

    Ok(SearchOutcome { change, curve })
}

#[cfg(test)]
mod tests {
    use super::change_search;
    use sbic_core::{FeatureMatrix, FeatureView, MemoryLayout};
    use sbic_costs::BicPenalty;

    fn blocks(n_features: usize, lengths: &[(usize, f64)]) -> FeatureMatrix {
        let n_frames: usize = lengths.iter().map(|(len, _)| len).sum();
        let mut values = Vec::with_capacity(n_features * n_frames);
        for _ in 0..n_features {
            for &(len, level) in lengths {
                values.extend(std::iter::repeat_n(level, len));
            }
        }
        let view = FeatureView::from_f64(&values, n_features, n_frames, MemoryLayout::FeatureMajor)
            .expect("test view should be valid");
        FeatureMatrix::from_view(&view).expect("test matrix should build")
    }

    #[test]
    fn finds_the_boundary_between_two_constant_blocks() {
        let m = blocks(2, &[(50, 0.0), (50, 10.0)]);
        let penalty = BicPenalty::new(2, 1.0).expect("penalty should be valid");
        let outcome = change_search(&m.full(), 2, &penalty).expect("search should succeed");

        let found = outcome.change.expect("boundary should be found");
        assert_eq!(found.frame, 49);
        assert!(found.delta_bic < 0.0);
        assert_eq!(outcome.curve[found.sample], found.delta_bic);
        assert!(outcome.curve.iter().all(|v| *v >= found.delta_bic));
        // shifts 1, 3, ..., 97
        assert_eq!(outcome.curve.len(), 49);
    }

    #[test]
    fn reported_frame_is_offset_by_window_start() {
        let m = blocks(1, &[(30, 0.0), (30, 10.0)]);
        let penalty = BicPenalty::new(1, 1.0).expect("penalty should be valid");
        let outcome = change_search(&m.window(10, 60), 1, &penalty).expect("search should succeed");
        assert_eq!(outcome.change.map(|c| c.frame), Some(29));
    }

    #[test]
    fn constant_window_reports_no_change() {
        let m = blocks(3, &[(64, 4.2)]);
        let penalty = BicPenalty::new(3, 1.0).expect("penalty should be valid");
        let outcome = change_search(&m.full(), 4, &penalty).expect("search should succeed");
        assert!(outcome.change.is_none());
        assert!(outcome.curve.iter().all(|v| *v > 0.0));
    }

    #[test]
    fn zero_minimum_is_not_a_change() {
        let m = blocks(1, &[(20, 1.0)]);
        let penalty = BicPenalty::new(1, 0.0).expect("penalty should be valid");
        let outcome = change_search(&m.full(), 1, &penalty).expect("search should succeed");
        assert!(outcome.curve.iter().all(|v| *v == 0.0));
        assert!(outcome.change.is_none());
    }

    #[test]
    fn narrow_windows_have_no_candidates() {
        let m = blocks(1, &[(2, 0.0), (3, 10.0)]);
        let penalty = BicPenalty::new(1, 1.0).expect("penalty should be valid");
        let outcome = change_search(&m.full(), 3, &penalty).expect("search should succeed");
        assert!(outcome.curve.is_empty());
        assert!(outcome.change.is_none());

        let single = change_search(&m.window(2, 3), 1, &penalty).expect("search should succeed");
        assert!(single.curve.is_empty());
    }

    #[test]
    fn candidates_leave_inc_frames_on_the_right() {
        let m = blocks(1, &[(10, 0.0), (10, 5.0)]);
        let penalty = BicPenalty::new(1, 1.0).expect("penalty should be valid");
        // shifts 4, 9, 14 (19 would leave no frames on the right)
        let outcome = change_search(&m.full(), 5, &penalty).expect("search should succeed");
        assert_eq!(outcome.curve.len(), 3);
        assert_eq!(outcome.change.map(|c| c.frame), Some(9));
    }

    #[test]
    fn first_minimum_wins_ties() {
        // symmetric pattern: splits after frame 1 and frame 5 score identically
        let m = blocks(1, &[(2, 0.0), (4, 10.0), (2, 0.0)]);
        let penalty = BicPenalty::new(1, 0.0).expect("penalty should be valid");
        let outcome = change_search(&m.full(), 1, &penalty).expect("search should succeed");
        let found = outcome.change.expect("a change should be found");
        assert_eq!(outcome.curve[1], outcome.curve[5]);
        assert_eq!(found.frame, 1);
        assert_eq!(found.sample, 1);
    }

    #[test]
    fn zero_step_is_rejected() {
        let m = blocks(1, &[(4, 0.0)]);
        let penalty = BicPenalty::new(1, 1.0).expect("penalty should be valid");
        assert!(change_search(&m.full(), 0, &penalty).is_err());
    }
}
