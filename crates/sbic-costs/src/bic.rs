// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::log_det::log_det;
use crate::penalty::BicPenalty;
use sbic_core::{SbicError, Window};

/// BIC differential of splitting `window` at `split` versus keeping it whole.
///
/// The left half is `[0, split)` and the right half `[split, len)`, both
/// relative to the window:
///
/// `0.5 * (n1*logdet(left) + n2*logdet(right) - n*logdet(whole) + penalty(n))`
///
/// Negative values favour two models over one.
pub fn delta_bic(window: &Window<'_>, split: usize, penalty: &BicPenalty) -> Result<f64, SbicError> {
    WindowBic::new(window, penalty).evaluate(split)
}

/// Evaluates many splits of one window against a single whole-window fit.
#[derive(Clone, Copy, Debug)]
pub struct WindowBic<'m> {
    window: Window<'m>,
    whole_term: f64,
    penalty_term: f64,
}

impl<'m> WindowBic<'m> {
    pub fn new(window: &Window<'m>, penalty: &BicPenalty) -> Self {
        let n = window.len();
        let (whole_term, penalty_term) = if n == 0 {
            (0.0, 0.0)
        } else {
            (n as f64 * log_det(window), penalty.value(n))
        };
        Self {
            window: *window,
            whole_term,
            penalty_term,
        }
    }

    pub fn evaluate(&self, split: usize) -> Result<f64, SbicError> {
        let n = self.window.len();
        if split == 0 || split >= n {
            return Err(SbicError::invalid_input(format!(
                "split must leave both halves non-empty: split={split}, window_len={n}"
            )));
        }

        let (left, right) = self.window.split_at(split);
        let n1 = left.len() as f64;
        let n2 = right.len() as f64;
        let value =
            0.5 * (n1 * log_det(&left) + n2 * log_det(&right) - self.whole_term + self.penalty_term);
        if !value.is_finite() {
            return Err(SbicError::numerical_issue(format!(
                "non-finite BIC differential at split={split} of window [{}, {}): {value}",
                self.window.start(),
                self.window.end()
            )));
        }
        Ok(value)
    }
}
