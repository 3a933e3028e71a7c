// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::search::{SearchOutcome, change_search};
use sbic_core::{
    ChangePoint, Diagnostics, ExecutionContext, FeatureMatrix, FeatureView, OfflineSegmenter,
    PassStats, SbicError, SegmentationResult,
};
use sbic_costs::{BicPenalty, COST_MODEL_NAME, delta_bic};
use std::borrow::Cow;
use std::time::Instant;

const DEFAULT_SIZE1: usize = 300;
const DEFAULT_INC1: usize = 60;
const DEFAULT_SIZE2: usize = 200;
const DEFAULT_INC2: usize = 20;
const DEFAULT_CPW: f64 = 1.5;

/// Scan step used by the fine pass.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FineStep {
    /// Reuse `inc1`, as the reference engine always has.
    #[default]
    Coarse,
    /// Use `inc2`.
    Fine,
}

/// How the coarse pass advances when a window holds no change.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoarseWindow {
    /// Move to the next non-overlapping block of `size1` frames.
    #[default]
    Sliding,
    /// Keep the start at the last restart point and extend the end by `size1`,
    /// as the reference engine does.
    Anchored,
}

/// Configuration for [`Sbic`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct SbicConfig {
    /// Coarse window length in frames.
    pub size1: usize,
    /// Coarse scan step in frames.
    pub inc1: usize,
    /// Fine window length in frames.
    pub size2: usize,
    /// Fine scan step in frames, used only with [`FineStep::Fine`].
    pub inc2: usize,
    /// Penalty weight.
    pub cpw: f64,
    pub fine_step: FineStep,
    pub coarse_window: CoarseWindow,
}

impl Default for SbicConfig {
    fn default() -> Self {
        Self {
            size1: DEFAULT_SIZE1,
            inc1: DEFAULT_INC1,
            size2: DEFAULT_SIZE2,
            inc2: DEFAULT_INC2,
            cpw: DEFAULT_CPW,
            fine_step: FineStep::default(),
            coarse_window: CoarseWindow::default(),
        }
    }
}

impl SbicConfig {
    pub fn validate(&self) -> Result<(), SbicError> {
        for (name, value) in [
            ("size1", self.size1),
            ("inc1", self.inc1),
            ("size2", self.size2),
            ("inc2", self.inc2),
        ] {
            if value == 0 {
                return Err(SbicError::invalid_input(format!(
                    "SbicConfig.{name} must be >= 1; got 0"
                )));
            }
        }
        if !self.cpw.is_finite() || self.cpw < 0.0 {
            return Err(SbicError::invalid_input(format!(
                "SbicConfig.cpw must be finite and >= 0.0; got {}",
                self.cpw
            )));
        }
        Ok(())
    }

    fn fine_inc(&self) -> usize {
        match self.fine_step {
            FineStep::Coarse => self.inc1,
            FineStep::Fine => self.inc2,
        }
    }
}

/// BIC segmentation of a features x frames matrix.
///
/// Runs a coarse windowed search, refines each candidate in a window centred
/// on it, then drops interior candidates whose split no longer lowers the BIC.
#[derive(Clone, Debug)]
pub struct Sbic {
    config: SbicConfig,
}

impl Sbic {
    pub fn new(config: SbicConfig) -> Result<Self, SbicError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SbicConfig {
        &self.config
    }

    /// Replaces the configuration used by subsequent runs.
    pub fn set_config(&mut self, config: SbicConfig) -> Result<(), SbicError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }
}

#[derive(Default, Clone, Copy, Debug)]
struct RuntimeStats {
    windows_evaluated: usize,
    delta_bic_evals: usize,
}

/// Private state of one `compute` call.
struct SegmentationRun<'a> {
    config: &'a SbicConfig,
    matrix: &'a FeatureMatrix,
    penalty: BicPenalty,
    change_points: Vec<ChangePoint>,
    bic_values: Vec<f64>,
    runtime: RuntimeStats,
}

impl<'a> SegmentationRun<'a> {
    fn new(config: &'a SbicConfig, matrix: &'a FeatureMatrix) -> Result<Self, SbicError> {
        Ok(Self {
            config,
            matrix,
            penalty: BicPenalty::new(matrix.n_features(), config.cpw)?,
            change_points: vec![],
            bic_values: vec![],
            runtime: RuntimeStats::default(),
        })
    }

    fn search(&mut self, start: usize, end: usize, inc: usize) -> Result<SearchOutcome, SbicError> {
        let outcome = change_search(&self.matrix.window(start, end), inc, &self.penalty)?;
        self.runtime.windows_evaluated += 1;
        self.runtime.delta_bic_evals += outcome.curve.len();
        Ok(outcome)
    }

    /// Pass 1: windowed search over the whole matrix.
    fn coarse(&mut self) -> Result<(), SbicError> {
        let n = self.matrix.n_frames();
        let inc = self.config.inc1;
        let mut start = 0usize;
        let mut end = 0usize;

        while end < n {
            end = end.saturating_add(self.config.size1).min(n);
            let outcome = self.search(start, end, inc)?;

            match outcome.change {
                Some(found) => {
                    self.change_points.push(ChangePoint {
                        frame: found.frame,
                        delta_bic: found.delta_bic,
                    });
                    self.bic_values
                        .extend_from_slice(&outcome.curve[..=found.sample]);
                    // the peak leaves inc frames to its right, so this stays < n
                    start = found.frame + inc;
                    end = start;
                }
                None if end == n => self.bic_values.extend_from_slice(&outcome.curve),
                None => {
                    if self.config.coarse_window == CoarseWindow::Sliding {
                        self.bic_values.extend_from_slice(&outcome.curve);
                        start = end;
                    }
                }
            }
        }
        Ok(())
    }

    /// Pass 2: re-search a `size2` window centred on each change point.
    fn refine(&mut self) -> Result<(), SbicError> {
        let n = self.matrix.n_frames();
        let half = self.config.size2 / 2;
        let inc = self.config.fine_inc();

        let mut idx = 0usize;
        while idx < self.change_points.len() {
            let start = self.change_points[idx].frame.saturating_sub(half);
            let end = start.saturating_add(self.config.size2).min(n);

            let Some(found) = self.search(start, end, inc)?.change else {
                idx += 1;
                continue;
            };

            let prev = idx
                .checked_sub(1)
                .map_or(0, |p| self.change_points[p].frame);
            let next = self
                .change_points
                .get(idx + 1)
                .map_or(n - 1, |cp| cp.frame);

            if (prev..=next).contains(&found.frame) {
                self.change_points[idx] = ChangePoint {
                    frame: found.frame,
                    delta_bic: found.delta_bic,
                };
                idx += 1;
            } else {
                // the entry that shifts into idx is examined next
                self.change_points.remove(idx);
            }
        }
        Ok(())
    }

    /// Pass 3: drop interior change points whose split is not justified.
    fn validate(&mut self) -> Result<(), SbicError> {
        self.runtime.delta_bic_evals +=
            validate_change_points(self.matrix, &self.penalty, &mut self.change_points)?;
        Ok(())
    }
}

/// Drops interior change points whose split does not lower the BIC; the first
/// and last entries are kept.
///
/// One sweep walks the interior entries left to right. Entry `i` is tested on
/// the frames from the last retained start through the next entry, split at
/// the gap to entry `i - 1`. A non-negative differential removes it; otherwise
/// the retained start moves past it. A removal widens the windows its
/// neighbours see, so sweeps repeat until one removes nothing and the output
/// validates unchanged.
///
/// Returns the number of BIC differentials evaluated.
pub fn validate_change_points(
    matrix: &FeatureMatrix,
    penalty: &BicPenalty,
    change_points: &mut Vec<ChangePoint>,
) -> Result<usize, SbicError> {
    let mut evals = 0usize;
    loop {
        let before = change_points.len();
        evals += validation_sweep(matrix, penalty, change_points)?;
        if change_points.len() == before {
            return Ok(evals);
        }
    }
}

fn validation_sweep(
    matrix: &FeatureMatrix,
    penalty: &BicPenalty,
    change_points: &mut Vec<ChangePoint>,
) -> Result<usize, SbicError> {
    let mut evals = 0usize;
    let mut retained_start = 0usize;
    let mut idx = 1usize;

    while idx + 1 < change_points.len() {
        let window = matrix.window(retained_start, change_points[idx + 1].frame + 1);
        let gap = change_points[idx]
            .frame
            .saturating_sub(change_points[idx - 1].frame);

        // a zero-length half cannot justify a boundary
        let justified = if gap == 0 || gap >= window.len() {
            false
        } else {
            evals += 1;
            delta_bic(&window, gap, penalty)? < 0.0
        };

        if justified {
            retained_start = change_points[idx].frame + 1;
            idx += 1;
        } else {
            change_points.remove(idx);
        }
    }
    Ok(evals)
}

impl OfflineSegmenter for Sbic {
    fn compute(
        &self,
        x: &FeatureView<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<SegmentationResult, SbicError> {
        self.config.validate()?;
        if x.n_frames < 2 {
            return Err(SbicError::invalid_input(format!(
                "n_frames must be >= 2 to segment; got {}",
                x.n_frames
            )));
        }

        let started_at = Instant::now();
        let matrix = FeatureMatrix::from_view(x)?;
        let mut run = SegmentationRun::new(&self.config, &matrix)?;

        run.coarse()?;
        let coarse_change_points = run.change_points.len();
        ctx.report_progress(1.0 / 3.0);

        run.refine()?;
        let refined_change_points = run.change_points.len();
        ctx.report_progress(2.0 / 3.0);

        run.validate()?;
        let validated_change_points = run.change_points.len();
        ctx.report_progress(1.0);

        let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        ctx.record_scalar(
            "offline.sbic.coarse_change_points",
            coarse_change_points as f64,
        );
        ctx.record_scalar(
            "offline.sbic.refined_change_points",
            refined_change_points as f64,
        );
        ctx.record_scalar(
            "offline.sbic.validated_change_points",
            validated_change_points as f64,
        );
        ctx.record_scalar(
            "offline.sbic.windows_evaluated",
            run.runtime.windows_evaluated as f64,
        );
        ctx.record_scalar(
            "offline.sbic.delta_bic_evals",
            run.runtime.delta_bic_evals as f64,
        );
        ctx.record_scalar("offline.sbic.runtime_ms", runtime_ms as f64);

        let config = &self.config;
        let mut notes = vec![
            format!(
                "size1={}, inc1={}, size2={}, inc2={}, cpw={}, fine_step={:?}, coarse_window={:?}",
                config.size1,
                config.inc1,
                config.size2,
                config.inc2,
                config.cpw,
                config.fine_step,
                config.coarse_window
            ),
            format!("cp={}", run.penalty.cp),
            format!(
                "change_points: coarse={coarse_change_points}, refined={refined_change_points}, validated={validated_change_points}"
            ),
        ];
        let mut warnings = vec![];
        if config.fine_step == FineStep::Coarse && config.inc2 != config.inc1 {
            notes.push(format!(
                "fine pass scanned with inc1={} (inc2={} unused under FineStep::Coarse)",
                config.inc1, config.inc2
            ));
        }
        let min_scan = config.inc1.saturating_mul(2);
        if x.n_frames < min_scan {
            warnings.push(format!(
                "n_frames={} is shorter than 2*inc1={min_scan}; no split can be scanned",
                x.n_frames
            ));
        }

        let diagnostics = Diagnostics {
            n_features: x.n_features,
            n_frames: x.n_frames,
            runtime_ms: Some(runtime_ms),
            notes,
            warnings,
            algorithm: Cow::Borrowed("sbic"),
            cost_model: Cow::Borrowed(COST_MODEL_NAME),
            pass_stats: Some(PassStats {
                coarse_change_points,
                refined_change_points,
                validated_change_points,
                windows_evaluated: run.runtime.windows_evaluated,
                delta_bic_evals: run.runtime.delta_bic_evals,
            }),
            ..Diagnostics::default()
        };

        Ok(SegmentationResult::new(
            run.change_points,
            run.bic_values,
            diagnostics,
        ))
    }
}
