// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::observability::{ProgressSink, TelemetrySink};

/// Per-invocation context passed through segmenter calls.
#[derive(Clone, Copy, Default)]
pub struct ExecutionContext<'a> {
    pub progress: Option<&'a dyn ProgressSink>,
    pub telemetry: Option<&'a dyn TelemetrySink>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context with no optional hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an optional progress sink.
    pub fn with_progress_sink(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sets an optional telemetry sink.
    pub fn with_telemetry_sink(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Emits clamped progress to the sink, if configured.
    pub fn report_progress(&self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }

        if let Some(sink) = self.progress {
            sink.on_progress(fraction.clamp(0.0, 1.0));
        }
    }

    /// Emits a scalar telemetry value to the sink, if configured.
    pub fn record_scalar(&self, key: &'static str, value: f64) {
        if let Some(sink) = self.telemetry {
            sink.record_scalar(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExecutionContext;
    use crate::observability::{ProgressSink, TelemetrySink};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockProgressSink {
        values: Mutex<Vec<f32>>,
    }

    impl ProgressSink for MockProgressSink {
        fn on_progress(&self, fraction: f32) {
            self.values
                .lock()
                .expect("progress mutex should lock")
                .push(fraction);
        }
    }

    #[derive(Default)]
    struct MockTelemetrySink {
        values: Mutex<Vec<(&'static str, f64)>>,
    }

    impl TelemetrySink for MockTelemetrySink {
        fn record_scalar(&self, key: &'static str, value: f64) {
            self.values
                .lock()
                .expect("telemetry mutex should lock")
                .push((key, value));
        }
    }

    #[test]
    fn new_has_no_hooks_and_emitting_is_a_no_op() {
        let ctx = ExecutionContext::new();
        assert!(ctx.progress.is_none());
        assert!(ctx.telemetry.is_none());
        ctx.report_progress(0.5);
        ctx.record_scalar("offline.sbic.noop", 1.0);
    }

    #[test]
    fn report_progress_clamps_and_skips_non_finite_values() {
        let progress = MockProgressSink::default();
        let ctx = ExecutionContext::new().with_progress_sink(&progress);

        ctx.report_progress(-0.5);
        ctx.report_progress(0.25);
        ctx.report_progress(1.5);
        ctx.report_progress(f32::NAN);
        ctx.report_progress(f32::INFINITY);

        let values = progress
            .values
            .lock()
            .expect("progress mutex should lock")
            .clone();
        assert_eq!(values, vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn record_scalar_forwards_to_telemetry_sink() {
        let telemetry = MockTelemetrySink::default();
        let ctx = ExecutionContext::new().with_telemetry_sink(&telemetry);

        ctx.record_scalar("offline.sbic.windows", 3.0);
        ctx.record_scalar("offline.sbic.runtime_ms", 12.0);

        let values = telemetry
            .values
            .lock()
            .expect("telemetry mutex should lock")
            .clone();
        assert_eq!(
            values,
            vec![
                ("offline.sbic.windows", 3.0),
                ("offline.sbic.runtime_ms", 12.0)
            ]
        );
    }
}
