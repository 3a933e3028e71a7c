// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use sbic_core::{ExecutionContext, FeatureView, MemoryLayout, OfflineSegmenter};
use sbic_offline::{CoarseWindow, FineStep, Sbic, SbicConfig};

fn build_config(cursor: &mut common::ByteCursor<'_>) -> SbicConfig {
    SbicConfig {
        size1: common::bounded(cursor.next_u8(), 0, 96),
        inc1: common::bounded(cursor.next_u8(), 0, 16),
        size2: common::bounded(cursor.next_u8(), 0, 96),
        inc2: common::bounded(cursor.next_u8(), 0, 16),
        cpw: match cursor.next_u8() % 6 {
            0 => 0.0,
            1 => -1.0,
            2 => f64::NAN,
            _ => f64::from(cursor.next_u8()) / 32.0,
        },
        fine_step: if cursor.next_u8() & 1 == 0 {
            FineStep::Coarse
        } else {
            FineStep::Fine
        },
        coarse_window: if cursor.next_u8() & 1 == 0 {
            CoarseWindow::Anchored
        } else {
            CoarseWindow::Sliding
        },
    }
}

fn build_value(base: f64, mode_seed: u8, raw_seed: i16) -> f64 {
    match mode_seed % 8 {
        0 => base,
        1 => f64::from(raw_seed) / 8.0,
        2 => f64::from(raw_seed % 4),
        3 => 0.0,
        4 => f64::NAN,
        5 => f64::INFINITY,
        6 => 1e300 * f64::from(raw_seed.signum()),
        _ => base.clamp(-1e6, 1e6),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let config = build_config(&mut cursor);

    let n_features = common::bounded(cursor.next_u8(), 0, 6);
    let n_frames = common::bounded(cursor.next_u8(), 0, 160);
    let layout = if cursor.next_u8() & 1 == 0 {
        MemoryLayout::FeatureMajor
    } else {
        MemoryLayout::FrameMajor
    };

    let payload_len = common::bounded(cursor.next_u8(), 0, 64).saturating_mul(8);
    let mut bases = common::decode_f64_chunks(&cursor.take_padded(payload_len), 64);
    if bases.is_empty() {
        bases.push(0.0);
    }

    let len = n_features.saturating_mul(n_frames);
    let mut values = Vec::with_capacity(len);
    for idx in 0..len {
        let base = bases[idx % bases.len()];
        values.push(build_value(base, cursor.next_u8(), cursor.next_i16()));
    }

    let Ok(view) = FeatureView::from_f64(&values, n_features, n_frames, layout) else {
        return;
    };
    let Ok(sbic) = Sbic::new(config) else {
        return;
    };
    let _ = sbic.compute(&view, &ExecutionContext::new());
});
