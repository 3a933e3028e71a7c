// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

/// Feature-major matrix of noisy piecewise-constant rows with a level change
/// every `block_len` frames.
pub fn piecewise_features(n_features: usize, n_frames: usize, block_len: usize) -> Vec<f64> {
    let block_len = block_len.max(1);
    let mut state = 0xfeed_f00d_dead_beef_u64;
    let mut values = Vec::with_capacity(n_features * n_frames);

    for feature in 0..n_features {
        for frame in 0..n_frames {
            let block = frame / block_len;
            let level = ((block * 7 + feature * 3) % 5) as f64;
            let noise = (lcg_next(&mut state) >> 11) as f64 / (1u64 << 53) as f64;
            values.push(level + 0.1 * noise);
        }
    }
    values
}
