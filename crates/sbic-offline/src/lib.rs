// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

pub mod sbic;
pub mod search;

pub use sbic::{CoarseWindow, FineStep, Sbic, SbicConfig, validate_change_points};
pub use search::{FoundChange, SearchOutcome, change_search};
