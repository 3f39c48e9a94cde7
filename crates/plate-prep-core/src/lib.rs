//! Core types for license-plate OCR preprocessing.
//!
//! This crate holds the image containers shared by the threshold and
//! labeling crates, plus the histogram and descriptive statistics the
//! threshold selectors are computed from. Everything here is pure: no
//! function keeps state between calls.

mod histogram;
mod image;
mod logger;
pub mod stats;

pub use histogram::{Class, ClassStats, Histogram, NormalizedHistogram, StatsError, NUM_BINS};
pub use image::{BinaryImage, GrayImage, GrayImageView, ImageError, PixelCoord, BLACK, WHITE};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
