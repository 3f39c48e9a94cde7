//! High-level facade crate for the `plate-prep-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core, threshold and labeling crates
//! - [`pipeline::PlatePreprocessor`], which runs threshold selection,
//!   binarization, ensemble voting and component labeling in one call
//! - JSON config and report helpers in [`io`]
//! - (feature `image`) helpers that run the pipeline on an `image::GrayImage`
//!
//! ## Quickstart
//!
//! ```
//! use plate_prep::core::GrayImage;
//! use plate_prep::pipeline::{PipelineParams, PlatePreprocessor};
//!
//! let img = GrayImage::from_raw(4, 2, vec![10, 10, 220, 10, 10, 220, 220, 10]).unwrap();
//! let pre = PlatePreprocessor::new(PipelineParams::default());
//! let result = pre.run(&img.view()).unwrap();
//! assert_eq!(result.binary.count_foreground(), 3);
//! ```
//!
//! ## API map
//! - `plate_prep::core`: image containers, histogram, statistics, logger.
//! - `plate_prep::threshold`: threshold selectors, binarizer, majority vote.
//! - `plate_prep::components`: 8-connected component labeling.
//! - `plate_prep::gray` (feature `image`): end-to-end helpers from `image::GrayImage`.

pub use plate_prep_components as components;
pub use plate_prep_core as core;
pub use plate_prep_threshold as threshold;

pub use plate_prep_components::{Component, LabelImage, LabelingMode};
pub use plate_prep_core::{BinaryImage, GrayImage, GrayImageView};
pub use plate_prep_threshold::{ThresholdMethod, ThresholdReport};

pub mod io;
pub mod pipeline;

#[cfg(feature = "image")]
pub mod gray;
