//! 8-connected component labeling of binary images.
//!
//! ## Quickstart
//!
//! ```
//! use plate_prep_components::{label_components, LabelingMode};
//! use plate_prep_core::{BinaryImage, BLACK, WHITE};
//!
//! let img = BinaryImage::from_raw(3, 1, vec![WHITE, BLACK, WHITE]).unwrap();
//! let labels = label_components(&img, LabelingMode::default()).unwrap();
//! assert_eq!(labels.labels(), &[0, 1, 2]);
//! assert_eq!(labels.foreground_components(&img).unwrap().len(), 2);
//! ```
//!
//! Both foreground and background pixels are labeled. Labels are
//! canonicalized to `0..num_components` in order of first appearance, and
//! foreground components are extracted from the canonical grid.

mod forward;
mod labels;
mod union_find;

pub use forward::forward_labels;
pub use labels::{
    canonicalize, label_components, Component, LabelError, LabelImage, LabelingMode,
};
pub use union_find::union_find_labels;
