//! Threshold selection, binarization and ensemble voting.
//!
//! ## Quickstart
//!
//! ```
//! use plate_prep_core::GrayImage;
//! use plate_prep_threshold::{binarize_all, select_thresholds, vote, ThresholdMethod};
//!
//! let img = GrayImage::from_raw(4, 1, vec![10, 20, 200, 220]).unwrap();
//! let report = select_thresholds(&img.view(), &ThresholdMethod::ENSEMBLE);
//! let voted = vote(&binarize_all(&img.view(), &report).unwrap()).unwrap();
//! assert_eq!(voted.count_foreground(), 2);
//! ```
//!
//! Pipeline:
//! 1. Build the intensity histogram once.
//! 2. Run each selected [`ThresholdMethod`] (mean, median, fixed, maximum
//!    entropy, Otsu, Gaussian-mixture error) to get one cut point each.
//! 3. Binarize the image at every cut point.
//! 4. Majority-vote the binary images into one.

mod binarize;
mod select;
mod vote;

pub use binarize::{binarize, binarize_all};
pub use select::{
    gmm_error, gmm_error_threshold, max_entropy_threshold, mean_threshold, median_threshold,
    otsu_threshold, select_thresholds, ParseMethodError, ThresholdMethod, ThresholdReport,
    FIXED_THRESHOLD,
};
pub use vote::{vote, VoteError};
