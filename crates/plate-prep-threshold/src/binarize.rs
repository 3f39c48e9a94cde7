use plate_prep_core::{BinaryImage, GrayImageView, ImageError};

use crate::ThresholdReport;

/// Samples above `threshold` become WHITE, the rest BLACK.
///
/// Fails when the view's buffer does not match its dimensions.
pub fn binarize(view: &GrayImageView<'_>, threshold: u8) -> Result<BinaryImage, ImageError> {
    BinaryImage::from_gray_map(view, |v| v > threshold)
}

/// One binary image per threshold in `report`, in report order.
pub fn binarize_all(
    view: &GrayImageView<'_>,
    report: &ThresholdReport,
) -> Result<Vec<BinaryImage>, ImageError> {
    report.thresholds().map(|t| binarize(view, t)).collect()
}
