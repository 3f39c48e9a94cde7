//! Helpers for running the pipeline on `image::GrayImage` inputs.

use crate::core::{BinaryImage, GrayImageView, ImageError};
use crate::pipeline::{PipelineError, PipelineParams, PlatePreprocessor, PreprocessResult};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Convert an `image::GrayImage` into the lightweight `plate-prep-core` view type.
pub fn gray_view(img: &::image::GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Copy a raw row-major 8-bit buffer into an `image::GrayImage`.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, ImageError> {
    GrayImageView::new(width as usize, height as usize, pixels)?;
    ::image::GrayImage::from_raw(width, height, pixels.to_vec()).ok_or(ImageError::InvalidDimensions {
        width: width as usize,
        height: height as usize,
    })
}

/// Convert a binary image into an `image::GrayImage` with values 0/255.
pub fn binary_to_gray_image(binary: &BinaryImage) -> Result<::image::GrayImage, ImageError> {
    let (w, h) = binary.dimensions();
    gray_image_from_slice(w as u32, h as u32, binary.as_raw())
}

/// Run the full pipeline end-to-end on an 8-bit grayscale image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn preprocess_image(
    img: &::image::GrayImage,
    params: PipelineParams,
) -> Result<PreprocessResult, PipelineError> {
    PlatePreprocessor::new(params).run(&gray_view(img))
}
