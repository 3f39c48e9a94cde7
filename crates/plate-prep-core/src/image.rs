use serde::{Deserialize, Serialize};

/// Errors raised when constructing an image from raw parts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },

    #[error("invalid image buffer length (expected {expected} samples, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("sample {value} at index {index} is outside [0, 255]")]
    SampleOutOfRange { index: usize, value: i64 },

    #[error("sample {value} at index {index} is neither BLACK nor WHITE")]
    NonBinarySample { index: usize, value: u8 },
}

/// Validate `width x height` and return the expected sample count.
fn checked_len(width: usize, height: usize) -> Result<usize, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(ImageError::InvalidDimensions { width, height })
}

fn check_buffer(width: usize, height: usize, got: usize) -> Result<(), ImageError> {
    let expected = checked_len(width, height)?;
    if got != expected {
        return Err(ImageError::InvalidBuffer { expected, got });
    }
    Ok(())
}

/// Borrowed 8-bit grayscale grid.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl<'a> GrayImageView<'a> {
    /// Wrap a row-major buffer, checking that it is non-empty and matches the dimensions.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self, ImageError> {
        check_buffer(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Re-check the invariants of a view built from its public fields.
    pub fn validate(&self) -> Result<(), ImageError> {
        check_buffer(self.width, self.height, self.data.len())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/// Owned 8-bit grayscale grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        check_buffer(width, height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an image from wider integer samples, rejecting anything outside [0, 255].
    pub fn from_samples(width: usize, height: usize, samples: &[i64]) -> Result<Self, ImageError> {
        check_buffer(width, height, samples.len())?;
        let data = samples
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                u8::try_from(value).map_err(|_| ImageError::SampleOutOfRange { index, value })
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Uniform image filled with `value`.
    pub fn filled(width: usize, height: usize, value: u8) -> Result<Self, ImageError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// One cell of a [`BinaryImage`].
pub const BLACK: u8 = 0;
/// One cell of a [`BinaryImage`]. White cells are the foreground class.
pub const WHITE: u8 = 255;

/// Two-level image produced by thresholding or voting.
///
/// Cells are always [`BLACK`] or [`WHITE`], so the raw buffer doubles as a
/// valid grayscale image (see [`BinaryImage::as_gray`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryImage {
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        check_buffer(width, height, data.len())?;
        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|(_, &v)| v != BLACK && v != WHITE)
        {
            return Err(ImageError::NonBinarySample { index, value });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Classify every sample of `view`; `is_white` decides the foreground.
    ///
    /// The view is validated first, so a buffer that does not match its
    /// dimensions never produces a binary image.
    pub fn from_gray_map(
        view: &GrayImageView<'_>,
        is_white: impl Fn(u8) -> bool,
    ) -> Result<Self, ImageError> {
        view.validate()?;
        Ok(Self {
            width: view.width,
            height: view.height,
            data: view
                .data
                .iter()
                .map(|&v| if is_white(v) { WHITE } else { BLACK })
                .collect(),
        })
    }

    /// Build by asking `is_white` about every row-major linear index.
    pub fn from_index_fn(
        width: usize,
        height: usize,
        is_white: impl FnMut(usize) -> bool,
    ) -> Result<Self, ImageError> {
        let len = checked_len(width, height)?;
        let data = (0..len)
            .map(is_white)
            .map(|fg| if fg { WHITE } else { BLACK })
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn is_foreground_at(&self, index: usize) -> bool {
        self.data[index] == WHITE
    }

    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v == WHITE).count()
    }

    pub fn as_gray(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Pixel coordinate inside a grid; `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}

impl PixelCoord {
    /// Coordinate of a row-major linear index.
    #[inline]
    pub fn from_index(index: usize, width: usize) -> Self {
        Self {
            x: (index % width) as u32,
            y: (index / width) as u32,
        }
    }
}
