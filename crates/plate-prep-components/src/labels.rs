use std::collections::HashMap;

use log::debug;
use plate_prep_core::{BinaryImage, PixelCoord};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::forward::forward_labels;
use crate::union_find::union_find_labels;

/// How provisional labels are resolved during the raster pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelingMode {
    /// One forward pass; the last matching neighbor's label wins and labels
    /// are never merged afterwards. Branches of one blob that only join
    /// later in the scan keep distinct labels.
    #[default]
    ForwardPropagation,
    /// Two-pass union-find: every 8-connected same-valued region gets exactly one label.
    UnionFind,
}

/// Errors returned by the labeler.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("cannot label an empty image (width={width}, height={height})")]
    EmptyImage { width: usize, height: usize },
    #[error("binary image is {got_width}x{got_height}, labels are {width}x{height}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
}

/// A set of pixels sharing one canonical label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub label: usize,
    /// Whether the component holds at least one WHITE pixel.
    pub foreground: bool,
    /// Pixel coordinates in raster (discovery) order.
    pub points: Vec<PixelCoord>,
}

impl Component {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inclusive bounding box `[min_x, min_y, max_x, max_y]`.
    pub fn bounding_box(&self) -> Option<[u32; 4]> {
        let first = self.points.first()?;
        let init = [first.x, first.y, first.x, first.y];
        Some(self.points.iter().fold(init, |[x0, y0, x1, y1], p| {
            [x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)]
        }))
    }
}

/// Renumber raw labels densely in order of first appearance.
///
/// The `i`-th distinct label met while scanning from index 0 becomes `i`.
/// Returns the new labels and the number of distinct labels. The numbering
/// depends on scan order and carries no meaning beyond identity.
pub fn canonicalize(raw: &[usize]) -> (Vec<usize>, usize) {
    let mut first_seen: HashMap<usize, usize> = HashMap::new();
    let labels = raw
        .iter()
        .map(|&l| {
            let next = first_seen.len();
            *first_seen.entry(l).or_insert(next)
        })
        .collect();
    (labels, first_seen.len())
}

/// Canonical label grid: every cell holds an id in `0..num_components`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelImage {
    width: usize,
    height: usize,
    labels: Vec<usize>,
    num_components: usize,
}

impl LabelImage {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major labels.
    #[inline]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    #[inline]
    pub fn label_at(&self, x: usize, y: usize) -> usize {
        self.labels[y * self.width + x]
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Pixel coordinates of every component, indexed by label.
    pub fn component_points(&self) -> Vec<Vec<PixelCoord>> {
        let mut points = vec![Vec::new(); self.num_components];
        for (i, &l) in self.labels.iter().enumerate() {
            points[l].push(PixelCoord::from_index(i, self.width));
        }
        points
    }

    fn check_dimensions(&self, binary: &BinaryImage) -> Result<(), LabelError> {
        let (got_width, got_height) = binary.dimensions();
        if (got_width, got_height) != (self.width, self.height) {
            return Err(LabelError::DimensionMismatch {
                width: self.width,
                height: self.height,
                got_width,
                got_height,
            });
        }
        Ok(())
    }

    /// All components with their foreground flag, indexed by label.
    pub fn components(&self, binary: &BinaryImage) -> Result<Vec<Component>, LabelError> {
        self.check_dimensions(binary)?;
        let mut foreground = vec![false; self.num_components];
        for (i, &l) in self.labels.iter().enumerate() {
            foreground[l] |= binary.is_foreground_at(i);
        }
        Ok(self
            .component_points()
            .into_iter()
            .zip(foreground)
            .enumerate()
            .map(|(label, (points, foreground))| Component {
                label,
                foreground,
                points,
            })
            .collect())
    }

    /// Foreground pixels grouped by label, for labels holding at least one of them.
    ///
    /// Components are ordered by label; each lists only its WHITE pixels.
    pub fn foreground_components(
        &self,
        binary: &BinaryImage,
    ) -> Result<Vec<Component>, LabelError> {
        self.check_dimensions(binary)?;
        let mut points: Vec<Vec<PixelCoord>> = vec![Vec::new(); self.num_components];
        for (i, &l) in self.labels.iter().enumerate() {
            if binary.is_foreground_at(i) {
                points[l].push(PixelCoord::from_index(i, self.width));
            }
        }
        Ok(points
            .into_iter()
            .enumerate()
            .filter(|(_, p)| !p.is_empty())
            .map(|(label, points)| Component {
                label,
                foreground: true,
                points,
            })
            .collect())
    }

    /// Number of labels holding at least one foreground pixel.
    pub fn num_foreground_components(&self, binary: &BinaryImage) -> Result<usize, LabelError> {
        self.check_dimensions(binary)?;
        let mut seen = vec![false; self.num_components];
        for (i, &l) in self.labels.iter().enumerate() {
            seen[l] |= binary.is_foreground_at(i);
        }
        Ok(seen.into_iter().filter(|&fg| fg).count())
    }
}

/// Label 8-connected same-valued regions of `binary` and canonicalize the result.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(binary), fields(width = binary.width(), height = binary.height()))
)]
pub fn label_components(
    binary: &BinaryImage,
    mode: LabelingMode,
) -> Result<LabelImage, LabelError> {
    let (width, height) = binary.dimensions();
    if width == 0 || height == 0 {
        return Err(LabelError::EmptyImage { width, height });
    }

    let raw = match mode {
        LabelingMode::ForwardPropagation => forward_labels(binary),
        LabelingMode::UnionFind => union_find_labels(binary),
    };
    let (labels, num_components) = canonicalize(&raw);
    debug!("{mode:?}: {num_components} components in {width}x{height} image");

    Ok(LabelImage {
        width,
        height,
        labels,
        num_components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plate_prep_core::{BLACK, WHITE};

    #[test]
    fn canonicalize_follows_first_appearance() {
        let (labels, n) = canonicalize(&[7, 7, 3, 9, 3, 7, 0]);
        assert_eq!(labels, vec![0, 0, 1, 2, 1, 0, 3]);
        assert_eq!(n, 4);
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let (once, n) = canonicalize(&[5, 2, 5, 8, 2]);
        let (twice, m) = canonicalize(&once);
        assert_eq!(once, twice);
        assert_eq!(n, m);
    }

    #[test]
    fn bounding_box_spans_points() {
        let c = Component {
            label: 0,
            foreground: true,
            points: vec![
                PixelCoord { x: 3, y: 1 },
                PixelCoord { x: 1, y: 2 },
                PixelCoord { x: 2, y: 4 },
            ],
        };
        assert_eq!(c.bounding_box(), Some([1, 1, 3, 4]));
    }

    #[test]
    fn foreground_extraction_rejects_other_sizes() {
        let img = BinaryImage::from_raw(2, 2, vec![BLACK, WHITE, WHITE, BLACK]).unwrap();
        let labels = label_components(&img, LabelingMode::default()).unwrap();
        let other = BinaryImage::from_raw(4, 1, vec![BLACK; 4]).unwrap();
        assert!(matches!(
            labels.foreground_components(&other),
            Err(LabelError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn labeling_mode_uses_snake_case() {
        let json = serde_json::to_string(&LabelingMode::UnionFind).unwrap();
        assert_eq!(json, "\"union_find\"");
    }
}
