//! Single-pass forward label propagation.

use plate_prep_core::BinaryImage;

/// Raw (not yet canonical) labels from one raster pass.
///
/// Every pixel starts with its own linear index as label. Visiting pixels
/// row by row, each already-visited 8-neighbor with the same value
/// overwrites the pixel's label with the neighbor's current label. The
/// neighbors are checked in the order up, upper-left, upper-right, left, so
/// the last match wins.
///
/// Labels are never merged after the fact: two branches of one blob that
/// only meet further down the scan keep different labels.
pub fn forward_labels(binary: &BinaryImage) -> Vec<usize> {
    let (width, height) = binary.dimensions();
    let px = binary.as_raw();
    let mut labels: Vec<usize> = (0..px.len()).collect();

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let v = px[i];
            if y > 0 {
                let up = i - width;
                if px[up] == v {
                    labels[i] = labels[up];
                }
                if x > 0 && px[up - 1] == v {
                    labels[i] = labels[up - 1];
                }
                if x + 1 < width && px[up + 1] == v {
                    labels[i] = labels[up + 1];
                }
            }
            if x > 0 && px[i - 1] == v {
                labels[i] = labels[i - 1];
            }
        }
    }
    labels
}
