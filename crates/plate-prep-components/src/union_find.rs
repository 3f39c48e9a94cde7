//! Two-pass 8-connected labeling with union-find.

use plate_prep_core::BinaryImage;

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // The smaller root survives, keeping the root of a set at its first pixel.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big] = small;
    }
}

/// Raw labels where every 8-connected same-valued region shares one label.
///
/// Each region's label is the linear index of its first pixel in raster order.
pub fn union_find_labels(binary: &BinaryImage) -> Vec<usize> {
    let (width, height) = binary.dimensions();
    let px = binary.as_raw();
    let mut parent: Vec<usize> = (0..px.len()).collect();

    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let v = px[i];
            if y > 0 {
                let up = i - width;
                if px[up] == v {
                    union(&mut parent, i, up);
                }
                if x > 0 && px[up - 1] == v {
                    union(&mut parent, i, up - 1);
                }
                if x + 1 < width && px[up + 1] == v {
                    union(&mut parent, i, up + 1);
                }
            }
            if x > 0 && px[i - 1] == v {
                union(&mut parent, i, i - 1);
            }
        }
    }

    (0..px.len()).map(|i| find(&mut parent, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use plate_prep_core::{BLACK, WHITE};

    #[test]
    fn merges_reconnecting_branches() {
        let data = [
            WHITE, BLACK, WHITE, //
            WHITE, BLACK, WHITE, //
            WHITE, WHITE, WHITE,
        ];
        let img = BinaryImage::from_raw(3, 3, data.to_vec()).unwrap();
        assert_eq!(union_find_labels(&img), vec![0, 1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn diagonal_contact_connects() {
        let data = [WHITE, BLACK, BLACK, WHITE];
        let img = BinaryImage::from_raw(2, 2, data.to_vec()).unwrap();
        assert_eq!(union_find_labels(&img), vec![0, 1, 1, 0]);
    }
}
