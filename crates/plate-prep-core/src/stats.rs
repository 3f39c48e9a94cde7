//! Descriptive statistics over a grayscale grid.
//!
//! The partition variants mirror [`Histogram::class_stats`](crate::Histogram::class_stats)
//! but work directly on the samples. Partition means and variances of an
//! empty partition are `None`.

use crate::histogram::Class;
use crate::GrayImageView;

pub fn sum(view: &GrayImageView<'_>) -> f64 {
    view.data.iter().map(|&v| v as f64).sum()
}

pub fn mean(view: &GrayImageView<'_>) -> f64 {
    if view.data.is_empty() {
        return 0.0;
    }
    sum(view) / view.data.len() as f64
}

/// Population variance of all samples.
pub fn variance(view: &GrayImageView<'_>) -> f64 {
    if view.data.is_empty() {
        return 0.0;
    }
    let m = mean(view);
    view.data
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / view.data.len() as f64
}

pub fn standard_deviation(view: &GrayImageView<'_>) -> f64 {
    variance(view).sqrt()
}

/// Middle sample, or the average of the two central samples for even counts.
pub fn median(view: &GrayImageView<'_>) -> f64 {
    let mut sorted = view.data.to_vec();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    }
}

fn members<'a>(
    view: &'a GrayImageView<'_>,
    class: Class,
    t: u8,
) -> impl Iterator<Item = f64> + 'a {
    view.data
        .iter()
        .filter(move |&&v| class.contains(v, t))
        .map(|&v| v as f64)
}

pub fn count_in(view: &GrayImageView<'_>, class: Class, t: u8) -> usize {
    members(view, class, t).count()
}

pub fn sum_in(view: &GrayImageView<'_>, class: Class, t: u8) -> f64 {
    members(view, class, t).sum()
}

pub fn mean_in(view: &GrayImageView<'_>, class: Class, t: u8) -> Option<f64> {
    let (n, s) = members(view, class, t).fold((0usize, 0f64), |(n, s), v| (n + 1, s + v));
    (n > 0).then(|| s / n as f64)
}

/// Population variance of one partition around a pre-computed partition `mean`.
pub fn variance_in(view: &GrayImageView<'_>, class: Class, t: u8, mean: f64) -> Option<f64> {
    let (n, acc) = members(view, class, t).fold((0usize, 0f64), |(n, acc), v| {
        let d = v - mean;
        (n + 1, acc + d * d)
    });
    (n > 0).then(|| acc / n as f64)
}

pub fn sum_background(view: &GrayImageView<'_>, t: u8) -> f64 {
    sum_in(view, Class::Background, t)
}

pub fn sum_foreground(view: &GrayImageView<'_>, t: u8) -> f64 {
    sum_in(view, Class::Foreground, t)
}

pub fn mean_background(view: &GrayImageView<'_>, t: u8) -> Option<f64> {
    mean_in(view, Class::Background, t)
}

pub fn mean_foreground(view: &GrayImageView<'_>, t: u8) -> Option<f64> {
    mean_in(view, Class::Foreground, t)
}

pub fn variance_background(view: &GrayImageView<'_>, t: u8, mean: f64) -> Option<f64> {
    variance_in(view, Class::Background, t, mean)
}

pub fn variance_foreground(view: &GrayImageView<'_>, t: u8, mean: f64) -> Option<f64> {
    variance_in(view, Class::Foreground, t, mean)
}

pub fn standard_deviation_background(view: &GrayImageView<'_>, t: u8, mean: f64) -> Option<f64> {
    variance_background(view, t, mean).map(f64::sqrt)
}

pub fn standard_deviation_foreground(view: &GrayImageView<'_>, t: u8, mean: f64) -> Option<f64> {
    variance_foreground(view, t, mean).map(f64::sqrt)
}
