//! 256-bin intensity histograms and the per-class statistics derived from them.
//!
//! A threshold `t` splits intensities into the background class (`v <= t`)
//! and the foreground class (`v > t`). Every statistic of an empty class is
//! reported as `None` or as zero probability, never as a division by zero.

use std::ops::RangeInclusive;

use crate::GrayImageView;

/// Number of bins for 8-bit intensities.
pub const NUM_BINS: usize = 256;

/// Errors produced by histogram statistics.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("histogram has no samples")]
    EmptyHistogram,
}

/// One side of a threshold split.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Class {
    /// Intensities `<= t`.
    Background,
    /// Intensities `> t`.
    Foreground,
}

impl Class {
    /// Bin range covered by this class at threshold `t`.
    ///
    /// The foreground range is empty for `t == 255`.
    #[inline]
    pub fn bins(self, t: u8) -> RangeInclusive<usize> {
        match self {
            Class::Background => 0..=t as usize,
            // 256..=255 is an empty range.
            Class::Foreground => t as usize + 1..=NUM_BINS - 1,
        }
    }

    #[inline]
    pub fn contains(self, value: u8, t: u8) -> bool {
        match self {
            Class::Background => value <= t,
            Class::Foreground => value > t,
        }
    }
}

/// Statistics of one class of a threshold split.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassStats {
    /// Number of samples in the class.
    pub count: u64,
    /// Fraction of all samples that fall in the class.
    pub probability: f64,
    pub mean: f64,
    /// Population variance (divided by `count`).
    pub variance: f64,
}

/// Intensity histogram of an 8-bit grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; NUM_BINS],
    total: u64,
}

impl Histogram {
    pub fn from_view(view: &GrayImageView<'_>) -> Self {
        let mut counts = [0u64; NUM_BINS];
        for &v in view.data {
            counts[v as usize] += 1;
        }
        Self {
            counts,
            total: view.data.len() as u64,
        }
    }

    pub fn from_counts(counts: [u64; NUM_BINS]) -> Self {
        let total = counts.iter().sum();
        Self { counts, total }
    }

    #[inline]
    pub fn counts(&self) -> &[u64; NUM_BINS] {
        &self.counts
    }

    #[inline]
    pub fn count(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    /// Total number of samples; always equals the sum of all bins.
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Sum of all sample intensities.
    pub fn intensity_sum(&self) -> f64 {
        weighted_sum(&self.counts, 0..=NUM_BINS - 1)
    }

    /// Smallest and largest occupied bins.
    pub fn value_range(&self) -> Option<(u8, u8)> {
        let min = self.counts.iter().position(|&c| c > 0)?;
        let max = self.counts.iter().rposition(|&c| c > 0)?;
        Some((min as u8, max as u8))
    }

    /// Number of occupied bins.
    pub fn occupied_bins(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Divide every bin by the total count.
    pub fn normalized(&self) -> Result<NormalizedHistogram, StatsError> {
        if self.total == 0 {
            return Err(StatsError::EmptyHistogram);
        }
        let total = self.total as f64;
        let mut probabilities = [0f64; NUM_BINS];
        for (p, &c) in probabilities.iter_mut().zip(self.counts.iter()) {
            *p = c as f64 / total;
        }
        Ok(NormalizedHistogram { probabilities })
    }

    pub fn class_count(&self, class: Class, t: u8) -> u64 {
        self.counts[class.bins(t)].iter().sum()
    }

    #[inline]
    pub fn count_background(&self, t: u8) -> u64 {
        self.class_count(Class::Background, t)
    }

    #[inline]
    pub fn count_foreground(&self, t: u8) -> u64 {
        self.class_count(Class::Foreground, t)
    }

    /// Fraction of samples in `class`; zero for an empty histogram.
    pub fn class_probability(&self, class: Class, t: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.class_count(class, t) as f64 / self.total as f64
    }

    #[inline]
    pub fn probability_background(&self, t: u8) -> f64 {
        self.class_probability(Class::Background, t)
    }

    #[inline]
    pub fn probability_foreground(&self, t: u8) -> f64 {
        self.class_probability(Class::Foreground, t)
    }

    /// Count, probability, mean and variance of one class, or `None` when the class is empty.
    pub fn class_stats(&self, class: Class, t: u8) -> Option<ClassStats> {
        let bins = class.bins(t);
        let count: u64 = self.counts[bins.clone()].iter().sum();
        if count == 0 {
            return None;
        }
        let n = count as f64;
        let mean = weighted_sum(&self.counts, bins.clone()) / n;
        let variance = bins
            .map(|v| {
                let d = v as f64 - mean;
                self.counts[v] as f64 * d * d
            })
            .sum::<f64>()
            / n;
        Some(ClassStats {
            count,
            probability: n / self.total as f64,
            mean,
            variance,
        })
    }
}

fn weighted_sum(counts: &[u64; NUM_BINS], bins: RangeInclusive<usize>) -> f64 {
    bins.map(|v| v as f64 * counts[v] as f64).sum()
}

/// Histogram divided by its sample count; entries are empirical probabilities.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedHistogram {
    probabilities: [f64; NUM_BINS],
}

impl NormalizedHistogram {
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.probabilities
    }

    #[inline]
    pub fn get(&self, value: u8) -> f64 {
        self.probabilities[value as usize]
    }

    /// Total probability mass of one class.
    pub fn class_mass(&self, class: Class, t: u8) -> f64 {
        self.probabilities[class.bins(t)].iter().sum()
    }

    pub fn sum(&self) -> f64 {
        self.probabilities.iter().sum()
    }
}
