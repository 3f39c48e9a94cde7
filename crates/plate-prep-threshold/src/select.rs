//! Automatic threshold selection.
//!
//! Every selector returns one cut point `t`; samples `<= t` are background
//! and samples `> t` are foreground. Searches scan `t = 0..=255` and keep the
//! first extremum, so ties resolve to the smaller threshold.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, trace, warn};
use plate_prep_core::{stats, Class, GrayImageView, Histogram, NUM_BINS};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Baseline threshold used by [`ThresholdMethod::Fixed`].
pub const FIXED_THRESHOLD: u8 = 127;

/// Closed set of threshold selection strategies.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ThresholdMethod {
    /// Arithmetic mean of all samples, truncated.
    Mean,
    /// Statistical median, truncated.
    Median,
    /// Constant [`FIXED_THRESHOLD`].
    Fixed,
    /// Maximum combined Shannon entropy of the two renormalized classes.
    MaxEntropy,
    /// Otsu's maximum between-class variance.
    Otsu,
    /// Minimum squared error between the histogram and a two-Gaussian mixture.
    GmmError,
}

impl ThresholdMethod {
    pub const ALL: [ThresholdMethod; 6] = [
        ThresholdMethod::Mean,
        ThresholdMethod::Median,
        ThresholdMethod::Fixed,
        ThresholdMethod::MaxEntropy,
        ThresholdMethod::Otsu,
        ThresholdMethod::GmmError,
    ];

    /// The five-way ensemble voted on by default.
    pub const ENSEMBLE: [ThresholdMethod; 5] = [
        ThresholdMethod::MaxEntropy,
        ThresholdMethod::Mean,
        ThresholdMethod::Otsu,
        ThresholdMethod::Median,
        ThresholdMethod::Fixed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ThresholdMethod::Mean => "mean",
            ThresholdMethod::Median => "median",
            ThresholdMethod::Fixed => "fixed",
            ThresholdMethod::MaxEntropy => "maxEntropy",
            ThresholdMethod::Otsu => "otsu",
            ThresholdMethod::GmmError => "gmmError",
        }
    }

    /// Run this selector. `hist` must be the histogram of `view`.
    pub fn select(self, view: &GrayImageView<'_>, hist: &Histogram) -> u8 {
        let t = match self {
            ThresholdMethod::Mean => mean_threshold(view),
            ThresholdMethod::Median => median_threshold(view),
            ThresholdMethod::Fixed => FIXED_THRESHOLD,
            ThresholdMethod::MaxEntropy => max_entropy_threshold(hist),
            ThresholdMethod::Otsu => otsu_threshold(hist),
            ThresholdMethod::GmmError => gmm_error_threshold(hist),
        };
        debug!("{} threshold = {t}", self.name());
        t
    }
}

impl fmt::Display for ThresholdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown threshold method `{0}` (expected one of: mean, median, fixed, maxEntropy, otsu, gmmError)")]
pub struct ParseMethodError(pub String);

impl FromStr for ThresholdMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "mean" => Ok(ThresholdMethod::Mean),
            "median" => Ok(ThresholdMethod::Median),
            "fixed" => Ok(ThresholdMethod::Fixed),
            "maxentropy" | "entropy" => Ok(ThresholdMethod::MaxEntropy),
            "otsu" => Ok(ThresholdMethod::Otsu),
            "gmmerror" | "gmm" => Ok(ThresholdMethod::GmmError),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

/// Thresholds chosen per method, serialized as `{"mean": 97, "otsu": 110, ...}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdReport(BTreeMap<ThresholdMethod, u8>);

impl ThresholdReport {
    pub fn get(&self, method: ThresholdMethod) -> Option<u8> {
        self.0.get(&method).copied()
    }

    pub fn insert(&mut self, method: ThresholdMethod, threshold: u8) {
        self.0.insert(method, threshold);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ThresholdMethod, u8)> + '_ {
        self.0.iter().map(|(&m, &t)| (m, t))
    }

    pub fn thresholds(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.values().copied()
    }
}

impl FromIterator<(ThresholdMethod, u8)> for ThresholdReport {
    fn from_iter<I: IntoIterator<Item = (ThresholdMethod, u8)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for ThresholdReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (method, t) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{method}={t}")?;
            first = false;
        }
        Ok(())
    }
}

/// Run several selectors on one image, sharing a single histogram.
///
/// Methods listed more than once are evaluated once. With the `parallel`
/// feature the selectors run on the rayon pool.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(view, methods), fields(width = view.width, height = view.height))
)]
pub fn select_thresholds(view: &GrayImageView<'_>, methods: &[ThresholdMethod]) -> ThresholdReport {
    let hist = Histogram::from_view(view);
    if hist.occupied_bins() == 1 {
        warn!("image is uniform; automatic thresholds are degenerate");
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        methods
            .par_iter()
            .map(|&m| (m, m.select(view, &hist)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        methods
            .iter()
            .map(|&m| (m, m.select(view, &hist)))
            .collect()
    }
}

/// Truncate a statistic into the 8-bit threshold range.
#[inline]
fn truncate_to_threshold(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

pub fn mean_threshold(view: &GrayImageView<'_>) -> u8 {
    truncate_to_threshold(stats::mean(view))
}

pub fn median_threshold(view: &GrayImageView<'_>) -> u8 {
    truncate_to_threshold(stats::median(view))
}

/// Shannon entropy (natural log) of the class, renormalized to sum to one.
///
/// Empty bins and empty classes contribute zero.
fn class_entropy(counts: &[u64; NUM_BINS], class: Class, t: u8) -> f64 {
    let bins = &counts[class.bins(t)];
    let total: u64 = bins.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    -bins
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            p * p.ln()
        })
        .sum::<f64>()
}

/// Threshold maximizing background entropy plus foreground entropy.
pub fn max_entropy_threshold(hist: &Histogram) -> u8 {
    let counts = hist.counts();
    let mut best_t = 0u8;
    let mut best = f64::NEG_INFINITY;
    for t in 0..=u8::MAX {
        let h = class_entropy(counts, Class::Background, t)
            + class_entropy(counts, Class::Foreground, t);
        if h > best {
            best = h;
            best_t = t;
        }
    }
    best_t
}

/// Otsu threshold from running class sums.
///
/// Returns 0 when no threshold leaves both classes non-empty.
pub fn otsu_threshold(hist: &Histogram) -> u8 {
    let total = hist.total() as f64;
    let sum_total = hist.intensity_sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = 0f64;
    let mut best_t = 0u8;

    for (t, &h) in hist.counts().iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += (t as f64) * (h as f64);
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

#[inline]
fn gaussian(g: f64, mean: f64, variance: f64) -> f64 {
    let d = g - mean;
    (-(d * d) / (2.0 * variance)).exp() / (2.0 * std::f64::consts::PI * variance).sqrt()
}

/// Squared error between the normalized histogram and the two-Gaussian
/// mixture fitted from the class statistics at `t`.
///
/// `None` when either class is empty or has zero variance.
pub fn gmm_error(hist: &Histogram, probabilities: &[f64], t: u8) -> Option<f64> {
    let bg = hist.class_stats(Class::Background, t)?;
    let fg = hist.class_stats(Class::Foreground, t)?;
    if bg.variance <= 0.0 || fg.variance <= 0.0 {
        return None;
    }
    let error = probabilities
        .iter()
        .enumerate()
        .map(|(g, &p)| {
            let g = g as f64;
            let model = bg.probability * gaussian(g, bg.mean, bg.variance)
                + fg.probability * gaussian(g, fg.mean, fg.variance);
            (model - p) * (model - p)
        })
        .sum();
    Some(error)
}

/// Threshold minimizing [`gmm_error`]; 0 when no candidate is admissible.
pub fn gmm_error_threshold(hist: &Histogram) -> u8 {
    let Ok(normalized) = hist.normalized() else {
        return 0;
    };
    let probabilities = normalized.as_slice();

    let mut best: Option<(u8, f64)> = None;
    for t in 0..=u8::MAX {
        let Some(error) = gmm_error(hist, probabilities, t) else {
            trace!("gmm: skipping degenerate split at t={t}");
            continue;
        };
        if best.map_or(true, |(_, e)| error < e) {
            best = Some((t, error));
        }
    }
    best.map_or(0, |(t, _)| t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(data: &[u8], width: usize) -> GrayImageView<'_> {
        GrayImageView {
            width,
            height: data.len() / width,
            data,
        }
    }

    /// Two flat peaks: 20..=30 and 200..=210, `per_bin` samples per bin.
    fn two_plateaus(per_bin: usize) -> Vec<u8> {
        (20u8..=30)
            .chain(200u8..=210)
            .flat_map(|v| std::iter::repeat(v).take(per_bin))
            .collect()
    }

    #[test]
    fn parses_method_names() {
        assert_eq!("maxEntropy".parse(), Ok(ThresholdMethod::MaxEntropy));
        assert_eq!("max-entropy".parse(), Ok(ThresholdMethod::MaxEntropy));
        assert_eq!("GMM_ERROR".parse(), Ok(ThresholdMethod::GmmError));
        assert!("kittler".parse::<ThresholdMethod>().is_err());
        for m in ThresholdMethod::ALL {
            assert_eq!(m.name().parse(), Ok(m));
        }
    }

    #[test]
    fn mean_and_median_truncate() {
        let data = [1u8, 2, 2, 2];
        let v = view(&data, 4);
        // mean 1.75, median 2.0
        assert_eq!(mean_threshold(&v), 1);
        assert_eq!(median_threshold(&v), 2);

        let data = [1u8, 1, 2, 2];
        assert_eq!(median_threshold(&view(&data, 2)), 1);
    }

    #[test]
    fn fixed_threshold_ignores_content() {
        let data = [0u8; 4];
        let v = view(&data, 2);
        let hist = Histogram::from_view(&v);
        assert_eq!(ThresholdMethod::Fixed.select(&v, &hist), 127);
    }

    #[test]
    fn otsu_separates_two_clusters() {
        let mut data = vec![10u8; 50];
        data.extend(std::iter::repeat(240u8).take(50));
        let hist = Histogram::from_view(&view(&data, 10));
        let t = otsu_threshold(&hist);
        assert!((10..240).contains(&t), "t = {t}");
        // Every split between the clusters scores the same; the first wins.
        assert_eq!(t, 10);
    }

    #[test]
    fn otsu_of_uniform_image_is_zero() {
        let data = [77u8; 16];
        let hist = Histogram::from_view(&view(&data, 4));
        assert_eq!(otsu_threshold(&hist), 0);
    }

    #[test]
    fn max_entropy_and_otsu_agree_on_bimodal_histogram() {
        let data = two_plateaus(4);
        let hist = Histogram::from_view(&view(&data, data.len()));
        let e = max_entropy_threshold(&hist) as i32;
        let o = otsu_threshold(&hist) as i32;
        assert!((e - o).abs() <= 2, "entropy={e} otsu={o}");
        assert!((30..200).contains(&e));
    }

    #[test]
    fn max_entropy_skips_empty_bins() {
        let data = [0u8, 255];
        let hist = Histogram::from_view(&view(&data, 2));
        // Every split between the samples scores 0; keeping both in one class scores ln 2.
        assert_eq!(max_entropy_threshold(&hist), 255);
        let single = Histogram::from_view(&view(&data[..1], 1));
        assert_eq!(max_entropy_threshold(&single), 0);
    }

    #[test]
    fn gmm_error_skips_degenerate_splits() {
        let data = two_plateaus(3);
        let hist = Histogram::from_view(&view(&data, data.len()));
        let norm = hist.normalized().expect("non-empty");
        assert!(gmm_error(&hist, norm.as_slice(), 10).is_none());
        assert!(gmm_error(&hist, norm.as_slice(), 210).is_none());
        assert!(gmm_error(&hist, norm.as_slice(), 100).is_some());
    }

    #[test]
    fn gmm_error_separates_bimodal_histogram() {
        let data = two_plateaus(5);
        let hist = Histogram::from_view(&view(&data, data.len()));
        let t = gmm_error_threshold(&hist);
        assert!((30..200).contains(&t), "t = {t}");
    }

    #[test]
    fn gmm_of_uniform_image_falls_back_to_zero() {
        let data = [128u8; 9];
        let hist = Histogram::from_view(&view(&data, 3));
        assert_eq!(gmm_error_threshold(&hist), 0);
    }

    #[test]
    fn report_serializes_with_camel_case_keys() {
        let report: ThresholdReport = [
            (ThresholdMethod::MaxEntropy, 90u8),
            (ThresholdMethod::Fixed, 127),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&report).expect("serialize");
        assert_eq!(json, r#"{"fixed":127,"maxEntropy":90}"#);
        let back: ThresholdReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report);
        assert_eq!(report.to_string(), "fixed=127, maxEntropy=90");
    }

    #[test]
    fn select_thresholds_evaluates_each_method_once() {
        let data = two_plateaus(2);
        let v = view(&data, data.len());
        let report = select_thresholds(
            &v,
            &[
                ThresholdMethod::Otsu,
                ThresholdMethod::Fixed,
                ThresholdMethod::Otsu,
            ],
        );
        assert_eq!(report.len(), 2);
        assert_eq!(report.get(ThresholdMethod::Fixed), Some(127));
        assert_eq!(
            report.get(ThresholdMethod::Otsu),
            Some(otsu_threshold(&Histogram::from_view(&v)))
        );
    }
}
