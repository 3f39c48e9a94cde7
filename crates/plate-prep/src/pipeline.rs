use log::info;
use serde::{Deserialize, Serialize};

use crate::components::{label_components, Component, LabelError, LabelImage, LabelingMode};
use crate::core::{BinaryImage, GrayImageView, ImageError};
use crate::threshold::{binarize_all, select_thresholds, vote, ThresholdMethod, ThresholdReport, VoteError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the preprocessing pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("no threshold methods configured")]
    NoMethods,

    #[error(transparent)]
    Vote(#[from] VoteError),

    #[error(transparent)]
    Label(#[from] LabelError),
}

fn default_methods() -> Vec<ThresholdMethod> {
    ThresholdMethod::ENSEMBLE.to_vec()
}

/// Configuration of one preprocessing run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// Selectors whose binarizations are voted on. Duplicates count once.
    #[serde(default = "default_methods")]
    pub methods: Vec<ThresholdMethod>,
    /// Label resolution policy.
    #[serde(default)]
    pub labeling: LabelingMode,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            labeling: LabelingMode::default(),
        }
    }
}

/// Output of a preprocessing run.
#[derive(Clone, Debug)]
pub struct PreprocessResult {
    /// Cut point chosen by each selector.
    pub thresholds: ThresholdReport,
    /// Majority vote of the per-threshold binarizations.
    pub binary: BinaryImage,
    /// Canonical labels of `binary`.
    pub labels: LabelImage,
    /// Foreground pixels grouped by label.
    pub foreground: Vec<Component>,
}

impl PreprocessResult {
    #[inline]
    pub fn num_components(&self) -> usize {
        self.labels.num_components()
    }

    #[inline]
    pub fn num_foreground_components(&self) -> usize {
        self.foreground.len()
    }
}

/// Thresholds -> binarize -> vote -> label.
pub struct PlatePreprocessor {
    params: PipelineParams,
}

impl PlatePreprocessor {
    pub fn new(params: PipelineParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Run only the threshold selectors.
    pub fn thresholds(&self, view: &GrayImageView<'_>) -> Result<ThresholdReport, PipelineError> {
        view.validate()?;
        if self.params.methods.is_empty() {
            return Err(PipelineError::NoMethods);
        }
        let thresholds = select_thresholds(view, &self.params.methods);
        info!("thresholds: {thresholds}");
        Ok(thresholds)
    }

    /// Run the full pipeline on one grayscale image.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, view), fields(width = view.width, height = view.height))
    )]
    pub fn run(&self, view: &GrayImageView<'_>) -> Result<PreprocessResult, PipelineError> {
        let thresholds = self.thresholds(view)?;
        let binary = vote(&binarize_all(view, &thresholds)?)?;
        let labels = label_components(&binary, self.params.labeling)?;
        let foreground = labels.foreground_components(&binary)?;
        info!(
            "{} components, {} foreground",
            labels.num_components(),
            foreground.len()
        );
        Ok(PreprocessResult {
            thresholds,
            binary,
            labels,
            foreground,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GrayImage;

    #[test]
    fn default_params_use_the_five_way_ensemble() {
        let params = PipelineParams::default();
        assert_eq!(params.methods.len(), 5);
        assert!(!params.methods.contains(&ThresholdMethod::GmmError));
        assert_eq!(params.labeling, LabelingMode::ForwardPropagation);
    }

    #[test]
    fn params_fill_missing_fields_from_defaults() {
        let params: PipelineParams = serde_json::from_str(r#"{"labeling":"union_find"}"#).unwrap();
        assert_eq!(params.methods, ThresholdMethod::ENSEMBLE.to_vec());
        assert_eq!(params.labeling, LabelingMode::UnionFind);
    }

    #[test]
    fn empty_method_list_is_rejected() {
        let img = GrayImage::filled(2, 2, 9).unwrap();
        let pre = PlatePreprocessor::new(PipelineParams {
            methods: Vec::new(),
            ..PipelineParams::default()
        });
        assert!(matches!(pre.run(&img.view()), Err(PipelineError::NoMethods)));
    }

    #[test]
    fn malformed_view_is_rejected_before_processing() {
        let data = [1u8, 2, 3];
        let view = GrayImageView {
            width: 2,
            height: 2,
            data: &data,
        };
        let pre = PlatePreprocessor::new(PipelineParams::default());
        assert!(matches!(
            pre.run(&view),
            Err(PipelineError::Image(ImageError::InvalidBuffer { .. }))
        ));
    }
}
