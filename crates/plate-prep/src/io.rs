//! JSON configuration and report helpers for the preprocessing pipeline.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::components::{Component, LabelingMode};
use crate::pipeline::{PipelineParams, PreprocessResult};
use crate::threshold::{ThresholdMethod, ThresholdReport};

#[derive(thiserror::Error, Debug)]
pub enum PrepIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration for one preprocessing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepConfig {
    pub image_path: String,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub methods: Option<Vec<ThresholdMethod>>,
    #[serde(default)]
    pub labeling: Option<LabelingMode>,
    /// Store the pixel lists of foreground components in the report.
    #[serde(default)]
    pub include_points: bool,
}

impl PrepConfig {
    /// Config for `image_path` with every option at its default.
    pub fn for_image(image_path: impl Into<String>) -> Self {
        Self {
            image_path: image_path.into(),
            output_path: None,
            methods: None,
            labeling: None,
            include_points: false,
        }
    }

    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PrepIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PrepIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("plate_prep_report.json"))
    }

    /// Build pipeline parameters, applying overrides from the config.
    pub fn build_params(&self) -> PipelineParams {
        let mut params = PipelineParams::default();
        if let Some(methods) = self.methods.clone() {
            params.methods = methods;
        }
        if let Some(labeling) = self.labeling {
            params.labeling = labeling;
        }
        params
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepReport {
    pub image_path: String,
    #[serde(default)]
    pub config_path: Option<String>,
    pub width: usize,
    pub height: usize,
    pub params: PipelineParams,
    #[serde(default)]
    pub thresholds: Option<ThresholdReport>,
    #[serde(default)]
    pub num_components: Option<usize>,
    #[serde(default)]
    pub num_foreground_components: Option<usize>,
    #[serde(default)]
    pub foreground_pixels: Option<usize>,
    #[serde(default)]
    pub foreground_components: Option<Vec<Component>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PrepReport {
    /// Build a base report before the pipeline runs.
    pub fn new(
        image_path: impl Into<String>,
        width: usize,
        height: usize,
        params: PipelineParams,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            config_path: None,
            width,
            height,
            params,
            thresholds: None,
            num_components: None,
            num_foreground_components: None,
            foreground_pixels: None,
            foreground_components: None,
            error: None,
        }
    }

    /// Populate the report from a pipeline result.
    pub fn set_result(&mut self, result: &PreprocessResult, include_points: bool) {
        self.thresholds = Some(result.thresholds.clone());
        self.num_components = Some(result.num_components());
        self.num_foreground_components = Some(result.num_foreground_components());
        self.foreground_pixels = Some(result.binary.count_foreground());
        self.foreground_components = include_points.then(|| result.foreground.clone());
        self.error = None;
    }

    /// Record an error message in the report.
    pub fn set_error(&mut self, err: impl ToString) {
        self.error = Some(err.to_string());
    }

    /// Load a JSON report from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PrepIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write the report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), PrepIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
