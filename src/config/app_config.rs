use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{SamplerError, SamplerResult};

/// On-disk layout of an input dataset.
///
/// Each video folder under the input root holds a frames directory of images
/// and a labels directory of YOLO `.txt` files sharing the image stems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetLayout {
    pub frames_dir: String,
    pub labels_dir: String,
    /// Compared case-insensitively, without the leading dot
    pub image_extensions: Vec<String>,
    /// Compared case-sensitively, without the leading dot
    pub label_extension: String,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            frames_dir: "frames".to_string(),
            labels_dir: "labels".to_string(),
            image_extensions: ["jpg", "jpeg", "png", "bmp", "tiff", "tif"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            label_extension: "txt".to_string(),
        }
    }
}

impl DatasetLayout {
    /// Check whether a path has one of the image extensions
    pub fn is_image(&self, path: &Path) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext = ext.to_string_lossy();
                self.image_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
            }
            None => false,
        }
    }

    /// Check whether a path has the label extension (exact match)
    pub fn is_label(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy() == self.label_extension.as_str())
            .unwrap_or(false)
    }

    /// Label file name for an image stem
    pub fn label_file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.label_extension)
    }
}

/// Cadence for probing image resolutions during analysis.
///
/// Opening every image is expensive, so the resolution histogram is a sample:
/// the first `probe_first` images are always probed, after that only every
/// `probe_every`-th image by running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionSampling {
    pub probe_first: usize,
    /// Zero disables the periodic probe
    pub probe_every: usize,
}

impl Default for ResolutionSampling {
    fn default() -> Self {
        Self {
            probe_first: 10,
            probe_every: 10,
        }
    }
}

impl ResolutionSampling {
    /// Probe every image
    pub fn exhaustive() -> Self {
        Self {
            probe_first: 0,
            probe_every: 1,
        }
    }

    /// `ordinal` is the 1-based running image count across the whole analysis
    pub fn should_probe(&self, ordinal: usize) -> bool {
        ordinal <= self.probe_first || (self.probe_every > 0 && ordinal % self.probe_every == 0)
    }
}

/// Tunables for the statistics pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub layout: DatasetLayout,
    pub resolution_sampling: ResolutionSampling,
    pub top_resolutions: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            layout: DatasetLayout::default(),
            resolution_sampling: ResolutionSampling::default(),
            top_resolutions: 5,
        }
    }
}

/// Application configuration.
///
/// Every field has a default, so a configuration file only needs the values
/// it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: DatasetLayout,
    pub resolution_sampling: ResolutionSampling,
    pub top_resolutions: usize,
    pub default_sample_size: usize,
    pub default_seed: u64,
    pub output_images_dir: String,
    pub output_labels_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            layout: DatasetLayout::default(),
            resolution_sampling: ResolutionSampling::default(),
            top_resolutions: 5,
            default_sample_size: 50,
            default_seed: 42,
            output_images_dir: "images".to_string(),
            output_labels_dir: "labels".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> SamplerResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| SamplerError::io(path, e))?;
        let config = serde_json::from_str::<AppConfig>(&contents).map_err(|e| {
            SamplerError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            layout: self.layout.clone(),
            resolution_sampling: self.resolution_sampling,
            top_resolutions: self.top_resolutions,
        }
    }
}
