use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use nerf_poses::{range::PercentileBounds, EmptyVisibilityPolicy, ExtractOptions, PosesError};

/// Error types for the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("error reading config file {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    /// The configuration file is not valid JSON for [`Config`]
    #[error("error parsing config file")]
    Parse(#[from] serde_json::Error),

    /// The extraction options are invalid
    #[error(transparent)]
    Options(#[from] PosesError),
}

/// Settings of a run, read from a JSON file.
///
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory of the scene
    pub basedir: PathBuf,
    /// COLMAP database file name, relative to `basedir`
    pub db_name: String,
    /// File receiving the COLMAP output, relative to `basedir`
    pub log_file_name: String,
    /// Folder with the input images, relative to `basedir`
    pub img_folder_name: String,
    /// Folder receiving the sparse models, relative to `basedir`
    pub sparse_folder_name: String,
    /// The sparse model to read inside `sparse_folder_name`
    pub model_name: String,
    /// Path of the output table
    pub output_path: PathBuf,
    /// Read an existing sparse model instead of running COLMAP
    pub skip_colmap: bool,
    /// Extra `--key value` arguments of the feature extractor
    pub feature_extractor: BTreeMap<String, String>,
    /// Extra `--key value` arguments of the mapper
    pub mapper: BTreeMap<String, String>,
    /// Percentile of the near bound
    pub near_percentile: f64,
    /// Percentile of the far bound
    pub far_percentile: f64,
    /// Keep images without visible points with empty bounds instead of failing
    pub allow_empty_visibility: bool,
    /// Fractional digits of the list columns
    pub precision: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        let bounds = PercentileBounds::default();
        Self {
            basedir: PathBuf::from("."),
            db_name: "database.db".to_string(),
            log_file_name: "colmap_output.txt".to_string(),
            img_folder_name: "images".to_string(),
            sparse_folder_name: "sparse".to_string(),
            model_name: "0".to_string(),
            output_path: PathBuf::from("poses_bounds.csv"),
            skip_colmap: false,
            feature_extractor: BTreeMap::new(),
            mapper: BTreeMap::new(),
            near_percentile: bounds.near(),
            far_percentile: bounds.far(),
            allow_empty_visibility: false,
            precision: None,
        }
    }
}

impl Config {
    /// Read the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_json(&text)
    }

    /// Parse the configuration from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The COLMAP database path.
    pub fn database_path(&self) -> PathBuf {
        self.basedir.join(&self.db_name)
    }

    /// The input images folder.
    pub fn image_path(&self) -> PathBuf {
        self.basedir.join(&self.img_folder_name)
    }

    /// The folder where the mapper writes its models.
    pub fn sparse_path(&self) -> PathBuf {
        self.basedir.join(&self.sparse_folder_name)
    }

    /// The sparse model directory that is read.
    pub fn model_path(&self) -> PathBuf {
        self.sparse_path().join(&self.model_name)
    }

    /// The file receiving the COLMAP output.
    pub fn log_file_path(&self) -> PathBuf {
        self.basedir.join(&self.log_file_name)
    }

    /// The extraction options of the library.
    pub fn extract_options(&self) -> Result<ExtractOptions, ConfigError> {
        Ok(ExtractOptions {
            bounds: PercentileBounds::new(self.near_percentile, self.far_percentile)?,
            empty_visibility: if self.allow_empty_visibility {
                EmptyVisibilityPolicy::Sentinel
            } else {
                EmptyVisibilityPolicy::Fail
            },
            precision: self.precision,
        })
    }
}
