mod binary;
mod text;
mod types;

pub use binary::*;
pub use text::*;
pub use types::*;

use std::path::Path;

/// Error types for the COLMAP module.
#[derive(Debug, thiserror::Error)]
pub enum ColmapError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    IoError(#[from] std::io::Error),

    /// Unknown camera model name or id
    #[error("Unknown camera model {0}")]
    UnknownCameraModel(String),

    /// Invalid number of camera parameters
    #[error("Invalid number of camera parameters for {model}: expected {expected}, got {actual}")]
    InvalidNumCameraParams {
        /// camera model name
        model: &'static str,
        /// number of parameters the model requires
        expected: usize,
        /// number of parameters found
        actual: usize,
    },

    /// Parse error
    #[error("Parse error {0}")]
    ParseError(String),

    /// The directory holds neither a complete binary nor a complete text model
    #[error("no COLMAP model found in {0}")]
    ModelNotFound(String),
}

/// The on-disk format of a COLMAP sparse model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// `cameras.bin`, `images.bin`, `points3D.bin`
    Binary,
    /// `cameras.txt`, `images.txt`, `points3D.txt`
    Text,
}

impl ModelFormat {
    /// File extension used by the format, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Binary => ".bin",
            ModelFormat::Text => ".txt",
        }
    }

    /// Detect the format of the model stored in `dir`.
    ///
    /// The binary format wins when both are complete.
    pub fn detect(dir: impl AsRef<Path>) -> Result<Self, ColmapError> {
        let dir = dir.as_ref();
        [ModelFormat::Binary, ModelFormat::Text]
            .into_iter()
            .find(|format| {
                ["cameras", "images", "points3D"]
                    .iter()
                    .all(|stem| dir.join(format!("{stem}{}", format.extension())).is_file())
            })
            .ok_or_else(|| ColmapError::ModelNotFound(dir.display().to_string()))
    }
}

/// The three collections of a COLMAP sparse model, in file order.
pub type ColmapModel = (Vec<ColmapCamera>, Vec<ColmapImage>, Vec<ColmapPoint3d>);

/// Read a COLMAP sparse model directory in either binary or text format.
///
/// # Arguments
///
/// * `dir` - The directory holding the cameras, images and points3D files.
///
/// # Returns
///
/// The cameras, images and 3d points, in the order they appear on disk.
pub fn read_model(dir: impl AsRef<Path>) -> Result<ColmapModel, ColmapError> {
    let dir = dir.as_ref();
    let format = ModelFormat::detect(dir)?;
    log::debug!("reading {:?} COLMAP model from {}", format, dir.display());

    let model = match format {
        ModelFormat::Binary => (
            read_cameras_bin(dir.join("cameras.bin"))?,
            read_images_bin(dir.join("images.bin"))?,
            read_points3d_bin(dir.join("points3D.bin"))?,
        ),
        ModelFormat::Text => (
            read_cameras_txt(dir.join("cameras.txt"))?,
            read_images_txt(dir.join("images.txt"))?,
            read_points3d_txt(dir.join("points3D.txt"))?,
        ),
    };

    Ok(model)
}
