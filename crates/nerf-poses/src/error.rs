use crate::io::colmap::ColmapError;

/// Error types for the pose and depth bounds extraction.
#[derive(Debug, thiserror::Error)]
pub enum PosesError {
    /// An image references a camera that is not part of the reconstruction
    #[error("image {image_id} references missing camera {camera_id}")]
    MissingCamera {
        /// id of the image holding the reference
        image_id: u32,
        /// id of the missing camera
        camera_id: u32,
    },

    /// A 3d point is observed by an image that is not part of the reconstruction
    #[error("point3d {point3d_id} is observed by unknown image {image_id}")]
    UnknownObserver {
        /// id of the point holding the reference
        point3d_id: u64,
        /// id of the unknown image
        image_id: u32,
    },

    /// Two entries of the same collection share an id
    #[error("duplicate {kind} id {id}")]
    DuplicateId {
        /// the collection holding the duplicate: camera, image or point3d
        kind: &'static str,
        /// the duplicated id
        id: u64,
    },

    /// The world to camera matrix of an image cannot be inverted
    #[error("world to camera transform of image {image_id} is singular")]
    SingularTransform {
        /// id of the image
        image_id: u32,
    },

    /// No 3d point is visible from an image, its depth range is undefined
    #[error("image {image_id} ({image_name}) has no visible points")]
    EmptyVisibility {
        /// id of the image
        image_id: u32,
        /// name of the image
        image_name: String,
    },

    /// A per image input does not hold one entry per image
    #[error("expected {expected} {what}, one per image, got {actual}")]
    LengthMismatch {
        /// the mismatching input
        what: &'static str,
        /// the number of images
        expected: usize,
        /// the number of entries
        actual: usize,
    },

    /// A percentile outside of [0, 100]
    #[error("invalid percentile {0}, expected a value in [0, 100]")]
    InvalidPercentile(f64),

    /// The near percentile is above the far percentile
    #[error("near percentile {near} is above far percentile {far}")]
    InvalidPercentileOrder {
        /// near percentile
        near: f64,
        /// far percentile
        far: f64,
    },

    /// Error reading the reconstruction
    #[error(transparent)]
    Colmap(#[from] ColmapError),

    /// Error writing the output table
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// Error reading or writing file
    #[error("error reading or writing file")]
    Io(#[from] std::io::Error),
}

impl PosesError {
    /// Whether the error comes from references between cameras, images and
    /// points that do not resolve.
    pub fn is_input_inconsistency(&self) -> bool {
        matches!(
            self,
            PosesError::MissingCamera { .. }
                | PosesError::UnknownObserver { .. }
                | PosesError::DuplicateId { .. }
        )
    }
}
