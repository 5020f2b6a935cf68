use super::ColmapError;

/// Represents a Colmap camera model.
///
/// The discriminants match the model ids stored in `cameras.bin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraModel {
    /// Simple pinhole camera model: f, cx, cy
    SimplePinhole = 0,
    /// Pinhole camera model: fx, fy, cx, cy
    Pinhole = 1,
    /// Simplified radial camera model: f, cx, cy, k
    SimpleRadial = 2,
    /// Radial camera model: f, cx, cy, k1, k2
    Radial = 3,
    /// OpenCV camera model: fx, fy, cx, cy, k1, k2, p1, p2
    OpenCV = 4,
    /// OpenCV fisheye camera model: fx, fy, cx, cy, k1, k2, k3, k4
    OpenCVFisheye = 5,
    /// Full OpenCV camera model: fx, fy, cx, cy, k1, k2, p1, p2, k3, k4, k5, k6
    FullOpenCV = 6,
    /// Field of view camera model: fx, fy, cx, cy, omega
    FOV = 7,
    /// Simple radial fisheye camera model: f, cx, cy, k
    SimpleRadialFisheye = 8,
    /// Radial fisheye camera model: f, cx, cy, k1, k2
    RadialFisheye = 9,
    /// Thin prism fisheye camera model: fx, fy, cx, cy, k1, k2, p1, p2, k3, k4, sx1, sy1
    ThinPrismFisheye = 10,
}

impl CameraModel {
    /// All the supported camera models, ordered by model id.
    pub const ALL: [CameraModel; 11] = [
        CameraModel::SimplePinhole,
        CameraModel::Pinhole,
        CameraModel::SimpleRadial,
        CameraModel::Radial,
        CameraModel::OpenCV,
        CameraModel::OpenCVFisheye,
        CameraModel::FullOpenCV,
        CameraModel::FOV,
        CameraModel::SimpleRadialFisheye,
        CameraModel::RadialFisheye,
        CameraModel::ThinPrismFisheye,
    ];

    /// The model name as written in `cameras.txt`.
    pub fn name(&self) -> &'static str {
        match self {
            CameraModel::SimplePinhole => "SIMPLE_PINHOLE",
            CameraModel::Pinhole => "PINHOLE",
            CameraModel::SimpleRadial => "SIMPLE_RADIAL",
            CameraModel::Radial => "RADIAL",
            CameraModel::OpenCV => "OPENCV",
            CameraModel::OpenCVFisheye => "OPENCV_FISHEYE",
            CameraModel::FullOpenCV => "FULL_OPENCV",
            CameraModel::FOV => "FOV",
            CameraModel::SimpleRadialFisheye => "SIMPLE_RADIAL_FISHEYE",
            CameraModel::RadialFisheye => "RADIAL_FISHEYE",
            CameraModel::ThinPrismFisheye => "THIN_PRISM_FISHEYE",
        }
    }

    /// The number of intrinsic parameters of the model.
    pub fn num_params(&self) -> usize {
        match self {
            CameraModel::SimplePinhole => 3,
            CameraModel::Pinhole => 4,
            CameraModel::SimpleRadial => 4,
            CameraModel::Radial => 5,
            CameraModel::OpenCV => 8,
            CameraModel::OpenCVFisheye => 8,
            CameraModel::FullOpenCV => 12,
            CameraModel::FOV => 5,
            CameraModel::SimpleRadialFisheye => 4,
            CameraModel::RadialFisheye => 5,
            CameraModel::ThinPrismFisheye => 12,
        }
    }

    /// Look up a model from its `cameras.bin` id.
    pub fn from_id(model_id: i32) -> Result<Self, ColmapError> {
        usize::try_from(model_id)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or_else(|| ColmapError::UnknownCameraModel(model_id.to_string()))
    }

    /// Check that `params` has the length the model requires.
    pub fn check_num_params(&self, params: &[f64]) -> Result<(), ColmapError> {
        if params.len() != self.num_params() {
            return Err(ColmapError::InvalidNumCameraParams {
                model: self.name(),
                expected: self.num_params(),
                actual: params.len(),
            });
        }
        Ok(())
    }
}

impl std::str::FromStr for CameraModel {
    type Err = ColmapError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.name() == name)
            .ok_or_else(|| ColmapError::UnknownCameraModel(name.to_string()))
    }
}

impl std::fmt::Display for CameraModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents a camera in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapCamera {
    /// Camera id
    pub camera_id: u32,
    /// Camera model
    pub model: CameraModel,
    /// Image width
    pub width: usize,
    /// Image height
    pub height: usize,
    /// Camera parameters, layout depends on the model
    pub params: Vec<f64>,
}

/// Represents an image in the Colmap system.
///
/// The pose maps world points into the camera frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapImage {
    /// Image name
    pub name: String,
    /// Image id
    pub image_id: u32,
    /// Camera id
    pub camera_id: u32,
    /// Rotation
    pub rotation: [f64; 4], // qw, qx, qy, qz
    /// Translation
    pub translation: [f64; 3], // x, y, z
    /// Points2d as (x, y, point3d_id), the id is -1 for unmatched keypoints
    pub points2d: Vec<(f64, f64, i64)>,
}

/// Represents a 3D point in the Colmap system.
#[derive(Debug, Clone, PartialEq)]
pub struct ColmapPoint3d {
    /// Point3d id
    pub point3d_id: u64,
    /// x, y, z coordinates
    pub xyz: [f64; 3],
    /// rgb color
    pub rgb: [u8; 3],
    /// Error
    pub error: f64,
    /// Track as (image_id, point2d_idx)
    pub track: Vec<(u32, u32)>,
}

impl ColmapPoint3d {
    /// Ids of the images observing this point.
    ///
    /// An image may appear more than once in a track.
    pub fn image_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.track.iter().map(|&(image_id, _)| image_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_model_names_roundtrip() -> Result<(), ColmapError> {
        for (idx, model) in CameraModel::ALL.iter().enumerate() {
            assert_eq!(model.name().parse::<CameraModel>()?, *model);
            assert_eq!(CameraModel::from_id(idx as i32)?, *model);
            assert_eq!(*model as usize, idx);
        }
        Ok(())
    }

    #[test]
    fn test_camera_model_unknown() {
        assert!("PINHOLE_3000".parse::<CameraModel>().is_err());
        assert!(CameraModel::from_id(-1).is_err());
        assert!(CameraModel::from_id(11).is_err());
    }

    #[test]
    fn test_check_num_params() {
        assert!(CameraModel::Pinhole.check_num_params(&[1.0, 1.0, 0.5, 0.5]).is_ok());
        assert!(matches!(
            CameraModel::SimplePinhole.check_num_params(&[1.0, 1.0, 0.5, 0.5]),
            Err(ColmapError::InvalidNumCameraParams {
                expected: 3,
                actual: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_observation_ids() {
        let point = ColmapPoint3d {
            point3d_id: 7,
            xyz: [0.0; 3],
            rgb: [0; 3],
            error: 0.5,
            track: vec![(1, 0), (4, 2)],
        };
        assert_eq!(point.image_ids().collect::<Vec<_>>(), vec![1, 4]);
    }
}
