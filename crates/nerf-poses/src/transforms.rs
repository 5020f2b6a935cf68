use crate::error::PosesError;
use crate::io::colmap::ColmapImage;
use crate::linalg::{self, Mat44};

/// The world to camera and camera to world matrices of a sequence of images.
///
/// Both stacks share the index space of the image sequence they were built from.
#[derive(Debug, Clone)]
pub struct CameraTransforms {
    w2c: Vec<Mat44>,
    c2w: Vec<Mat44>,
}

impl CameraTransforms {
    /// Build the transforms of a sequence of images.
    ///
    /// The world to camera matrix holds the rotation of the image quaternion and
    /// its translation. The camera to world matrix is its general inverse.
    ///
    /// # Arguments
    ///
    /// * `images` - The images in a stable order.
    ///
    /// # Errors
    ///
    /// [`PosesError::SingularTransform`] if a world to camera matrix cannot be inverted.
    pub fn from_images(images: &[ColmapImage]) -> Result<Self, PosesError> {
        let w2c = images
            .iter()
            .map(|image| {
                let rotation = linalg::quaternion_to_rotation_matrix(&image.rotation);
                linalg::rigid_to_mat44(&rotation, &image.translation)
            })
            .collect::<Vec<_>>();

        let c2w = w2c
            .iter()
            .zip(images)
            .map(|(mat, image)| {
                linalg::inverse_mat44(mat).ok_or(PosesError::SingularTransform {
                    image_id: image.image_id,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { w2c, c2w })
    }

    /// The number of cameras.
    pub fn len(&self) -> usize {
        self.c2w.len()
    }

    /// Whether there are no cameras.
    pub fn is_empty(&self) -> bool {
        self.c2w.is_empty()
    }

    /// The world to camera matrices.
    pub fn w2c(&self) -> &[Mat44] {
        &self.w2c
    }

    /// The camera to world matrices.
    pub fn c2w(&self) -> &[Mat44] {
        &self.c2w
    }

    /// The top three rows of the i-th camera to world matrix, row major.
    pub fn flattened_pose(&self, idx: usize) -> [f64; 12] {
        let mut pose = [0.0; 12];
        for (dst, row) in pose.chunks_exact_mut(4).zip(&self.c2w[idx]) {
            dst.copy_from_slice(row);
        }
        pose
    }
}
