use crate::error::PosesError;
use crate::reconstruction::Reconstruction;

/// Boolean point x image matrix, true where the point is observed by the image.
///
/// Rows follow the point order and columns the image order of the
/// [`Reconstruction`] it was built from. Stored column major so the points
/// seen by one image are contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityMatrix {
    num_points: usize,
    num_images: usize,
    data: Vec<bool>,
}

impl VisibilityMatrix {
    /// Build the visibility matrix from the tracks of the 3d points.
    ///
    /// # Errors
    ///
    /// [`PosesError::UnknownObserver`] if a track references an image that is
    /// not part of the reconstruction.
    pub fn from_reconstruction(reconstruction: &Reconstruction) -> Result<Self, PosesError> {
        let num_points = reconstruction.num_points();
        let num_images = reconstruction.num_images();
        let mut data = vec![false; num_points * num_images];

        for (p, point) in reconstruction.points3d().iter().enumerate() {
            for image_id in point.image_ids() {
                let i = reconstruction.image_index(image_id).ok_or(
                    PosesError::UnknownObserver {
                        point3d_id: point.point3d_id,
                        image_id,
                    },
                )?;
                data[i * num_points + p] = true;
            }
        }

        Ok(Self {
            num_points,
            num_images,
            data,
        })
    }

    /// The number of rows (points).
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// The number of columns (images).
    pub fn num_images(&self) -> usize {
        self.num_images
    }

    /// The visibility of all the points in image `i`.
    pub fn column(&self, i: usize) -> &[bool] {
        &self.data[i * self.num_points..(i + 1) * self.num_points]
    }
}
