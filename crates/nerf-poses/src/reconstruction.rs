use std::path::Path;

use crate::error::PosesError;
use crate::io::colmap::{self, ColmapCamera, ColmapImage, ColmapPoint3d};

/// A loaded sparse reconstruction with a stable ordering.
///
/// Cameras, images and points are sorted by id once at construction. Every
/// index based structure derived from it (transforms, visibility, depths,
/// output rows) uses this order.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    cameras: Vec<ColmapCamera>,
    images: Vec<ColmapImage>,
    points3d: Vec<ColmapPoint3d>,
}

impl Reconstruction {
    /// Create a reconstruction from the collections of a sparse model.
    ///
    /// # Arguments
    ///
    /// * `cameras` - The cameras, in any order.
    /// * `images` - The images, in any order.
    /// * `points3d` - The 3d points, in any order.
    ///
    /// # Errors
    ///
    /// [`PosesError::DuplicateId`] if two entries of a collection share an id.
    pub fn new(
        mut cameras: Vec<ColmapCamera>,
        mut images: Vec<ColmapImage>,
        mut points3d: Vec<ColmapPoint3d>,
    ) -> Result<Self, PosesError> {
        cameras.sort_by_key(|c| c.camera_id);
        images.sort_by_key(|i| i.image_id);
        points3d.sort_by_key(|p| p.point3d_id);

        check_unique("camera", cameras.iter().map(|c| c.camera_id as u64))?;
        check_unique("image", images.iter().map(|i| i.image_id as u64))?;
        check_unique("point3d", points3d.iter().map(|p| p.point3d_id))?;

        Ok(Self {
            cameras,
            images,
            points3d,
        })
    }

    /// Read a COLMAP sparse model directory, binary or text.
    pub fn read(dir: impl AsRef<Path>) -> Result<Self, PosesError> {
        let (cameras, images, points3d) = colmap::read_model(dir)?;
        log::info!(
            "loaded reconstruction with {} cameras, {} images and {} points",
            cameras.len(),
            images.len(),
            points3d.len()
        );
        Self::new(cameras, images, points3d)
    }

    /// The cameras sorted by id.
    pub fn cameras(&self) -> &[ColmapCamera] {
        &self.cameras
    }

    /// The images sorted by id.
    pub fn images(&self) -> &[ColmapImage] {
        &self.images
    }

    /// The 3d points sorted by id.
    pub fn points3d(&self) -> &[ColmapPoint3d] {
        &self.points3d
    }

    /// The number of images.
    pub fn num_images(&self) -> usize {
        self.images.len()
    }

    /// The number of 3d points.
    pub fn num_points(&self) -> usize {
        self.points3d.len()
    }

    /// Look up a camera by id.
    pub fn camera(&self, camera_id: u32) -> Option<&ColmapCamera> {
        self.cameras
            .binary_search_by_key(&camera_id, |c| c.camera_id)
            .ok()
            .map(|idx| &self.cameras[idx])
    }

    /// The position of an image in the sorted image order.
    pub fn image_index(&self, image_id: u32) -> Option<usize> {
        self.images
            .binary_search_by_key(&image_id, |i| i.image_id)
            .ok()
    }

    /// The world positions of the 3d points, in point order.
    pub fn point_positions(&self) -> Vec<[f64; 3]> {
        self.points3d.iter().map(|p| p.xyz).collect()
    }
}

// NOTE: expects the ids sorted
fn check_unique(kind: &'static str, ids: impl Iterator<Item = u64>) -> Result<(), PosesError> {
    let mut prev = None;
    for id in ids {
        if prev == Some(id) {
            return Err(PosesError::DuplicateId { kind, id });
        }
        prev = Some(id);
    }
    Ok(())
}
