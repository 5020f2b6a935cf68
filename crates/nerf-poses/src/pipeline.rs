use crate::depth::DepthMatrix;
use crate::error::PosesError;
use crate::range::{self, PercentileBounds};
use crate::reconstruction::Reconstruction;
use crate::records::{self, PoseRecord};
use crate::transforms::CameraTransforms;
use crate::visibility::VisibilityMatrix;

/// What to do with an image that sees no 3d point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyVisibilityPolicy {
    /// Abort with [`PosesError::EmptyVisibility`].
    #[default]
    Fail,
    /// Keep the row with empty near and far values and log a warning.
    Sentinel,
}

/// Options of the extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Percentiles used for the near and far bounds.
    pub bounds: PercentileBounds,
    /// Handling of images without visible points.
    pub empty_visibility: EmptyVisibilityPolicy,
    /// Number of fractional digits of the list columns, `None` for shortest round trip.
    pub precision: Option<usize>,
}

/// Extract the pose and depth range of every image of a reconstruction.
///
/// Returns one record per image, ordered by image id.
///
/// # Errors
///
/// Any inconsistency between cameras, images and points, a singular world to
/// camera transform, or an image without visible points under
/// [`EmptyVisibilityPolicy::Fail`]. No record is returned on error.
pub fn extract_pose_records(
    reconstruction: &Reconstruction,
    options: &ExtractOptions,
) -> Result<Vec<PoseRecord>, PosesError> {
    let now = std::time::Instant::now();

    let transforms = CameraTransforms::from_images(reconstruction.images())?;
    let visibility = VisibilityMatrix::from_reconstruction(reconstruction)?;
    log::debug!(
        "built {} transforms and a {}x{} visibility matrix",
        transforms.len(),
        visibility.num_points(),
        visibility.num_images()
    );

    let depth = DepthMatrix::compute(&reconstruction.point_positions(), transforms.c2w());
    let ranges = range::depth_ranges(&depth, &visibility, &options.bounds);

    for (image, range) in reconstruction.images().iter().zip(&ranges) {
        if range.is_some() {
            continue;
        }
        match options.empty_visibility {
            EmptyVisibilityPolicy::Fail => {
                return Err(PosesError::EmptyVisibility {
                    image_id: image.image_id,
                    image_name: image.name.clone(),
                })
            }
            EmptyVisibilityPolicy::Sentinel => log::warn!(
                "image {} ({}) has no visible points, near and far are left empty",
                image.image_id,
                image.name
            ),
        }
    }

    let records =
        records::assemble_records(reconstruction, &transforms, &ranges, options.precision)?;
    log::debug!("extracted {} records in {:?}", records.len(), now.elapsed());

    Ok(records)
}
