use crate::depth::DepthMatrix;
use crate::error::PosesError;
use crate::visibility::VisibilityMatrix;

/// The near and far depths of the scene seen by one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    /// Near bound
    pub near: f64,
    /// Far bound
    pub far: f64,
}

/// The percentiles used to trim the visible depths of an image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileBounds {
    near: f64,
    far: f64,
}

impl Default for PercentileBounds {
    /// Drops the lowest and highest 0.1% of the depths.
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 99.9,
        }
    }
}

impl PercentileBounds {
    /// Create the percentile bounds.
    ///
    /// # Arguments
    ///
    /// * `near` - The percentile of the near bound, in [0, 100].
    /// * `far` - The percentile of the far bound, in [near, 100].
    pub fn new(near: f64, far: f64) -> Result<Self, PosesError> {
        for q in [near, far] {
            if !(0.0..=100.0).contains(&q) {
                return Err(PosesError::InvalidPercentile(q));
            }
        }
        if near > far {
            return Err(PosesError::InvalidPercentileOrder { near, far });
        }
        Ok(Self { near, far })
    }

    /// The bounds that keep every depth, min and max.
    pub fn min_max() -> Self {
        Self {
            near: 0.0,
            far: 100.0,
        }
    }

    /// The percentile of the near bound.
    pub fn near(&self) -> f64 {
        self.near
    }

    /// The percentile of the far bound.
    pub fn far(&self) -> f64 {
        self.far
    }
}

/// Compute a percentile of sorted values with linear interpolation.
///
/// The q-th percentile sits at rank `q / 100 * (n - 1)` and interpolates
/// between the two closest order statistics, so 0 gives the minimum and 100
/// the maximum.
///
/// Returns `None` if `sorted` is empty.
///
/// PRECONDITION: `sorted` is sorted in ascending order and `q` is in [0, 100].
pub fn percentile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = q / 100.0 * last as f64;
    let lo = (rank.floor() as usize).min(last);
    let hi = (rank.ceil() as usize).min(last);
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Compute the depth range of image `i` from the depths of its visible points.
///
/// Returns `None` if no point is visible in the image.
pub fn depth_range(
    depth: &DepthMatrix,
    visibility: &VisibilityMatrix,
    i: usize,
    bounds: &PercentileBounds,
) -> Option<DepthRange> {
    let mut visible = depth
        .column(i)
        .zip(visibility.column(i))
        .filter_map(|(z, &seen)| seen.then_some(z))
        .collect::<Vec<_>>();
    visible.sort_by(f64::total_cmp);

    Some(DepthRange {
        near: percentile(&visible, bounds.near)?,
        far: percentile(&visible, bounds.far)?,
    })
}

/// Compute the depth range of every image, in image order.
pub fn depth_ranges(
    depth: &DepthMatrix,
    visibility: &VisibilityMatrix,
    bounds: &PercentileBounds,
) -> Vec<Option<DepthRange>> {
    (0..visibility.num_images())
        .map(|i| depth_range(depth, visibility, i, bounds))
        .collect()
}
