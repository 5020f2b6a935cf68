use crate::linalg::{self, Mat44};

/// Point x image matrix of depths along the optical axis of each camera.
///
/// Entry (p, i) is the signed distance of point p to the image plane of
/// camera i, positive in front of the camera. It only carries meaning where
/// the point is visible in the image.
#[derive(Debug, Clone)]
pub struct DepthMatrix {
    data: faer::Mat<f64>,
}

impl DepthMatrix {
    /// Compute the depth of every point in every camera.
    ///
    /// The depth of point `x` in camera `i` is `z_i . (x - t_i)` where `z_i` is
    /// the third column of the rotation of `c2w[i]` and `t_i` its translation.
    /// All the pairs are evaluated at once as the product of the (P, 3) points
    /// with the (3, M) stacked axes, minus the per camera offset `z_i . t_i`.
    ///
    /// NOTE: the result is a dense (P, M) matrix of f64.
    ///
    /// # Arguments
    ///
    /// * `points` - The world positions of the 3d points.
    /// * `c2w` - The camera to world matrices.
    ///
    /// Example:
    ///
    /// ```
    /// use nerf_poses::depth::DepthMatrix;
    /// use nerf_poses::linalg::identity_mat44;
    ///
    /// let mut c2w = identity_mat44();
    /// c2w[2][3] = 5.0;
    /// let depth = DepthMatrix::compute(&[[0.0, 0.0, 1.0], [0.0, 0.0, 10.0]], &[c2w]);
    /// assert_eq!(depth.get(0, 0), -4.0);
    /// assert_eq!(depth.get(1, 0), 5.0);
    /// ```
    pub fn compute(points: &[[f64; 3]], c2w: &[Mat44]) -> Self {
        let num_points = points.len();
        let num_images = c2w.len();

        let points_mat = faer::Mat::<f64>::from_fn(num_points, 3, |p, k| points[p][k]);
        let axes_mat = faer::Mat::<f64>::from_fn(3, num_images, |k, i| c2w[i][k][2]);

        let offsets = c2w
            .iter()
            .map(|m| {
                linalg::dot_product3(&linalg::mat44_z_axis(m), &linalg::mat44_translation(m))
            })
            .collect::<Vec<_>>();

        let projected = &points_mat * &axes_mat;
        let data = faer::Mat::<f64>::from_fn(num_points, num_images, |p, i| {
            projected.read(p, i) - offsets[i]
        });

        Self { data }
    }

    /// The number of rows (points).
    pub fn num_points(&self) -> usize {
        self.data.nrows()
    }

    /// The number of columns (images).
    pub fn num_images(&self) -> usize {
        self.data.ncols()
    }

    /// The depth of point `p` in image `i`.
    pub fn get(&self, p: usize, i: usize) -> f64 {
        self.data.read(p, i)
    }

    /// The depths of all the points in image `i`.
    pub fn column(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.num_points()).map(move |p| self.data.read(p, i))
    }
}
