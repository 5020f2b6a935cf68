use faer::prelude::SolverCore;

/// A 4x4 matrix stored row major.
pub type Mat44 = [[f64; 4]; 4];

/// Pivots below this magnitude, relative to the linear part of a transform, mark it as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// Compute the dot product of two 3d vectors.
pub fn dot_product3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Compute the rotation matrix of a quaternion.
///
/// # Arguments
///
/// * `q` - The quaternion as (qw, qx, qy, qz).
///
/// # Returns
///
/// The 3x3 rotation matrix, row major.
///
/// PRECONDITION: the quaternion is unit norm, no normalization is performed.
pub fn quaternion_to_rotation_matrix(q: &[f64; 4]) -> [[f64; 3]; 3] {
    let [w, x, y, z] = *q;
    [
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - w * z),
            2.0 * (x * z + w * y),
        ],
        [
            2.0 * (x * y + w * z),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - w * x),
        ],
        [
            2.0 * (x * z - w * y),
            2.0 * (y * z + w * x),
            1.0 - 2.0 * (x * x + y * y),
        ],
    ]
}

/// Compose a rigid transform from a rotation and a translation.
pub fn rigid_to_mat44(rotation: &[[f64; 3]; 3], translation: &[f64; 3]) -> Mat44 {
    let mut mat = [[0.0; 4]; 4];
    for i in 0..3 {
        mat[i][..3].copy_from_slice(&rotation[i]);
        mat[i][3] = translation[i];
    }
    mat[3][3] = 1.0;
    mat
}

/// Multiply two 4x4 matrices.
pub fn mat44_mul(a: &Mat44, b: &Mat44) -> Mat44 {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Invert a general 4x4 matrix with an LU decomposition with partial pivoting.
///
/// The matrix is singular if a pivot of the decomposition falls below
/// `1e-12` times the largest entry of its first three columns. The
/// translation column does not enter this scale, so a far away camera does
/// not make a rigid transform singular.
///
/// Returns `None` if the matrix is singular or holds a non finite value.
pub fn inverse_mat44(mat: &Mat44) -> Option<Mat44> {
    if mat.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    let scale = mat
        .iter()
        .flat_map(|row| &row[..3])
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return None;
    }

    let lu = faer::Mat::<f64>::from_fn(4, 4, |i, j| mat[i][j]).partial_piv_lu();
    let u = lu.compute_u();
    if (0..4).any(|k| u.read(k, k).abs() <= SINGULAR_EPS * scale) {
        return None;
    }

    let inv = lu.inverse();
    Some(std::array::from_fn(|i| std::array::from_fn(|j| inv.read(i, j))))
}

/// The translation column of a 4x4 rigid transform.
pub fn mat44_translation(mat: &Mat44) -> [f64; 3] {
    [mat[0][3], mat[1][3], mat[2][3]]
}

/// The third column of the rotation of a 4x4 rigid transform.
pub fn mat44_z_axis(mat: &Mat44) -> [f64; 3] {
    [mat[0][2], mat[1][2], mat[2][2]]
}

/// The 4x4 identity matrix.
pub fn identity_mat44() -> Mat44 {
    let mut mat = [[0.0; 4]; 4];
    for (i, row) in mat.iter_mut().enumerate() {
        row[i] = 1.0;
    }
    mat
}
