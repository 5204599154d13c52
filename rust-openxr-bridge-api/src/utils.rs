use crate::Quat;

// Row-major 4x4 identity
pub const IDENTITY_MATRIX: [f64; 16] = [1.0, 0.0, 0.0, 0.0,  0.0, 1.0, 0.0, 0.0,  0.0, 0.0, 1.0, 0.0,  0.0, 0.0, 0.0, 1.0];

// Rotation-only 4x4 matrix for a quaternion, laid out for row vectors (v' = v * M)
// so that it can be written straight into a scene graph transform op.
// Non-unit quaternions are scaled out rather than renormalized first.
pub fn rotation_matrix(q: &Quat) -> [f64; 16] {
    let n = q.norm_squared();
    if n == 0.0 {
        return IDENTITY_MATRIX;
    }
    let s = 2.0 / n;
    let (w, x, y, z) = (q.w, q.x, q.y, q.z);

    let xx = x * x * s;
    let yy = y * y * s;
    let zz = z * z * s;
    let xy = x * y * s;
    let xz = x * z * s;
    let yz = y * z * s;
    let wx = w * x * s;
    let wy = w * y * s;
    let wz = w * z * s;

    [
        1.0 - (yy + zz), xy + wz,         xz - wy,         0.0,
        xy - wz,         1.0 - (xx + zz), yz + wx,         0.0,
        xz + wy,         yz - wx,         1.0 - (xx + yy), 0.0,
        0.0,             0.0,             0.0,             1.0,
    ]
}

// Transforms a row vector by the upper 3x3 block of a row-major matrix
pub fn transform_vector(v: &[f64; 3], m: &[f64; 16]) -> [f64; 3] {
    [
        v[0] * m[0] + v[1] * m[4] + v[2] * m[8],
        v[0] * m[1] + v[1] * m[5] + v[2] * m[9],
        v[0] * m[2] + v[1] * m[6] + v[2] * m[10],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Axis, Quat};
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_eq(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-12, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn identity_quaternion_gives_identity_matrix() {
        assert_eq!(rotation_matrix(&Quat::IDENTITY), IDENTITY_MATRIX);
    }

    #[test]
    fn quarter_turn_around_z_maps_x_to_y() {
        let m = rotation_matrix(&Quat::from_axis_angle(Axis::Z, FRAC_PI_2));
        assert_vec_eq(transform_vector(&[1.0, 0.0, 0.0], &m), [0.0, 1.0, 0.0]);
        assert_vec_eq(transform_vector(&[0.0, 0.0, 1.0], &m), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn zero_quaternion_is_identity() {
        assert_eq!(rotation_matrix(&Quat::new(0.0, 0.0, 0.0, 0.0)), IDENTITY_MATRIX);
    }
}
