use std::ops::{Mul, MulAssign};

/// The Pose struct represents a tracked pose as the runtime reports it:
/// meters, +Y up, +X to the right and -Z forward.
///
/// ```
/// use rust_openxr_bridge_api::Pose;
///
/// let identity = Pose::default();
/// assert_eq!(identity.position, [0.0; 3]);
/// assert_eq!(identity.orientation, [0.0, 0.0, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Pose {
    /// Position as a 3D vector (x, y, z).
    pub position: [f32; 3],

    /// Orientation quaternion in runtime layout (x, y, z, w).
    pub orientation: [f32; 4],
}

impl Default for Pose {
    fn default() -> Pose {
        Pose {
            position: [0.0; 3],
            orientation: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Double precision quaternion stored scalar first.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Quat {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Quat {
        Quat { w, x, y, z }
    }

    /// Rotation of `angle` radians around a principal axis:
    /// (cos(a/2), sin(a/2) * axis).
    pub fn from_axis_angle(axis: Axis, angle: f64) -> Quat {
        let (s, c) = (angle / 2.0).sin_cos();
        match axis {
            Axis::X => Quat::new(c, s, 0.0, 0.0),
            Axis::Y => Quat::new(c, 0.0, s, 0.0),
            Axis::Z => Quat::new(c, 0.0, 0.0, s),
        }
    }

    pub fn norm_squared(&self) -> f64 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }
}

impl Default for Quat {
    fn default() -> Quat {
        Quat::IDENTITY
    }
}

// Hamilton product
impl Mul for Quat {
    type Output = Quat;

    fn mul(self, b: Quat) -> Quat {
        let a = self;
        Quat {
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        }
    }
}

impl MulAssign for Quat {
    fn mul_assign(&mut self, rhs: Quat) {
        *self = *self * rhs;
    }
}

/// A pose expressed in the scene graph convention (+Z up, scene units).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct HostPose {
    pub position: [f64; 3],
    pub orientation: Quat,
}
