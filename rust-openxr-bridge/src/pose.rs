//! Conversion of tracked poses from the runtime convention
//! (+Y up, -Z forward, meters) into the scene convention (+Z up, scene units).

use rust_openxr_bridge_api::{Axis, HostPose, Pose, Quat, XrError, XrResult};

/// Converts a runtime pose into the scene convention.
///
/// Position is remapped as `(x, -z, y) / meters_per_unit`. The orientation is
/// only reordered from runtime layout (x, y, z, w) to scalar-first.
pub fn convert(pose: &Pose, meters_per_unit: f64) -> XrResult<HostPose> {
    if meters_per_unit == 0.0 {
        return Err(XrError::invalid("meters per unit must be non-zero"));
    }
    let [x, y, z] = pose.position;
    let [qx, qy, qz, qw] = pose.orientation;
    Ok(HostPose {
        position: [
            x as f64 / meters_per_unit,
            -z as f64 / meters_per_unit,
            y as f64 / meters_per_unit,
        ],
        orientation: Quat::new(qw as f64, qx as f64, qy as f64, qz as f64),
    })
}

/// Per-eye corrective rotations for a physically misaligned stereo rig.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectificationPair {
    pub left: Quat,
    pub right: Quat,
}

impl Default for RectificationPair {
    fn default() -> RectificationPair {
        RectificationPair {
            left: Quat::IDENTITY,
            right: Quat::IDENTITY,
        }
    }
}

impl RectificationPair {
    /// Builds both rotations from angles in radians, applied in X, Y, Z order.
    /// The right eye gets the mirrored angles. Zero angles are skipped.
    pub fn build(x: f64, y: f64, z: f64) -> RectificationPair {
        let mut pair = RectificationPair::default();
        for &(axis, angle) in &[(Axis::X, x), (Axis::Y, y), (Axis::Z, z)] {
            if angle != 0.0 {
                pair.left *= Quat::from_axis_angle(axis, angle);
                pair.right *= Quat::from_axis_angle(axis, -angle);
            }
        }
        pair
    }
}

/// User configured origin of the tracking space inside the scene.
///
/// The rotation is kept as XYZ Euler angles in degrees and is written to its
/// own transform op; it is never folded into the tracked orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReferenceFrame {
    pub position: Option<[f64; 3]>,
    pub rotation: Option<[f64; 3]>,
}

impl ReferenceFrame {
    pub fn new(position: Option<[f64; 3]>, rotation: Option<[f64; 3]>) -> ReferenceFrame {
        ReferenceFrame { position, rotation }
    }

    /// Offsets the pose position by the reference position. The orientation is untouched.
    pub fn apply(&self, pose: HostPose) -> HostPose {
        match self.position {
            Some(offset) => HostPose {
                position: [
                    offset[0] + pose.position[0],
                    offset[1] + pose.position[1],
                    offset[2] + pose.position[2],
                ],
                orientation: pose.orientation,
            },
            None => pose,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eye {
    Left,
    Right,
}

/// Scene units, reference frame and rectification of one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PosePipeline {
    meters_per_unit: f64,
    pub reference: ReferenceFrame,
    pub rectification: RectificationPair,
}

impl Default for PosePipeline {
    fn default() -> PosePipeline {
        PosePipeline {
            meters_per_unit: 1.0,
            reference: ReferenceFrame::default(),
            rectification: RectificationPair::default(),
        }
    }
}

impl PosePipeline {
    pub fn meters_per_unit(&self) -> f64 {
        self.meters_per_unit
    }

    pub fn set_meters_per_unit(&mut self, meters_per_unit: f64) -> XrResult<()> {
        if meters_per_unit == 0.0 {
            return Err(XrError::invalid("meters per unit must be non-zero"));
        }
        self.meters_per_unit = meters_per_unit;
        Ok(())
    }

    /// Pose of a tracked device, offset by the reference position.
    pub fn device_pose(&self, pose: &Pose) -> XrResult<HostPose> {
        convert(pose, self.meters_per_unit).map(|host| self.reference.apply(host))
    }

    /// Pose of an eye camera, rectified for that eye. The reference frame is
    /// applied later, when the camera prim is teleported.
    pub fn eye_pose(&self, pose: &Pose, eye: Eye) -> XrResult<HostPose> {
        let mut host = convert(pose, self.meters_per_unit)?;
        host.orientation = host.orientation * match eye {
            Eye::Left => self.rectification.left,
            Eye::Right => self.rectification.right,
        };
        Ok(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: Quat, b: Quat) -> bool {
        (a.w - b.w).abs() < 1e-12 && (a.x - b.x).abs() < 1e-12
            && (a.y - b.y).abs() < 1e-12 && (a.z - b.z).abs() < 1e-12
    }

    fn pose(position: [f32; 3]) -> Pose {
        Pose { position, orientation: [0.1, 0.2, 0.3, 0.9] }
    }

    #[test]
    fn remaps_axes() {
        let host = convert(&pose([1.0, 2.0, 3.0]), 1.0).unwrap();
        assert_eq!(host.position, [1.0, -3.0, 2.0]);
    }

    #[test]
    fn scales_by_meters_per_unit() {
        for &(p, m) in &[([1.0f32, 2.0, 3.0], 0.01f64), ([-4.5, 0.25, 8.0], 2.0), ([0.0, -1.0, 0.5], -0.5)] {
            let host = convert(&pose(p), m).unwrap();
            assert_eq!(host.position, [p[0] as f64 / m, -p[2] as f64 / m, p[1] as f64 / m]);
        }
    }

    #[test]
    fn reorders_quaternion_scalar_first() {
        let host = convert(&pose([0.0; 3]), 1.0).unwrap();
        assert_eq!(host.orientation, Quat::new(0.9f32 as f64, 0.1f32 as f64, 0.2f32 as f64, 0.3f32 as f64));
    }

    #[test]
    fn rejects_zero_scale() {
        for p in &[[0.0f32; 3], [1.0, 2.0, 3.0]] {
            match convert(&pose(*p), 0.0) {
                Err(XrError::InvalidInput(_)) => {}
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn zero_rectification_is_identity() {
        let pair = RectificationPair::build(0.0, 0.0, 0.0);
        assert_eq!(pair.left, Quat::IDENTITY);
        assert_eq!(pair.right, Quat::IDENTITY);
    }

    #[test]
    fn half_turn_around_x_mirrors_eyes() {
        let pair = RectificationPair::build(PI, 0.0, 0.0);
        assert!(close(pair.left, Quat::new(0.0, 1.0, 0.0, 0.0)));
        assert!(close(pair.right, Quat::new(0.0, -1.0, 0.0, 0.0)));
    }

    #[test]
    fn rectification_composes_x_before_y() {
        let pair = RectificationPair::build(FRAC_PI_2, FRAC_PI_2, 0.0);
        let qx = Quat::from_axis_angle(Axis::X, FRAC_PI_2);
        let qy = Quat::from_axis_angle(Axis::Y, FRAC_PI_2);
        assert!(close(pair.left, qx * qy));
        assert!(!close(pair.left, qy * qx));

        let right_x = Quat::from_axis_angle(Axis::X, -FRAC_PI_2);
        let right_y = Quat::from_axis_angle(Axis::Y, -FRAC_PI_2);
        assert!(close(pair.right, right_x * right_y));
    }

    #[test]
    fn rebuild_replaces_previous_rotations() {
        let first = RectificationPair::build(0.3, 0.0, 0.0);
        let second = RectificationPair::build(0.0, 0.0, 0.2);
        assert!(!close(first.left, second.left));
        assert!(close(second.left, Quat::from_axis_angle(Axis::Z, 0.2)));
    }

    #[test]
    fn reference_position_offsets_pose() {
        let host = HostPose { position: [1.0, 2.0, 3.0], orientation: Quat::new(0.0, 1.0, 0.0, 0.0) };
        let frame = ReferenceFrame::new(Some([10.0, 20.0, 30.0]), Some([90.0, 0.0, 0.0]));
        let moved = frame.apply(host);
        assert_eq!(moved.position, [11.0, 22.0, 33.0]);
        assert_eq!(moved.orientation, host.orientation);
        assert_eq!(ReferenceFrame::default().apply(host), host);
    }

    #[test]
    fn pipeline_rejects_zero_scale_and_keeps_previous() {
        let mut pipeline = PosePipeline::default();
        pipeline.set_meters_per_unit(0.01).unwrap();
        assert!(pipeline.set_meters_per_unit(0.0).is_err());
        assert_eq!(pipeline.meters_per_unit(), 0.01);
    }

    #[test]
    fn eye_pose_applies_rectification_on_the_right() {
        let mut pipeline = PosePipeline::default();
        pipeline.rectification = RectificationPair::build(0.0, 0.0, FRAC_PI_2);
        pipeline.reference = ReferenceFrame::new(Some([5.0, 5.0, 5.0]), None);
        let tracked = Pose { position: [1.0, 2.0, 3.0], orientation: [1.0, 0.0, 0.0, 0.0] };
        let tracked_quat = Quat::new(0.0, 1.0, 0.0, 0.0);

        let left = pipeline.eye_pose(&tracked, Eye::Left).unwrap();
        assert_eq!(left.position, [1.0, -3.0, 2.0]);
        assert!(close(left.orientation, tracked_quat * pipeline.rectification.left));

        let right = pipeline.eye_pose(&tracked, Eye::Right).unwrap();
        assert!(close(right.orientation, tracked_quat * pipeline.rectification.right));

        let device = pipeline.device_pose(&tracked).unwrap();
        assert_eq!(device.position, [6.0, 2.0, 7.0]);
        assert_eq!(device.orientation, tracked_quat);
    }
}
