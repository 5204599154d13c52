use rust_openxr_bridge_api::utils::rotation_matrix;
use rust_openxr_bridge_api::xr_scene::{XFORM_OP_ROTATE, XFORM_OP_ROTATE_XYZ, XFORM_OP_TRANSFORM, XFORM_OP_TRANSLATE,
                                       XFORM_OP_TRANSLATION};
use rust_openxr_bridge_api::{AttributeValue, CameraSensor, HostPose, SceneStage, View, ViewConfigurationView,
                             XformOpType, XrError, XrResult};
use crate::frame_transform::FrameSink;
use crate::pose::{Eye, PosePipeline, ReferenceFrame};

pub const CLIPPING_RANGE: [f32; 2] = [0.01, 1000000.0];
pub const DEFAULT_FOCAL_LENGTH: f32 = 10.0;

/// Camera attributes written on every eye prim, in order.
pub type CameraProperties = Vec<(String, AttributeValue)>;

pub fn default_camera_properties() -> CameraProperties {
    vec![("focalLength".to_owned(), AttributeValue::Float(DEFAULT_FOCAL_LENGTH))]
}

/// A camera requested by the caller: the prim path and the sensor rendering it.
pub struct CameraDesc {
    pub path: String,
    pub sensor: Box<dyn CameraSensor>,
}

impl CameraDesc {
    pub fn new<S: Into<String>>(path: S, sensor: Box<dyn CameraSensor>) -> CameraDesc {
        CameraDesc { path: path.into(), sensor }
    }
}

/// A camera prim on the stage driven by one eye.
pub struct EyeCamera {
    pub prim_path: String,
    pub sensor: Box<dyn CameraSensor>,
}

/// The stage and the eye cameras the default render handler drives.
/// A mono rig has no right camera at all.
pub struct ViewRig {
    stage: Box<dyn SceneStage>,
    left: EyeCamera,
    right: Option<EyeCamera>,
}

impl ViewRig {
    pub fn stereo(stage: Box<dyn SceneStage>,
                  left: CameraDesc,
                  right: Option<CameraDesc>,
                  properties: &[(String, AttributeValue)]) -> XrResult<ViewRig> {
        let mut stage = stage;
        let left = setup_camera(&mut *stage, left, properties)?;
        let right = match right {
            Some(right) => Some(setup_camera(&mut *stage, right, properties)?),
            None => None,
        };
        Ok(ViewRig { stage, left, right })
    }

    pub fn mono(stage: Box<dyn SceneStage>,
                camera: CameraDesc,
                properties: &[(String, AttributeValue)]) -> XrResult<ViewRig> {
        ViewRig::stereo(stage, camera, None, properties)
    }

    pub fn left(&self) -> &EyeCamera {
        &self.left
    }

    pub fn right(&self) -> Option<&EyeCamera> {
        self.right.as_ref()
    }

    pub fn is_stereo(&self) -> bool {
        self.right.is_some()
    }

    pub fn stage(&self) -> &dyn SceneStage {
        &*self.stage
    }

    /// Moves the eye cameras to the views of the frame, then submits their images.
    pub fn render(&mut self,
                  views: &[View],
                  config_views: &[ViewConfigurationView],
                  pipeline: &PosePipeline,
                  sink: &mut FrameSink) -> XrResult<()> {
        let left_view = views.first().ok_or_else(|| XrError::Frame("no views in frame".into()))?;
        let pose = pipeline.eye_pose(&left_view.pose, Eye::Left)?;
        teleport_prim(&mut *self.stage, &self.left.prim_path, &pose, &pipeline.reference)?;
        if views.len() == 2 {
            if let Some(ref right) = self.right {
                let pose = pipeline.eye_pose(&views[1].pose, Eye::Right)?;
                teleport_prim(&mut *self.stage, &right.prim_path, &pose, &pipeline.reference)?;
            }
        }

        if let Some(view) = config_views.first() {
            self.left.sensor.set_resolution(view.recommended_size());
        }
        if let (Some(right), Some(view)) = (self.right.as_mut(), config_views.get(1)) {
            right.sensor.set_resolution(view.recommended_size());
        }

        let left = self.left.sensor.rgba()?;
        let right = match self.right.as_mut() {
            Some(right) => Some(right.sensor.rgba()?),
            None => None,
        };
        if left.is_empty() || right.as_ref().map_or(false, |frame| frame.is_empty()) {
            return Err(XrError::Frame("camera buffer is empty".into()));
        }
        sink.set_frames(config_views, &left, right.as_ref())
    }
}

fn setup_camera(stage: &mut dyn SceneStage,
                camera: CameraDesc,
                properties: &[(String, AttributeValue)]) -> XrResult<EyeCamera> {
    let prim_path = if stage.prim_exists(&camera.path) {
        camera.path
    } else {
        let path = stage.define_camera(&camera.path)?;
        info!("Defined camera prim {}", path);
        path
    };
    stage.set_attribute(&prim_path, "clippingRange", AttributeValue::Float2(CLIPPING_RANGE))?;
    for (name, value) in properties {
        stage.set_attribute(&prim_path, name, value.clone())?;
    }
    Ok(EyeCamera { prim_path, sensor: camera.sensor })
}

/// Writes a tracked pose to a prim as independent transform ops.
///
/// The translate op receives the reference position plus the pose position.
/// The reference rotation, when set, goes to its own rotate op. The pose
/// orientation goes to a rotation-only matrix op. Missing ops are appended.
pub fn teleport_prim(stage: &mut dyn SceneStage,
                     prim: &str,
                     pose: &HostPose,
                     reference: &ReferenceFrame) -> XrResult<()> {
    let properties = stage.property_names(prim);
    let has = |name: &str| properties.iter().any(|p| p == name);

    let translate = AttributeValue::Double3(reference.apply(*pose).position);
    if has(XFORM_OP_TRANSLATE) || has(XFORM_OP_TRANSLATION) {
        stage.set_attribute(prim, XFORM_OP_TRANSLATE, translate)?;
    } else {
        info!("Create {} on {}", XFORM_OP_TRANSLATE, prim);
        stage.add_xform_op(prim, XformOpType::Translate, translate)?;
    }

    if let Some(rotation) = reference.rotation {
        if has(XFORM_OP_ROTATE) {
            stage.set_attribute(prim, XFORM_OP_ROTATE, AttributeValue::Double3(rotation))?;
        } else if has(XFORM_OP_ROTATE_XYZ) {
            // Authored ops may be single precision
            if stage.set_attribute(prim, XFORM_OP_ROTATE_XYZ, AttributeValue::Double3(rotation)).is_err() {
                let single = [rotation[0] as f32, rotation[1] as f32, rotation[2] as f32];
                stage.set_attribute(prim, XFORM_OP_ROTATE_XYZ, AttributeValue::Float3(single))?;
            }
        } else {
            info!("Create {} on {}", XFORM_OP_ROTATE_XYZ, prim);
            stage.add_xform_op(prim, XformOpType::RotateXYZ, AttributeValue::Double3(rotation))?;
        }
    }

    let transform = AttributeValue::Matrix4d(rotation_matrix(&pose.orientation));
    if has(XFORM_OP_TRANSFORM) {
        stage.set_attribute(prim, XFORM_OP_TRANSFORM, transform)
    } else {
        info!("Create {} on {}", XFORM_OP_TRANSFORM, prim);
        stage.add_xform_op(prim, XformOpType::Transform, transform)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;
    use rust_openxr_bridge_api::{AttributeValue, CameraSensor, FrameBuffer, PixelFormat, SceneStage, XformOpType,
                                 XrError, XrResult};

    #[derive(Default)]
    pub struct StageData {
        // prim path -> attribute name -> value
        pub prims: BTreeMap<String, BTreeMap<String, AttributeValue>>,
        pub created_ops: Vec<(String, XformOpType)>,
        pub float_only: Vec<String>,
    }

    #[derive(Clone, Default)]
    pub struct FakeStage(pub Rc<RefCell<StageData>>);

    impl FakeStage {
        pub fn with_prim(self, path: &str, attributes: &[&str]) -> FakeStage {
            let mut attrs = BTreeMap::new();
            for name in attributes {
                attrs.insert((*name).to_owned(), AttributeValue::Double(0.0));
            }
            self.0.borrow_mut().prims.insert(path.to_owned(), attrs);
            self
        }

        pub fn attribute(&self, prim: &str, name: &str) -> Option<AttributeValue> {
            self.0.borrow().prims.get(prim).and_then(|p| p.get(name).cloned())
        }
    }

    impl SceneStage for FakeStage {
        fn prim_exists(&self, path: &str) -> bool {
            self.0.borrow().prims.contains_key(path)
        }

        fn define_camera(&mut self, path: &str) -> XrResult<String> {
            let mut data = self.0.borrow_mut();
            let mut candidate = path.to_owned();
            let mut index = 0;
            while data.prims.contains_key(&candidate) {
                index += 1;
                candidate = format!("{}_{:02}", path, index);
            }
            data.prims.insert(candidate.clone(), BTreeMap::new());
            Ok(candidate)
        }

        fn property_names(&self, prim: &str) -> Vec<String> {
            self.0.borrow().prims.get(prim).map(|p| p.keys().cloned().collect()).unwrap_or_default()
        }

        fn set_attribute(&mut self, prim: &str, name: &str, value: AttributeValue) -> XrResult<()> {
            let mut data = self.0.borrow_mut();
            if let AttributeValue::Double3(_) = value {
                if data.float_only.iter().any(|n| n == name) {
                    return Err(XrError::invalid(format!("{} holds single precision values", name)));
                }
            }
            let attrs = data.prims.get_mut(prim).ok_or_else(|| XrError::invalid(format!("no prim {}", prim)))?;
            attrs.insert(name.to_owned(), value);
            Ok(())
        }

        fn add_xform_op(&mut self, prim: &str, op: XformOpType, value: AttributeValue) -> XrResult<()> {
            self.0.borrow_mut().created_ops.push((prim.to_owned(), op));
            self.set_attribute(prim, op.attribute_name(), value)
        }
    }

    #[derive(Default)]
    pub struct SensorData {
        pub resolution: Option<(u32, u32)>,
        pub empty: bool,
        pub shade: u8,
    }

    #[derive(Clone, Default)]
    pub struct FakeSensor(pub Rc<RefCell<SensorData>>);

    impl FakeSensor {
        pub fn shaded(shade: u8) -> FakeSensor {
            let sensor = FakeSensor::default();
            sensor.0.borrow_mut().shade = shade;
            sensor
        }
    }

    impl CameraSensor for FakeSensor {
        fn set_resolution(&mut self, resolution: (u32, u32)) {
            self.0.borrow_mut().resolution = Some(resolution);
        }

        fn rgba(&mut self) -> XrResult<FrameBuffer> {
            let data = self.0.borrow();
            if data.empty {
                return FrameBuffer::new(0, 0, PixelFormat::Rgba, Vec::new());
            }
            let (width, height) = data.resolution.unwrap_or((2, 2));
            FrameBuffer::new(width, height, PixelFormat::Rgba, vec![data.shade; (width * height * 4) as usize])
        }
    }
}
